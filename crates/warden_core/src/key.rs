//! Hash keys and the equality policy used for duplicate detection.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How two elements are compared when checking for duplicates.
///
/// Under both policies every NaN maps to the same key, so two NaN elements
/// count as duplicates even though they are unequal under IEEE comparison.
/// `-0.0` and `0.0` are also the same element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityPolicy {
    /// Numerically equal values are the same element regardless of type:
    /// `true`, `1` and `1.0` collide.
    #[default]
    Structural,
    /// Elements must agree on both type and value. NaNs still collide.
    Strict,
}

impl fmt::Display for EqualityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural => write!(f, "structural"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// A value that cannot be used as a hash key
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unhashable type: '{type_name}'")]
pub struct Unhashable {
    /// Type name of the offending element
    pub type_name: &'static str,
}

/// Hashable projection of a [`Value`] under an [`EqualityPolicy`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    /// Null
    Null,
    /// Boolean, only produced under [`EqualityPolicy::Strict`]
    Bool(bool),
    /// Integer, or an integral float under [`EqualityPolicy::Structural`]
    Int(i64),
    /// Bit pattern of a normalized float
    Float(u64),
    /// String
    Str(String),
    /// Bytes
    Bytes(Vec<u8>),
    /// Tuple of hashable elements
    Tuple(Vec<HashKey>),
}

impl HashKey {
    /// Project a value onto its hash key.
    ///
    /// # Errors
    ///
    /// Returns error for lists, sets, maps and tuples containing them
    pub fn of(value: &Value, policy: EqualityPolicy) -> Result<Self, Unhashable> {
        let key = match value {
            Value::Null => Self::Null,
            Value::Bool(b) => match policy {
                EqualityPolicy::Structural => Self::Int(i64::from(*b)),
                EqualityPolicy::Strict => Self::Bool(*b),
            },
            Value::Int(i) => Self::Int(*i),
            Value::Float(x) => Self::float(*x, policy),
            Value::Str(s) => Self::Str(s.clone()),
            Value::Bytes(b) => Self::Bytes(b.clone()),
            Value::Tuple(items) => Self::Tuple(
                items
                    .iter()
                    .map(|item| Self::of(item, policy))
                    .collect::<Result<_, _>>()?,
            ),
            Value::List(_) | Value::Set(_) | Value::Map(_) => {
                return Err(Unhashable {
                    type_name: value.type_name(),
                });
            }
        };
        Ok(key)
    }

    fn float(x: f64, policy: EqualityPolicy) -> Self {
        // i64::MIN is exactly representable; i64::MAX rounds up to 2^63 which is not.
        const LOWER: f64 = -9_223_372_036_854_775_808.0;
        const UPPER: f64 = 9_223_372_036_854_775_808.0;

        if x.is_nan() {
            return Self::Float(f64::NAN.to_bits());
        }
        if policy == EqualityPolicy::Structural && x.fract() == 0.0 && x >= LOWER && x < UPPER {
            return Self::Int(x as i64);
        }
        // -0.0 and 0.0 compare equal
        let x = if x == 0.0 { 0.0 } else { x };
        Self::Float(x.to_bits())
    }
}
