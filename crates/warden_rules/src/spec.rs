//! Serializable rule declarations.

use crate::not_empty::NotEmpty;
use crate::unique::Unique;
use serde::{Deserialize, Serialize};
use warden_core::{EqualityPolicy, RuleRef};

/// Declarative form of a built-in rule, tagged by `"rule"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    /// [`NotEmpty`]
    NotEmpty {
        /// Drain streams before validating
        #[serde(default)]
        exhaust_eagerly: bool,
    },
    /// [`Unique`]
    Unique {
        /// Drain streams before validating
        #[serde(default)]
        exhaust_eagerly: bool,
        /// Element equality policy
        #[serde(default)]
        equality: EqualityPolicy,
    },
}

impl RuleSpec {
    /// Names of all built-in rules, as used in the `"rule"` tag
    pub const BUILTINS: [&'static str; 2] = ["not_empty", "unique"];

    /// Instantiate the declared rule
    #[must_use]
    pub fn build(&self) -> RuleRef {
        match *self {
            Self::NotEmpty { exhaust_eagerly } => {
                NotEmpty::new().with_exhaust_eagerly(exhaust_eagerly).into()
            }
            Self::Unique {
                exhaust_eagerly,
                equality,
            } => Unique::new()
                .with_exhaust_eagerly(exhaust_eagerly)
                .with_equality(equality)
                .into(),
        }
    }
}

impl From<RuleSpec> for RuleRef {
    fn from(spec: RuleSpec) -> Self {
        spec.build()
    }
}
