//! JSON signature declarations.
//!
//! ```json
//! {
//!   "name": "process_items",
//!   "params": [
//!     { "name": "items", "rules": [{ "rule": "not_empty" }, { "rule": "unique" }] },
//!     { "name": "verbose", "kind": "keyword_only", "default": false }
//!   ]
//! }
//! ```

use crate::signature::{ParamKind, Parameter, Signature, SignatureError};
use serde::{Deserialize, Deserializer, Serialize};
use warden_core::Value;
use warden_rules::RuleSpec;

/// Declared parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// How the argument may be supplied
    #[serde(default)]
    pub kind: ParamKind,
    /// Value used when the argument is omitted; an explicit `null` is a
    /// default of `Value::Null`, not a missing default
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<serde_json::Value>,
    /// Rules in application order
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl ParameterSpec {
    /// Build the runtime parameter
    #[must_use]
    pub fn into_parameter(self) -> Parameter {
        let mut param = Parameter::new(self.name).with_kind(self.kind);
        if let Some(default) = self.default {
            param = param.with_default(Value::from(default));
        }
        self.rules
            .into_iter()
            .fold(param, |param, rule| param.with_rule(rule))
    }
}

/// Declared signature of an enforced callable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSpec {
    /// Callable name
    pub name: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
}

impl SignatureSpec {
    /// Parse a declaration from JSON
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or names an unknown rule
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build and check the runtime signature
    ///
    /// # Errors
    ///
    /// Returns error if the declared parameters are malformed
    pub fn into_signature(self) -> Result<Signature, ConfigError> {
        let signature = self
            .params
            .into_iter()
            .map(ParameterSpec::into_parameter)
            .fold(Signature::new(self.name), Signature::with_param);
        signature.check()?;
        Ok(signature)
    }
}

/// Errors loading a signature declaration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Declaration is not valid JSON for the expected shape
    #[error("invalid signature declaration: {0}")]
    Json(#[from] serde_json::Error),

    /// Declaration parsed but describes a malformed signature
    #[error(transparent)]
    Signature(#[from] SignatureError),
}
