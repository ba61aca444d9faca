//! Declared parameter lists.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use warden_core::{RuleRef, Value};

/// How a parameter may be supplied at the call site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// By position or by name
    #[default]
    PositionalOrKeyword,
    /// By name only
    KeywordOnly,
}

/// A declared parameter with its attached rules
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
    rules: Vec<RuleRef>,
}

impl Parameter {
    /// Create a required positional-or-keyword parameter with no rules
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: None,
            rules: Vec::new(),
        }
    }

    /// Make the parameter keyword-only
    #[must_use]
    pub fn keyword_only(mut self) -> Self {
        self.kind = ParamKind::KeywordOnly;
        self
    }

    /// Set the parameter kind
    #[must_use]
    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Value used when the argument is omitted
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a rule; rules run in the order they were attached
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<RuleRef>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Parameter name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter kind
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Default value, if any
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Attached rules in declaration order
    #[must_use]
    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }

    /// Whether any rule is attached
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Whether an argument must be supplied
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Malformed parameter declaration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Two parameters share a name
    #[error("duplicate parameter '{parameter}' in function '{function}'")]
    DuplicateParameter {
        /// Callable name
        function: String,
        /// Repeated parameter name
        parameter: String,
    },

    /// A required positional parameter follows one with a default
    #[error("parameter '{parameter}' without a default follows a parameter with a default in function '{function}'")]
    RequiredAfterDefault {
        /// Callable name
        function: String,
        /// Offending parameter name
        parameter: String,
    },

    /// A positional-or-keyword parameter follows a keyword-only one
    #[error("parameter '{parameter}' follows a keyword-only parameter but is not keyword-only in function '{function}'")]
    PositionalAfterKeywordOnly {
        /// Callable name
        function: String,
        /// Offending parameter name
        parameter: String,
    },
}

/// The declared parameter list of an enforced callable.
///
/// Built once when the callable is wrapped and never changed afterwards.
#[derive(Debug, Clone)]
pub struct Signature {
    name: String,
    params: Vec<Parameter>,
}

impl Signature {
    /// Create an empty signature for the named callable
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter
    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Callable name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Look up a parameter by name
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Number of parameters that accept positional arguments
    #[must_use]
    pub fn positional_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.kind == ParamKind::PositionalOrKeyword)
            .count()
    }

    /// Number of parameters carrying at least one rule
    #[must_use]
    pub fn ruled_count(&self) -> usize {
        self.params.iter().filter(|p| p.has_rules()).count()
    }

    /// Check the declaration is well-formed
    ///
    /// # Errors
    ///
    /// Returns error on duplicate names, a required positional parameter
    /// after a defaulted one, or a positional parameter after a keyword-only
    /// one
    pub fn check(&self) -> Result<(), SignatureError> {
        let mut names = HashSet::new();
        let mut seen_default = false;
        let mut seen_keyword_only = false;

        for param in &self.params {
            if !names.insert(param.name.as_str()) {
                return Err(SignatureError::DuplicateParameter {
                    function: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }

            if param.kind == ParamKind::KeywordOnly {
                seen_keyword_only = true;
                continue;
            }

            if seen_keyword_only {
                return Err(SignatureError::PositionalAfterKeywordOnly {
                    function: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }

            if param.is_required() && seen_default {
                return Err(SignatureError::RequiredAfterDefault {
                    function: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
            seen_default |= !param.is_required();
        }

        Ok(())
    }
}
