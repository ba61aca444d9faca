//! Diagnostic context handed to rules.

use std::fmt;
use std::sync::Arc;

/// Names of the callable and parameter under validation.
///
/// Only used to build error messages. Cheap to clone so lazy wrappers can keep
/// a copy after the call that created them has returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleContext {
    function: Arc<str>,
    parameter: Arc<str>,
}

impl RuleContext {
    /// Create a new context
    #[must_use]
    pub fn new(function: impl Into<Arc<str>>, parameter: impl Into<Arc<str>>) -> Self {
        Self {
            function: function.into(),
            parameter: parameter.into(),
        }
    }

    /// Name of the enforced callable
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Name of the parameter
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }
}

impl fmt::Display for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.parameter)
    }
}
