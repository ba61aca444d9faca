//! Error taxonomy for rule enforcement.
//!
//! Two kinds of failure exist. A [`ValidationFailure`] means the value was
//! well-formed for the rule but broke its condition. A [`UsageError`] means the
//! rule or the call itself was set up wrong and retrying with other data will
//! not help.

use crate::context::RuleContext;

/// Result type for enforcement operations
pub type EnforceResult<T> = Result<T, EnforceError>;

/// Any failure raised while binding, validating or consuming arguments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnforceError {
    /// The value violated a rule's condition
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A rule or call was used in a way it cannot operate on
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl EnforceError {
    /// Whether this is a semantic validation failure
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this is a usage error
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// The validation failure, if that is what this is
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            Self::Usage(_) => None,
        }
    }

    /// The usage error, if that is what this is
    #[must_use]
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Self::Usage(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

impl From<BindingError> for EnforceError {
    fn from(err: BindingError) -> Self {
        Self::Usage(UsageError::Binding(err))
    }
}

/// A value that is well-formed for a rule but violates its condition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parameter '{parameter}' {condition} for function '{function}'")]
pub struct ValidationFailure {
    /// Name of the enforced callable
    pub function: String,
    /// Name of the offending parameter
    pub parameter: String,
    /// Name of the rule that failed
    pub rule: String,
    /// Human-readable violated condition, e.g. "cannot be empty"
    pub condition: String,
}

impl ValidationFailure {
    /// Create a failure for the parameter described by `ctx`
    #[must_use]
    pub fn new(ctx: &RuleContext, rule: &str, condition: impl Into<String>) -> Self {
        Self {
            function: ctx.function().to_string(),
            parameter: ctx.parameter().to_string(),
            rule: rule.to_string(),
            condition: condition.into(),
        }
    }
}

/// A programming mistake in how rules were declared or a callable invoked
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// The rule cannot inspect a value of this type at all
    #[error(
        "Rule '{rule}' can only be used on {requirement}, but function '{function}' got type '{actual}' for parameter '{parameter}'"
    )]
    UnsupportedType {
        /// Rule name
        rule: String,
        /// Callable name
        function: String,
        /// Parameter name
        parameter: String,
        /// Type name of the supplied value
        actual: String,
        /// What the rule needs from a value
        requirement: String,
    },

    /// An element could not be hashed for comparison
    #[error(
        "unhashable type: '{element}' in parameter '{parameter}' for function '{function}' (rule '{rule}')"
    )]
    Unhashable {
        /// Rule name
        rule: String,
        /// Callable name
        function: String,
        /// Parameter name
        parameter: String,
        /// Type name of the unhashable element
        element: String,
    },

    /// A rule without stream support was attached to a stream argument
    #[error(
        "Parameter '{parameter}' for function '{function}' is a stream, but rule '{rule}' does not support validation of streams"
    )]
    StreamUnsupported {
        /// Rule name
        rule: String,
        /// Callable name
        function: String,
        /// Parameter name
        parameter: String,
    },

    /// Arguments did not fit the declared parameter list
    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl UsageError {
    /// Create an unsupported-type error for the parameter described by `ctx`
    #[must_use]
    pub fn unsupported_type(
        ctx: &RuleContext,
        rule: &str,
        actual: &str,
        requirement: &str,
    ) -> Self {
        Self::UnsupportedType {
            rule: rule.to_string(),
            function: ctx.function().to_string(),
            parameter: ctx.parameter().to_string(),
            actual: actual.to_string(),
            requirement: requirement.to_string(),
        }
    }

    /// Create an unhashable-element error for the parameter described by `ctx`
    #[must_use]
    pub fn unhashable(ctx: &RuleContext, rule: &str, element: &str) -> Self {
        Self::Unhashable {
            rule: rule.to_string(),
            function: ctx.function().to_string(),
            parameter: ctx.parameter().to_string(),
            element: element.to_string(),
        }
    }

    /// Create a stream-unsupported error for the parameter described by `ctx`
    #[must_use]
    pub fn stream_unsupported(ctx: &RuleContext, rule: &str) -> Self {
        Self::StreamUnsupported {
            rule: rule.to_string(),
            function: ctx.function().to_string(),
            parameter: ctx.parameter().to_string(),
        }
    }
}

/// Call arguments that do not match the declared parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// A required parameter received no argument
    #[error("{function}() missing required argument: '{parameter}'")]
    MissingArgument {
        /// Callable name
        function: String,
        /// Parameter name
        parameter: String,
    },

    /// More positional arguments than positional parameters
    #[error("{function}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        /// Callable name
        function: String,
        /// Number of positional parameters
        expected: usize,
        /// Number of positional arguments supplied
        given: usize,
    },

    /// A keyword that names no parameter
    #[error("{function}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword {
        /// Callable name
        function: String,
        /// The unknown keyword
        keyword: String,
    },

    /// A parameter supplied both positionally and by keyword
    #[error("{function}() got multiple values for argument '{parameter}'")]
    MultipleValues {
        /// Callable name
        function: String,
        /// Parameter name
        parameter: String,
    },
}
