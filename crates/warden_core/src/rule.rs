//! The rule contract.
//!
//! Every rule can check a materialized value. Rules that also implement
//! [`StreamRule`] can wrap a [`Stream`] so validation happens as elements are
//! produced. Which of the two a rule supports is fixed when its [`RuleRef`] is
//! built, not discovered per call.

use crate::context::RuleContext;
use crate::error::EnforceResult;
use crate::stream::{Arg, Stream};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A validation policy attachable to a parameter.
///
/// Implementations hold nothing but configuration fixed at construction, so
/// one instance may be shared by any number of parameters.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Rule name used in diagnostics
    fn name(&self) -> &str;

    /// Check a fully materialized value without modifying it
    ///
    /// # Errors
    ///
    /// Returns a validation failure if the condition is violated, or a usage
    /// error if the value's type cannot be inspected by this rule
    fn validate(&self, value: &Value, ctx: &RuleContext) -> EnforceResult<()>;
}

/// A rule that can validate lazily produced input
pub trait StreamRule: Rule {
    /// Whether streams are drained and validated up front
    fn exhaust_eagerly(&self) -> bool;

    /// Wrap a stream so that it re-emits the same elements while validating
    /// them.
    ///
    /// Must not pull from `stream` except for a fixed lookahead the rule
    /// documents.
    ///
    /// # Errors
    ///
    /// Returns error if the lookahead already shows a violation
    fn wrap_lazy(&self, stream: Stream, ctx: &RuleContext) -> EnforceResult<Stream>;

    /// Apply this rule to a stream argument.
    ///
    /// In lazy mode this returns a wrapped [`Arg::Stream`]. In eager mode it
    /// drains the whole stream here, validates the resulting list and returns
    /// it as [`Arg::Value`]. Eager mode on an unbounded stream never returns.
    ///
    /// # Errors
    ///
    /// Returns error if eager validation fails, the producer fails while
    /// draining, or lazy wrapping fails its lookahead
    fn wrap_stream(&self, stream: Stream, ctx: &RuleContext) -> EnforceResult<Arg> {
        if !self.exhaust_eagerly() {
            return self.wrap_lazy(stream, ctx).map(Arg::Stream);
        }

        tracing::warn!(
            rule = self.name(),
            function = ctx.function(),
            parameter = ctx.parameter(),
            "draining stream for eager validation"
        );
        let value = Value::List(stream.materialize()?);
        self.validate(&value, ctx)?;
        Ok(Arg::Value(value))
    }
}

/// Shared handle to a rule, tagged with its capability
#[derive(Clone)]
pub enum RuleRef {
    /// Rule that only validates materialized values
    Plain(Arc<dyn Rule>),
    /// Rule that can also wrap streams
    Streaming(Arc<dyn StreamRule>),
}

impl RuleRef {
    /// Wrap a rule without stream support
    #[must_use]
    pub fn plain<R: Rule + 'static>(rule: R) -> Self {
        Self::Plain(Arc::new(rule))
    }

    /// Wrap a stream-capable rule
    #[must_use]
    pub fn streaming<R: StreamRule + 'static>(rule: R) -> Self {
        Self::Streaming(Arc::new(rule))
    }

    /// Rule name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(rule) => rule.name(),
            Self::Streaming(rule) => rule.name(),
        }
    }

    /// Whether the rule can be applied to streams
    #[must_use]
    pub fn supports_streams(&self) -> bool {
        matches!(self, Self::Streaming(_))
    }

    /// Borrow the stream capability, if present
    #[must_use]
    pub fn as_stream_rule(&self) -> Option<&dyn StreamRule> {
        match self {
            Self::Streaming(rule) => Some(rule.as_ref()),
            Self::Plain(_) => None,
        }
    }

    /// Check a materialized value with this rule
    ///
    /// # Errors
    ///
    /// Propagates the rule's failure
    pub fn validate(&self, value: &Value, ctx: &RuleContext) -> EnforceResult<()> {
        match self {
            Self::Plain(rule) => rule.validate(value, ctx),
            Self::Streaming(rule) => rule.validate(value, ctx),
        }
    }
}

impl fmt::Debug for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(rule) => f.debug_tuple("Plain").field(rule).finish(),
            Self::Streaming(rule) => f.debug_tuple("Streaming").field(rule).finish(),
        }
    }
}
