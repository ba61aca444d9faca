//! Non-emptiness rule.

use std::iter;
use warden_core::{
    EnforceResult, Rule, RuleContext, RuleRef, Stream, StreamRule, UsageError, ValidationFailure,
    Value,
};

const NAME: &str = "NotEmpty";
const CONDITION: &str = "cannot be empty";

/// Requires a sized value or stream to hold at least one element.
///
/// Lazy stream wrapping pulls exactly one element up front, inside the call,
/// so an empty stream fails at the call site rather than on first use. The
/// pulled element is re-emitted ahead of the rest of the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotEmpty {
    exhaust_eagerly: bool,
}

impl NotEmpty {
    /// Create a lazy rule
    #[must_use]
    pub const fn new() -> Self {
        Self {
            exhaust_eagerly: false,
        }
    }

    /// Create a rule that drains streams before validating.
    ///
    /// A call with an unbounded stream will never return.
    #[must_use]
    pub const fn eager() -> Self {
        Self {
            exhaust_eagerly: true,
        }
    }

    /// Set whether streams are drained up front
    #[must_use]
    pub const fn with_exhaust_eagerly(mut self, exhaust: bool) -> Self {
        self.exhaust_eagerly = exhaust;
        self
    }
}

impl Rule for NotEmpty {
    fn name(&self) -> &str {
        NAME
    }

    fn validate(&self, value: &Value, ctx: &RuleContext) -> EnforceResult<()> {
        match value.len() {
            None => Err(UsageError::unsupported_type(
                ctx,
                NAME,
                value.type_name(),
                "types that have a length",
            )
            .into()),
            Some(0) => Err(ValidationFailure::new(ctx, NAME, CONDITION).into()),
            Some(_) => Ok(()),
        }
    }
}

impl StreamRule for NotEmpty {
    fn exhaust_eagerly(&self) -> bool {
        self.exhaust_eagerly
    }

    fn wrap_lazy(&self, mut stream: Stream, ctx: &RuleContext) -> EnforceResult<Stream> {
        match stream.next() {
            None => Err(ValidationFailure::new(ctx, NAME, CONDITION).into()),
            Some(Err(err)) => Err(err),
            Some(Ok(first)) => Ok(Stream::from_results(iter::once(Ok(first)).chain(stream))),
        }
    }
}

impl From<NotEmpty> for RuleRef {
    fn from(rule: NotEmpty) -> Self {
        RuleRef::streaming(rule)
    }
}
