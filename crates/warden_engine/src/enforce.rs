//! Rule dispatch around a callable.

use crate::binding::{bind, Args, BoundArgs};
use crate::signature::{Signature, SignatureError};
use std::fmt;
use std::sync::Arc;
use warden_core::{Arg, EnforceResult, RuleContext, RuleRef, UsageError};

/// A callable whose parameters are checked against their rules on every call
pub struct Enforced<F> {
    signature: Arc<Signature>,
    func: F,
}

impl<F> Enforced<F> {
    /// The declared signature
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke the callable.
    ///
    /// Arguments are bound, then each ruled parameter is checked in
    /// declaration order. Stream arguments are replaced by their validating
    /// wrappers (or by materialized values for eager rules) before the
    /// callable runs. The callable's return value is passed back unchanged.
    ///
    /// # Errors
    ///
    /// Returns a usage error if binding fails or a rule cannot handle its
    /// argument, and a validation failure if a materialized argument (or an
    /// eagerly drained stream) breaks a rule. The callable is not invoked in
    /// either case.
    pub fn call<R>(&self, args: Args) -> EnforceResult<R>
    where
        F: Fn(BoundArgs) -> R,
    {
        let mut bound = bind(&self.signature, args)?;

        for param in self.signature.params() {
            if !param.has_rules() {
                continue;
            }
            let Some(arg) = bound.take(param.name()) else {
                continue;
            };
            let ctx = RuleContext::new(self.signature.name(), param.name());
            let arg = enforce_parameter(param.rules(), arg, &ctx)?;
            bound.put(param.name(), arg);
        }

        Ok((self.func)(bound))
    }
}

impl<F> fmt::Debug for Enforced<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enforced")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Wrap a callable so that its declared rules run on every call.
///
/// # Errors
///
/// Returns error if the signature is malformed
pub fn enforce<F>(signature: Signature, func: F) -> Result<Enforced<F>, SignatureError> {
    signature.check()?;
    tracing::debug!(
        function = signature.name(),
        params = signature.params().len(),
        ruled = signature.ruled_count(),
        "enforcing rules"
    );
    Ok(Enforced {
        signature: Arc::new(signature),
        func,
    })
}

/// Apply an ordered rule list to one argument.
///
/// A materialized value goes through each rule's `validate` and the first
/// failure wins. A stream is first checked for rules that cannot take
/// streams, before anything is pulled, then threaded through each rule in
/// order. Once an eager rule has materialized the stream, the remaining
/// rules validate the materialized value.
///
/// # Errors
///
/// Returns the first failure raised by a rule, or a usage error naming the
/// first rule that cannot handle a stream argument
pub fn enforce_parameter(rules: &[RuleRef], arg: Arg, ctx: &RuleContext) -> EnforceResult<Arg> {
    if arg.is_stream() {
        if let Some(rule) = rules.iter().find(|r| !r.supports_streams()) {
            return Err(UsageError::stream_unsupported(ctx, rule.name()).into());
        }
    }

    tracing::trace!(
        function = ctx.function(),
        parameter = ctx.parameter(),
        kind = arg.kind(),
        rules = rules.len(),
        "checking parameter"
    );

    rules.iter().try_fold(arg, |arg, rule| match (rule, arg) {
        (RuleRef::Streaming(rule), Arg::Stream(stream)) => rule.wrap_stream(stream, ctx),
        (rule, Arg::Value(value)) => {
            rule.validate(&value, ctx)?;
            Ok(Arg::Value(value))
        }
        (RuleRef::Plain(rule), Arg::Stream(_)) => {
            Err(UsageError::stream_unsupported(ctx, rule.name()).into())
        }
    })
}
