//! Uniqueness rule.

use std::collections::HashSet;
use std::hash::Hash;
use warden_core::{
    EnforceResult, EqualityPolicy, HashKey, Rule, RuleContext, RuleRef, Stream, StreamRule,
    UsageError, ValidationFailure, Value,
};

const NAME: &str = "Unique";
const CONDITION: &str = "must contain unique elements";
const REQUIREMENT: &str = "iterable collections with hashable elements";

/// Requires every element of a collection or stream to be distinct.
///
/// Maps pass trivially. Sets are checked like lists, since a `Value::Set`
/// built directly rather than through [`Value::set`] may repeat elements.
/// Strings are checked by character and bytes by byte. Element comparison
/// follows the configured [`EqualityPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unique {
    exhaust_eagerly: bool,
    equality: EqualityPolicy,
}

impl Unique {
    /// Create a lazy rule with structural equality
    #[must_use]
    pub const fn new() -> Self {
        Self {
            exhaust_eagerly: false,
            equality: EqualityPolicy::Structural,
        }
    }

    /// Create a rule that drains streams before validating.
    ///
    /// A call with an unbounded stream will never return.
    #[must_use]
    pub const fn eager() -> Self {
        Self {
            exhaust_eagerly: true,
            equality: EqualityPolicy::Structural,
        }
    }

    /// Set whether streams are drained up front
    #[must_use]
    pub const fn with_exhaust_eagerly(mut self, exhaust: bool) -> Self {
        self.exhaust_eagerly = exhaust;
        self
    }

    /// Set the element equality policy
    #[must_use]
    pub const fn with_equality(mut self, equality: EqualityPolicy) -> Self {
        self.equality = equality;
        self
    }

    /// Element equality policy
    #[must_use]
    pub const fn equality(&self) -> EqualityPolicy {
        self.equality
    }

    fn check_elements(&self, items: &[Value], ctx: &RuleContext) -> EnforceResult<()> {
        // Every element must hash before duplicates are counted, so an
        // unhashable element is reported even when a duplicate precedes it.
        let keys = items
            .iter()
            .map(|item| HashKey::of(item, self.equality))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| UsageError::unhashable(ctx, NAME, err.type_name))?;
        check_distinct(keys, ctx)
    }
}

fn check_distinct<K, I>(keys: I, ctx: &RuleContext) -> EnforceResult<()>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    let mut seen = HashSet::new();
    if keys.into_iter().all(|key| seen.insert(key)) {
        Ok(())
    } else {
        Err(ValidationFailure::new(ctx, NAME, CONDITION).into())
    }
}

impl Rule for Unique {
    fn name(&self) -> &str {
        NAME
    }

    fn validate(&self, value: &Value, ctx: &RuleContext) -> EnforceResult<()> {
        match value {
            Value::Map(_) => Ok(()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                self.check_elements(items, ctx)
            }
            Value::Str(s) => check_distinct(s.chars(), ctx),
            Value::Bytes(b) => check_distinct(b.iter().copied(), ctx),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) => Err(
                UsageError::unsupported_type(ctx, NAME, value.type_name(), REQUIREMENT).into(),
            ),
        }
    }
}

impl StreamRule for Unique {
    fn exhaust_eagerly(&self) -> bool {
        self.exhaust_eagerly
    }

    fn wrap_lazy(&self, stream: Stream, ctx: &RuleContext) -> EnforceResult<Stream> {
        Ok(Stream::from_results(UniqueStream {
            upstream: stream,
            seen: HashSet::new(),
            equality: self.equality,
            ctx: ctx.clone(),
            done: false,
        }))
    }
}

impl From<Unique> for RuleRef {
    fn from(rule: Unique) -> Self {
        RuleRef::streaming(rule)
    }
}

/// Re-emits upstream elements, failing on the first repeat.
///
/// Holds one hash key per emitted element and nothing that has not been
/// pulled. Produces nothing further once a failure has been yielded.
struct UniqueStream {
    upstream: Stream,
    seen: HashSet<HashKey>,
    equality: EqualityPolicy,
    ctx: RuleContext,
    done: bool,
}

impl UniqueStream {
    fn fail(&mut self, err: impl Into<warden_core::EnforceError>) -> Option<EnforceResult<Value>> {
        self.done = true;
        Some(Err(err.into()))
    }
}

impl Iterator for UniqueStream {
    type Item = EnforceResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let value = match self.upstream.next()? {
            Ok(value) => value,
            Err(err) => return self.fail(err),
        };

        let key = match HashKey::of(&value, self.equality) {
            Ok(key) => key,
            Err(err) => return self.fail(UsageError::unhashable(&self.ctx, NAME, err.type_name)),
        };

        if !self.seen.insert(key) {
            tracing::debug!(
                function = self.ctx.function(),
                parameter = self.ctx.parameter(),
                position = self.seen.len(),
                "duplicate element in stream"
            );
            return self.fail(ValidationFailure::new(&self.ctx, NAME, CONDITION));
        }

        Some(Ok(value))
    }
}
