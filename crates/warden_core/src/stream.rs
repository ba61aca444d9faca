//! Lazily produced argument sequences.
//!
//! A [`Stream`] owns its producer. Passing one into a call moves it, so the
//! caller cannot keep reading the original sequence while a wrapper consumes
//! it. Items are results so that a wrapper can fail at the exact production
//! step where a violation is seen.

use crate::error::EnforceResult;
use crate::value::Value;
use std::fmt;

/// A lazily produced, possibly unbounded sequence of values
pub struct Stream {
    inner: Box<dyn Iterator<Item = EnforceResult<Value>>>,
}

impl Stream {
    /// Create a stream from an infallible producer
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self {
            inner: Box::new(values.into_iter().map(Ok)),
        }
    }

    /// Create a stream from a producer whose steps may fail.
    ///
    /// A failed item is passed on unchanged to whoever pulls it.
    pub fn from_results<I>(items: I) -> Self
    where
        I: IntoIterator<Item = EnforceResult<Value>>,
        I::IntoIter: 'static,
    {
        Self {
            inner: Box::new(items.into_iter()),
        }
    }

    /// A stream that produces nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Drain the stream into a vector.
    ///
    /// Never returns for an unbounded producer.
    ///
    /// # Errors
    ///
    /// Returns the first failed item; nothing after it is pulled
    pub fn materialize(self) -> EnforceResult<Vec<Value>> {
        self.collect()
    }
}

impl Iterator for Stream {
    type Item = EnforceResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

/// A resolved argument: either materialized or a stream
#[derive(Debug)]
pub enum Arg {
    /// Fully materialized value
    Value(Value),
    /// Lazily produced sequence
    Stream(Stream),
}

impl Arg {
    /// Whether this argument is a stream
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Borrow the materialized value
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Stream(_) => None,
        }
    }

    /// Take the materialized value
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Stream(_) => None,
        }
    }

    /// Take the stream
    #[must_use]
    pub fn into_stream(self) -> Option<Stream> {
        match self {
            Self::Stream(stream) => Some(stream),
            Self::Value(_) => None,
        }
    }

    /// Short description used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(value) => value.type_name(),
            Self::Stream(_) => "stream",
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Stream> for Arg {
    fn from(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}
