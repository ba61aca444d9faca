//! WARDEN Core Types
//!
//! Values, streams, the error taxonomy and the rule contract shared by the
//! built-in rules and the enforcement engine. Nothing here performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod key;
pub mod rule;
pub mod stream;
pub mod value;

// Re-exports
pub use context::RuleContext;
pub use error::{BindingError, EnforceError, EnforceResult, UsageError, ValidationFailure};
pub use key::{EqualityPolicy, HashKey, Unhashable};
pub use rule::{Rule, RuleRef, StreamRule};
pub use stream::{Arg, Stream};
pub use value::Value;
