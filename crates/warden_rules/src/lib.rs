//! WARDEN Built-in Rules
//!
//! Non-emptiness and uniqueness, each usable on materialized values and on
//! streams, plus their serializable declarations.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod not_empty;
pub mod spec;
pub mod unique;

pub use not_empty::NotEmpty;
pub use spec::RuleSpec;
pub use unique::Unique;
