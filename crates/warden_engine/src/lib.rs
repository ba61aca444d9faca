//! WARDEN Enforcement Engine
//!
//! Binds call-site arguments to a declared signature, runs each parameter's
//! rules in order and hands the (possibly wrapped) arguments to the callable.
//! Stream arguments stay lazy unless a rule asks to drain them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod config;
pub mod enforce;
pub mod signature;

#[cfg(test)]
mod scenarios;

pub use binding::{bind, Args, BoundArgs};
pub use config::{ConfigError, ParameterSpec, SignatureSpec};
pub use enforce::{enforce, enforce_parameter, Enforced};
pub use signature::{ParamKind, Parameter, Signature, SignatureError};
