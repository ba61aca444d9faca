//! Resolving call-site arguments against a signature.

use crate::signature::{ParamKind, Signature};
use indexmap::IndexMap;
use warden_core::{Arg, BindingError, Stream, Value};

/// Arguments as supplied at the call site
#[derive(Debug, Default)]
pub struct Args {
    positional: Vec<Arg>,
    keyword: IndexMap<String, Arg>,
}

impl Args {
    /// Create an empty argument list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Add a keyword argument.
    ///
    /// Repeating a keyword replaces the earlier value.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.keyword.insert(name.into(), arg.into());
        self
    }

    /// Positional arguments in order
    #[must_use]
    pub fn positional(&self) -> &[Arg] {
        &self.positional
    }

    /// Keyword arguments in insertion order
    #[must_use]
    pub fn keyword(&self) -> &IndexMap<String, Arg> {
        &self.keyword
    }

    /// Split into positional and keyword parts
    #[must_use]
    pub fn into_parts(self) -> (Vec<Arg>, IndexMap<String, Arg>) {
        (self.positional, self.keyword)
    }
}

/// Arguments of one invocation, keyed by parameter name in declaration order
#[derive(Debug)]
pub struct BoundArgs {
    arguments: IndexMap<String, (ParamKind, Option<Arg>)>,
}

impl BoundArgs {
    /// Borrow an argument
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.arguments.get(name).and_then(|(_, arg)| arg.as_ref())
    }

    /// Borrow a materialized argument value
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Arg::as_value)
    }

    /// Take an argument out, leaving the slot empty
    pub fn take(&mut self, name: &str) -> Option<Arg> {
        self.arguments.get_mut(name).and_then(|(_, arg)| arg.take())
    }

    /// Take a materialized argument value.
    ///
    /// Leaves a stream argument in place.
    pub fn take_value(&mut self, name: &str) -> Option<Value> {
        match self.take(name)? {
            Arg::Value(value) => Some(value),
            stream => {
                self.put(name, stream);
                None
            }
        }
    }

    /// Take a stream argument.
    ///
    /// Leaves a materialized argument in place.
    pub fn take_stream(&mut self, name: &str) -> Option<Stream> {
        match self.take(name)? {
            Arg::Stream(stream) => Some(stream),
            value => {
                self.put(name, value);
                None
            }
        }
    }

    /// Put an argument back into its slot.
    ///
    /// Names that are not declared parameters are ignored.
    pub(crate) fn put(&mut self, name: &str, arg: Arg) {
        if let Some((_, slot)) = self.arguments.get_mut(name) {
            *slot = Some(arg);
        }
    }

    /// Number of bound parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Whether the signature has no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Iterate over arguments still present, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.arguments
            .iter()
            .filter_map(|(name, (_, arg))| arg.as_ref().map(|arg| (name.as_str(), arg)))
    }

    /// Rebuild the call shape: positional-or-keyword parameters become
    /// positional arguments, keyword-only parameters stay keywords.
    ///
    /// Arguments already taken out are skipped.
    #[must_use]
    pub fn into_args(self) -> Args {
        let mut args = Args::new();
        for (name, (kind, arg)) in self.arguments {
            let Some(arg) = arg else { continue };
            args = match kind {
                ParamKind::PositionalOrKeyword => args.arg(arg),
                ParamKind::KeywordOnly => args.kwarg(name, arg),
            };
        }
        args
    }
}

/// Resolve call-site arguments against a signature.
///
/// Positional arguments fill positional-or-keyword parameters in order,
/// keywords fill parameters by name, and omitted parameters take a copy of
/// their default.
///
/// # Errors
///
/// Returns error if there are too many positional arguments, a keyword names
/// no parameter, a parameter is given twice, or a required parameter is
/// missing
pub fn bind(signature: &Signature, args: Args) -> Result<BoundArgs, BindingError> {
    let params = signature.params();
    let (positional, keyword) = args.into_parts();
    let mut slots: Vec<Option<Arg>> = params.iter().map(|_| None).collect();

    let expected = signature.positional_count();
    if positional.len() > expected {
        return Err(BindingError::TooManyPositional {
            function: signature.name().to_string(),
            expected,
            given: positional.len(),
        });
    }

    let positional_slots = params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind() == ParamKind::PositionalOrKeyword)
        .map(|(i, _)| i);
    for (index, arg) in positional_slots.zip(positional) {
        slots[index] = Some(arg);
    }

    for (name, arg) in keyword {
        let Some(index) = params.iter().position(|p| p.name() == name) else {
            return Err(BindingError::UnexpectedKeyword {
                function: signature.name().to_string(),
                keyword: name,
            });
        };
        if slots[index].is_some() {
            return Err(BindingError::MultipleValues {
                function: signature.name().to_string(),
                parameter: name,
            });
        }
        slots[index] = Some(arg);
    }

    let mut arguments = IndexMap::with_capacity(params.len());
    for (param, slot) in params.iter().zip(slots) {
        let arg = match (slot, param.default()) {
            (Some(arg), _) => arg,
            (None, Some(default)) => Arg::Value(default.clone()),
            (None, None) => {
                return Err(BindingError::MissingArgument {
                    function: signature.name().to_string(),
                    parameter: param.name().to_string(),
                });
            }
        };
        arguments.insert(param.name().to_string(), (param.kind(), Some(arg)));
    }

    tracing::trace!(function = signature.name(), bound = arguments.len(), "arguments bound");
    Ok(BoundArgs { arguments })
}
