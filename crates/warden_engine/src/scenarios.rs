//! End-to-end behavior of enforced callables.

use crate::{enforce, Args, BoundArgs, Enforced, Parameter, Signature};
use indexmap::IndexMap;
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use warden_core::{EnforceError, EqualityPolicy, Rule, RuleContext, RuleRef, Stream, UsageError, Value};
use warden_rules::{NotEmpty, Unique};

type Passthrough = fn(BoundArgs) -> BoundArgs;

fn passthrough(args: BoundArgs) -> BoundArgs {
    args
}

fn single<const N: usize>(rules: [RuleRef; N]) -> Enforced<Passthrough> {
    let param = rules
        .into_iter()
        .fold(Parameter::new("items"), |param, rule| param.with_rule(rule));
    enforce(Signature::new("f").with_param(param), passthrough as Passthrough).unwrap()
}

fn ints(items: &[i64]) -> Value {
    Value::List(items.iter().copied().map(Value::Int).collect())
}

/// Stream over `items` that counts how many elements were produced
fn counted(items: Vec<Value>, pulled: &Rc<Cell<usize>>) -> Stream {
    let counter = Rc::clone(pulled);
    Stream::new(items.into_iter().inspect(move |_| counter.set(counter.get() + 1)))
}

fn naturals(pulled: &Rc<Cell<usize>>) -> Stream {
    let counter = Rc::clone(pulled);
    Stream::new((0..).map(move |i| {
        counter.set(counter.get() + 1);
        Value::Int(i)
    }))
}

fn call_with_stream(wrapped: &Enforced<Passthrough>, stream: Stream) -> Result<Stream, EnforceError> {
    let mut bound = wrapped.call(Args::new().arg(stream))?;
    Ok(bound.take_stream("items").unwrap())
}

#[derive(Debug)]
struct Sorted;

impl Rule for Sorted {
    fn name(&self) -> &str {
        "Sorted"
    }

    fn validate(&self, value: &Value, ctx: &RuleContext) -> warden_core::EnforceResult<()> {
        let items = value.as_slice().unwrap_or_default();
        let ints: Vec<_> = items.iter().filter_map(Value::as_int).collect();
        if ints.windows(2).all(|w| w[0] <= w[1]) {
            Ok(())
        } else {
            Err(warden_core::ValidationFailure::new(ctx, "Sorted", "must be sorted").into())
        }
    }
}

#[test]
fn test_non_empty_list_passes_unchanged() {
    let wrapped = single([NotEmpty::new().into()]);
    let bound = wrapped.call(Args::new().kwarg("items", ints(&[1, 2, 3]))).unwrap();
    assert_eq!(bound.value("items"), Some(&ints(&[1, 2, 3])));
}

#[test]
fn test_empty_list_fails_with_context() {
    let wrapped = single([NotEmpty::new().into()]);
    let err = wrapped.call(Args::new().kwarg("items", ints(&[]))).unwrap_err();
    let failure = err.as_validation().unwrap();
    assert_eq!(failure.function, "f");
    assert_eq!(failure.parameter, "items");
    assert_eq!(err.to_string(), "Parameter 'items' cannot be empty for function 'f'");
}

#[test]
fn test_duplicate_in_stream_fails_at_second_element() {
    let wrapped = single([Unique::new().into()]);
    let pulled = Rc::new(Cell::new(0));
    let source = vec![Value::Int(1), Value::Int(1), Value::Int(2)];
    let mut stream = call_with_stream(&wrapped, counted(source, &pulled)).unwrap();
    assert_eq!(pulled.get(), 0);

    assert_eq!(stream.next(), Some(Ok(Value::Int(1))));
    let err = stream.next().unwrap().unwrap_err();
    assert!(err.is_validation());
    assert!(stream.next().is_none());
    assert_eq!(pulled.get(), 2);
}

#[test]
fn test_first_element_of_duplicate_stream_is_fine() {
    let wrapped = single([Unique::new().into()]);
    let source = vec![Value::Int(1), Value::Int(1), Value::Int(2)];
    let stream = call_with_stream(&wrapped, Stream::new(source)).unwrap();
    let first: Vec<_> = stream.take(1).collect();
    assert_eq!(first, vec![Ok(Value::Int(1))]);
}

#[test]
fn test_infinite_stream_not_empty() {
    let wrapped = single([NotEmpty::new().into()]);
    let pulled = Rc::new(Cell::new(0));
    let stream = call_with_stream(&wrapped, naturals(&pulled)).unwrap();
    assert_eq!(pulled.get(), 1);

    let first: Vec<_> = stream.take(1000).map(Result::unwrap).collect();
    assert_eq!(first, (0..1000).map(Value::Int).collect::<Vec<_>>());
}

#[test]
fn test_eager_empty_stream_fails_at_call() {
    let wrapped = single([NotEmpty::eager().into()]);
    let err = wrapped.call(Args::new().arg(Stream::empty())).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_unique_on_int_is_usage_error() {
    let wrapped = single([Unique::new().into()]);
    let err = wrapped.call(Args::new().kwarg("items", Value::Int(123))).unwrap_err();
    assert!(err.is_usage());
    let message = err.to_string();
    assert!(message.contains("'Unique'"));
    assert!(message.contains("'int'"));
    assert!(message.contains("'items'"));
}

#[test]
fn test_mixed_annotated_and_plain_parameters() {
    let sig = Signature::new("process_data")
        .with_param(Parameter::new("items").with_rule(NotEmpty::new()).with_rule(Unique::new()))
        .with_param(Parameter::new("label").with_default("none"))
        .with_param(Parameter::new("verbose").keyword_only().with_default(false));
    let wrapped = enforce(sig, |args: BoundArgs| {
        let label = args.value("label").and_then(Value::as_str).unwrap_or("").to_string();
        let verbose = args.value("verbose") == Some(&Value::Bool(true));
        (label, verbose)
    })
    .unwrap();

    let result = wrapped
        .call(Args::new().arg(ints(&[1, 2])).kwarg("verbose", Value::Bool(true)))
        .unwrap();
    assert_eq!(result, ("none".to_string(), true));

    // unannotated parameters accept anything
    let result = wrapped
        .call(Args::new().arg(ints(&[3])).arg(Value::from("")))
        .unwrap();
    assert_eq!(result, (String::new(), false));
}

#[test]
fn test_string_and_map_parameters() {
    let sig = Signature::new("configure_system")
        .with_param(Parameter::new("name").with_rule(NotEmpty::new()))
        .with_param(Parameter::new("settings").with_rule(NotEmpty::new()));
    let wrapped = enforce(sig, passthrough as Passthrough).unwrap();

    let mut settings = IndexMap::new();
    settings.insert("port".to_string(), Value::Int(8080));
    let ok = Args::new()
        .arg(Value::from("server"))
        .arg(Value::Map(settings));
    assert!(wrapped.call(ok).is_ok());

    // first failing parameter is reported
    let err = wrapped
        .call(Args::new().arg(Value::from("")).arg(Value::Map(IndexMap::new())))
        .unwrap_err();
    assert_eq!(err.as_validation().unwrap().parameter, "name");

    let err = wrapped
        .call(Args::new().arg(Value::from("server")).arg(Value::Map(IndexMap::new())))
        .unwrap_err();
    assert_eq!(err.as_validation().unwrap().parameter, "settings");
}

#[test]
fn test_unique_collections() {
    let wrapped = single([Unique::new().into()]);
    let accept = [
        Value::from("abc"),
        Value::Tuple(vec![Value::Int(1), Value::Int(2)]),
        Value::set(vec![Value::Int(1), Value::Int(1)]).unwrap(),
        Value::List(vec![]),
    ];
    for value in accept {
        assert!(wrapped.call(Args::new().arg(value)).is_ok());
    }

    let reject = [
        Value::from("hello"),
        Value::Tuple(vec![Value::Int(1), Value::Int(1)]),
        Value::List(vec![Value::Int(1), Value::Float(1.0)]),
        Value::List(vec![Value::Bool(true), Value::Int(1)]),
    ];
    for value in reject {
        let err = wrapped.call(Args::new().arg(value)).unwrap_err();
        assert!(err.is_validation());
    }
}

#[test]
fn test_strict_equality_keeps_types_apart() {
    let wrapped = single([Unique::new().with_equality(EqualityPolicy::Strict).into()]);
    let value = Value::List(vec![Value::Int(1), Value::Float(1.0), Value::Bool(true)]);
    assert!(wrapped.call(Args::new().arg(value)).is_ok());
}

#[test]
fn test_unhashable_elements_are_usage_errors() {
    let wrapped = single([Unique::new().into()]);
    let value = Value::List(vec![ints(&[1]), ints(&[1])]);
    let err = wrapped.call(Args::new().arg(value)).unwrap_err();
    assert!(matches!(err.as_usage(), Some(UsageError::Unhashable { .. })));

    let stream = call_with_stream(&wrapped, Stream::new(vec![Value::Int(1), ints(&[2])])).unwrap();
    let results: Vec<_> = stream.collect();
    assert_eq!(results.len(), 2);
    assert!(results[1].as_ref().unwrap_err().is_usage());
}

#[test]
fn test_late_duplicate_does_not_overrun() {
    let wrapped = single([Unique::new().into()]);
    let pulled = Rc::new(Cell::new(0));
    let mut source: Vec<Value> = (0..500).map(Value::Int).collect();
    source.push(Value::Int(250));
    source.extend((500..1000).map(Value::Int));

    let stream = call_with_stream(&wrapped, counted(source, &pulled)).unwrap();
    let results: Vec<_> = stream.collect();
    assert_eq!(results.len(), 501);
    assert!(results[..500].iter().all(Result::is_ok));
    assert!(results[500].is_err());
    assert_eq!(pulled.get(), 501);
}

#[test]
fn test_plain_rule_on_stream_fails_before_pull() {
    let wrapped = single([NotEmpty::new().into(), RuleRef::plain(Sorted)]);
    let pulled = Rc::new(Cell::new(0));
    let err = wrapped.call(Args::new().arg(naturals(&pulled))).unwrap_err();
    assert_eq!(
        err.as_usage(),
        Some(&UsageError::stream_unsupported(&RuleContext::new("f", "items"), "Sorted"))
    );
    assert_eq!(pulled.get(), 0);

    // the same rule still validates materialized values
    assert!(wrapped.call(Args::new().arg(ints(&[1, 2, 3]))).is_ok());
    assert!(wrapped.call(Args::new().arg(ints(&[3, 1]))).unwrap_err().is_validation());
}

#[test]
fn test_rule_order_short_circuits() {
    // NotEmpty then Unique: an int fails both, only NotEmpty is reported
    let wrapped = single([NotEmpty::new().into(), Unique::new().into()]);
    let err = wrapped.call(Args::new().arg(Value::Int(0))).unwrap_err();
    assert!(err.to_string().starts_with("Rule 'NotEmpty'"));

    let wrapped = single([Unique::new().into(), NotEmpty::new().into()]);
    let err = wrapped.call(Args::new().arg(Value::Int(0))).unwrap_err();
    assert!(err.to_string().starts_with("Rule 'Unique'"));
}

#[test]
fn test_eager_unique_returns_materialized_list() {
    let wrapped = single([Unique::eager().into()]);
    let source = Stream::new(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    let mut bound = wrapped.call(Args::new().arg(source)).unwrap();
    assert!(bound.take_stream("items").is_none());
    assert_eq!(bound.take_value("items"), Some(ints(&[3, 1, 2])));

    let source = Stream::new(vec![Value::Int(3), Value::Int(3)]);
    assert!(wrapped.call(Args::new().arg(source)).unwrap_err().is_validation());
}

#[test]
fn test_producer_failure_propagates_unchanged() {
    let wrapped = single([NotEmpty::new().into(), Unique::new().into()]);
    let upstream: EnforceError =
        UsageError::stream_unsupported(&RuleContext::new("producer", "src"), "Upstream").into();
    let source = Stream::from_results(vec![Ok(Value::Int(1)), Err(upstream.clone()), Ok(Value::Int(2))]);
    let mut stream = call_with_stream(&wrapped, source).unwrap();
    assert_eq!(stream.next(), Some(Ok(Value::Int(1))));
    assert_eq!(stream.next(), Some(Err(upstream)));
    assert!(stream.next().is_none());
}

#[test]
fn test_callable_sees_wrapped_stream() {
    let sig = Signature::new("consume").with_param(Parameter::new("items").with_rule(Unique::new()));
    let wrapped = enforce(sig, |mut args: BoundArgs| -> Result<usize, EnforceError> {
        let stream = args.take_stream("items").unwrap_or_else(Stream::empty);
        Ok(stream.materialize()?.len())
    })
    .unwrap();

    let ok = wrapped.call(Args::new().arg(Stream::new((0..10).map(Value::Int)))).unwrap();
    assert_eq!(ok, Ok(10));

    // the call succeeds; consumption inside the callable fails
    let dup = Stream::new(vec![Value::Int(1), Value::Int(1)]);
    let inner = wrapped.call(Args::new().arg(dup)).unwrap();
    assert!(inner.unwrap_err().is_validation());
}

#[test]
fn test_into_args_preserves_call_shape() {
    let sig = Signature::new("f")
        .with_param(Parameter::new("items").with_rule(NotEmpty::new()))
        .with_param(Parameter::new("flag").keyword_only().with_default(false));
    let wrapped = enforce(sig, BoundArgs::into_args).unwrap();
    let args = wrapped.call(Args::new().arg(Stream::new(vec![Value::Int(1)]))).unwrap();
    assert_eq!(args.positional().len(), 1);
    assert!(args.positional()[0].is_stream());
    assert_eq!(args.keyword()["flag"].as_value(), Some(&Value::Bool(false)));
}

proptest::proptest! {
    #[test]
    fn prop_lazy_unique_pulls_exactly_n(n in 0usize..2000) {
        let wrapped = single([Unique::new().into()]);
        let pulled = Rc::new(Cell::new(0));
        let stream = call_with_stream(&wrapped, naturals(&pulled)).unwrap();
        let taken: Vec<_> = stream.take(n).map(Result::unwrap).collect();
        prop_assert_eq!(taken, (0..n as i64).map(Value::Int).collect::<Vec<_>>());
        prop_assert_eq!(pulled.get(), n);
    }

    #[test]
    fn prop_duplicate_fails_exactly_at_position(k in 1usize..200, tail in 0usize..50) {
        let wrapped = single([Unique::new().into()]);
        let pulled = Rc::new(Cell::new(0));
        let mut source: Vec<Value> = (0..k as i64).map(Value::Int).collect();
        source.push(Value::Int(0));
        source.extend((0..tail as i64).map(|i| Value::Int(1000 + i)));

        let stream = call_with_stream(&wrapped, counted(source, &pulled)).unwrap();
        let results: Vec<_> = stream.collect();
        prop_assert_eq!(results.len(), k + 1);
        prop_assert!(results[k].is_err());
        prop_assert_eq!(pulled.get(), k + 1);
    }

    #[test]
    fn prop_eager_preserves_order(items in proptest::collection::vec(any::<i64>(), 1..100)) {
        let values: Vec<Value> = items.into_iter().map(Value::Int).collect();
        let wrapped = single([NotEmpty::eager().into()]);
        let mut bound = wrapped.call(Args::new().arg(Stream::new(values.clone()))).unwrap();
        prop_assert_eq!(bound.take_value("items"), Some(Value::List(values)));
    }

    #[test]
    fn prop_chained_pass_through(items in proptest::collection::hash_set(any::<i64>(), 1..100)) {
        let values: Vec<Value> = items.into_iter().map(Value::Int).collect();
        let wrapped = single([NotEmpty::new().into(), Unique::new().into()]);
        let stream = call_with_stream(&wrapped, Stream::new(values.clone())).unwrap();
        prop_assert_eq!(stream.materialize().unwrap(), values);
    }

    #[test]
    fn prop_first_rule_failure_wins(n in any::<i64>()) {
        let wrapped = single([NotEmpty::new().into(), Unique::new().into()]);
        let err = wrapped.call(Args::new().arg(Value::Int(n))).unwrap_err();
        prop_assert!(err.to_string().contains("'NotEmpty'"));
    }
}
