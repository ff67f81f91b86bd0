//! Converters build optional types and values through the type manager.

use std::sync::Arc;

use rtable_convert::{RConverter, generalize};
use rtable_foundation::{
    DataType, ErrorKind, RtMap, TagType, TaggedTypeDefinition, TaggedTypeRef, TaggedValue,
    TypeManager, TypeRegistry, Value,
};
use rtable_rdata::{RValue, na_real};

/// Encodes optionals as `Option<T>` with `Some` (0) and `None` (1).
struct OptionTypes(TypeRegistry);

impl TypeManager for OptionTypes {
    fn register_tagged_type(
        &mut self,
        name: &str,
        type_params: Vec<Arc<str>>,
        tags: Vec<TagType>,
    ) -> Option<Arc<TaggedTypeDefinition>> {
        self.0.register_tagged_type(name, type_params, tags)
    }

    fn known_tagged_types(&self) -> RtMap<Arc<str>, Arc<TaggedTypeDefinition>> {
        self.0.known_tagged_types()
    }

    fn make_maybe_type(&self, inner: DataType) -> DataType {
        option(inner)
    }

    fn maybe_present(&self, value: Value) -> Value {
        some(value)
    }

    fn maybe_missing(&self) -> Value {
        Value::tag(1)
    }
}

fn option(inner: DataType) -> DataType {
    DataType::Tagged(TaggedTypeRef {
        name: Arc::from("Option"),
        args: vec![inner],
    })
}

fn some(value: Value) -> Value {
    Value::Tagged(TaggedValue {
        tag: 0,
        inner: Some(Box::new(value)),
    })
}

#[test]
fn missing_doubles_use_the_managers_encoding() {
    let mut types = OptionTypes(TypeRegistry::new());
    let t = RConverter::new(&mut types, "x")
        .convert(&RValue::doubles(vec![1.0, na_real()]))
        .unwrap();
    assert_eq!(t.data_type, option(DataType::Number));
    assert_eq!(t.values, vec![some(Value::from(1)), Value::tag(1)]);
}

#[test]
fn generalization_lifts_into_the_managers_optional() {
    let types = OptionTypes(TypeRegistry::new());
    let g = generalize(&[DataType::Number, option(DataType::Number)], &types).unwrap();
    assert_eq!(g.result_type, option(DataType::Number));
    assert_eq!(
        g.lift(&types, &DataType::Number, Value::from(2)).unwrap(),
        some(Value::from(2))
    );
}

#[test]
fn record_union_fills_absent_fields_with_the_managers_missing() {
    let types = OptionTypes(TypeRegistry::new());
    let a = DataType::record([("a", DataType::Number)]);
    let b = DataType::record([("b", DataType::Text)]);
    let g = generalize(&[a.clone(), b], &types).unwrap();
    assert_eq!(
        g.result_type,
        DataType::record([("a", option(DataType::Number)), ("b", option(DataType::Text))])
    );
    assert_eq!(
        g.lift(&types, &a, Value::record([("a", Value::from(1))])).unwrap(),
        Value::record([("a", some(Value::from(1))), ("b", Value::tag(1))])
    );
}

#[test]
fn builtin_maybe_is_not_the_managers_optional() {
    let types = OptionTypes(TypeRegistry::new());
    let err = generalize(&[DataType::Number, DataType::maybe(DataType::Number)], &types)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CannotGeneralize { .. }));
}
