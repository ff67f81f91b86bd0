//! Generalization laws and the lifts they produce.

use rtable_convert::{generalize, generalize_pair};
use rtable_foundation::{DataType, ErrorKind, TypeRegistry, Value};

fn maybe_number() -> DataType {
    DataType::maybe(DataType::Number)
}

#[test]
fn number_and_maybe_number_in_either_order() {
    for types in [
        [DataType::Number, maybe_number()],
        [maybe_number(), DataType::Number],
    ] {
        let g = generalize(&types, &TypeRegistry::new()).unwrap();
        assert_eq!(g.result_type, maybe_number());
        assert_eq!(
            g.lift(&TypeRegistry::new(), &DataType::Number, Value::from(4)).unwrap(),
            Value::present(Value::from(4))
        );
        assert_eq!(
            g.lift(&TypeRegistry::new(), &maybe_number(), Value::missing()).unwrap(),
            Value::missing()
        );
    }
}

#[test]
fn arrays_generalize_elementwise() {
    let g = generalize(
        &[DataType::array(DataType::Number), DataType::array(maybe_number())],
        &TypeRegistry::new(),
    )
    .unwrap();
    assert_eq!(g.result_type, DataType::array(maybe_number()));
    let lifted = g
        .lift(
            &TypeRegistry::new(),
            &DataType::array(DataType::Number),
            Value::array([Value::from(1), Value::from(2), Value::from(3)]),
        )
        .unwrap();
    assert_eq!(
        lifted,
        Value::array([
            Value::present(Value::from(1)),
            Value::present(Value::from(2)),
            Value::present(Value::from(3)),
        ])
    );
}

#[test]
fn scalars_join_arrays() {
    let types = [DataType::Text, DataType::array(DataType::Text)];
    let g = generalize(&types, &TypeRegistry::new()).unwrap();
    assert_eq!(g.result_type, DataType::array(DataType::Text));
    assert_eq!(
        g.lift(&TypeRegistry::new(), &DataType::Text, Value::from("a")).unwrap(),
        Value::array([Value::from("a")])
    );
}

#[test]
fn records_union_their_fields() {
    let small = DataType::record([("a", DataType::Number)]);
    let large = DataType::record([("a", DataType::Number), ("b", DataType::Text)]);
    let g = generalize(&[small.clone(), large.clone()], &TypeRegistry::new()).unwrap();
    assert_eq!(
        g.result_type,
        DataType::record([("a", DataType::Number), ("b", DataType::maybe(DataType::Text))])
    );
    assert_eq!(
        g.lift(&TypeRegistry::new(), &small, Value::record([("a", Value::from(1))])).unwrap(),
        Value::record([("a", Value::from(1)), ("b", Value::missing())])
    );
    assert_eq!(
        g.lift(
            &TypeRegistry::new(),
            &large,
            Value::record([("a", Value::from(1)), ("b", Value::from("x"))])
        )
        .unwrap(),
        Value::record([("a", Value::from(1)), ("b", Value::present(Value::from("x")))])
    );
}

#[test]
fn pair_is_directional() {
    let registry = TypeRegistry::new();
    assert!(generalize_pair(&DataType::Number, &maybe_number(), &registry).is_some());
    assert!(generalize_pair(&maybe_number(), &DataType::Number, &registry).is_none());
}

#[test]
fn incompatible_types_fail() {
    let err = generalize(&[DataType::Number, DataType::Text], &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CannotGeneralize { .. }));
    let err = generalize(&[], &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EmptyGeneralization));
}
