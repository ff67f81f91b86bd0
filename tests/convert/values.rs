//! R values to typed host values.

use std::sync::Arc;

use rtable_convert::RConverter;
use rtable_foundation::{DataType, ErrorKind, TypeManager, TypeRegistry, Value};
use rtable_rdata::{NA_INTEGER, RValue, na_real};

#[test]
fn nan_becomes_missing() {
    let mut types = TypeRegistry::new();
    let converted = RConverter::new(&mut types, "x")
        .convert(&RValue::doubles(vec![1.5, f64::NAN, na_real(), -2.0]))
        .unwrap();
    assert_eq!(converted.data_type, DataType::maybe(DataType::Number));
    assert_eq!(
        converted.values,
        vec![
            Value::present(Value::from(1.5)),
            Value::missing(),
            Value::missing(),
            Value::present(Value::from(-2.0)),
        ]
    );
}

#[test]
fn factor_levels_in_any_order_share_a_type() {
    let mut types = TypeRegistry::new();
    let first = RValue::FactorList {
        values: vec![1, 2],
        level_names: vec![Arc::from("yes"), Arc::from("no")],
    };
    let second = RValue::FactorList {
        values: vec![2, NA_INTEGER],
        level_names: vec![Arc::from("no"), Arc::from("yes")],
    };
    let a = RConverter::new(&mut types, "answer").convert(&first).unwrap();
    let b = RConverter::new(&mut types, "reply").convert(&second).unwrap();

    assert_eq!(a.data_type, DataType::tagged("answer 0"));
    assert_eq!(b.data_type, DataType::maybe(DataType::tagged("answer 0")));
    // Codes follow the registered tag order, not the second factor's levels.
    assert_eq!(a.values[0], Value::tag(0));
    assert_eq!(b.values[0], Value::present(Value::tag(0)));
    assert!(types.lookup_tagged_type("reply 0").is_none());
}

#[test]
fn taken_factor_names_are_skipped() {
    let mut types = TypeRegistry::new();
    types
        .register_tagged_type("grade 0", vec![], vec![rtable_foundation::TagType::bare("other")])
        .unwrap();
    let factor = RValue::FactorList {
        values: vec![1],
        level_names: vec![Arc::from("A")],
    };
    let converted = RConverter::new(&mut types, "grade").convert(&factor).unwrap();
    assert_eq!(converted.data_type, DataType::tagged("grade 1"));
}

#[test]
fn list_elements_generalize() {
    let list = RValue::GenericList {
        values: vec![
            RValue::ints(vec![1]),
            RValue::ints(vec![NA_INTEGER]),
            RValue::ints(vec![2, NA_INTEGER]),
        ],
        attributes: None,
        is_object: false,
    };
    let converted = RConverter::new(&mut TypeRegistry::new(), "l").convert(&list).unwrap();
    assert_eq!(
        converted.data_type,
        DataType::array(DataType::maybe(DataType::Number))
    );
    assert_eq!(
        converted.values[0],
        Value::array([Value::present(Value::from(1))])
    );
    assert_eq!(
        converted.values[2],
        Value::array([Value::present(Value::from(2)), Value::missing()])
    );
}

#[test]
fn null_cannot_be_converted() {
    let err = RConverter::new(&mut TypeRegistry::new(), "x")
        .convert(&RValue::Nil)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NilValue));
    assert!(!err.is_internal());
}
