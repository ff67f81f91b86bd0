//! Integration tests for columns and tables

use rtable_foundation::{Column, DataType, ErrorKind, Table, Value};

fn numbers(name: &str, values: &[f64]) -> Column {
    Column::new(name, DataType::Number, values.iter().map(|&x| Value::from(x))).unwrap()
}

#[test]
fn column_checks_values_against_its_type() {
    let err = Column::new("n", DataType::Number, [Value::from("one")]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert!(err.to_string().contains("column \"n\""));
}

#[test]
fn optional_column_accepts_missing() {
    let column = Column::new(
        "n",
        DataType::maybe(DataType::Number),
        [Value::present(Value::from(1)), Value::missing()],
    )
    .unwrap();
    assert_eq!(column.len(), 2);
    assert!(column.values().get(1).is_some_and(Value::is_missing));
}

#[test]
fn table_row_count() {
    let table = Table::new("t", vec![numbers("a", &[1.0, 2.0]), numbers("b", &[3.0, 4.0])]).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column("b").map(Column::len), Some(2));
    assert!(table.column("c").is_none());
}

#[test]
fn empty_table_has_no_rows() {
    let table = Table::new("empty", vec![]).unwrap();
    assert_eq!(table.row_count(), 0);
}

#[test]
fn ragged_table_is_rejected() {
    let err = Table::new("t", vec![numbers("a", &[1.0]), numbers("b", &[1.0, 2.0])]).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LengthMismatch {
            expected: 1,
            actual: 2,
            ..
        }
    ));
}
