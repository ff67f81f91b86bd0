//! Table to bytes to table.

use rtable::convert::{TableKind, convert_r_to_tables, convert_table_to_r};
use rtable::foundation::{Column, DataType, Table, TypeRegistry, Value};
use rtable::rdata::{from_bytes, to_bytes};

fn optional<V: Into<Value>>(values: Vec<Option<V>>) -> Vec<Value> {
    values
        .into_iter()
        .map(|v| v.map_or_else(Value::missing, |v| Value::present(v.into())))
        .collect()
}

#[test]
fn tibble_with_missing_values() {
    let numbers = optional(vec![Some(1), Some(2), None]);
    let labels = optional(vec![Some("x"), Some("y"), None]);
    let table = Table::new(
        "t",
        vec![
            Column::new("n", DataType::maybe(DataType::Number), numbers.clone()).unwrap(),
            Column::new("s", DataType::maybe(DataType::Text), labels.clone()).unwrap(),
        ],
    )
    .unwrap();

    let mut types = TypeRegistry::new();
    let r = convert_table_to_r(&table, TableKind::Tibble, &types).unwrap();
    let bytes = to_bytes(&r).unwrap();
    let decoded = from_bytes(&bytes).unwrap();
    assert!(decoded.inherits("tbl_df"));

    let tables = convert_r_to_tables(&decoded, false, &mut types).unwrap();
    assert_eq!(tables.len(), 1);
    let (name, back) = &tables[0];
    assert_eq!(name, "data");
    assert_eq!(back.row_count(), 3);

    let n = back.column("n").unwrap();
    assert_eq!(n.data_type(), &DataType::maybe(DataType::Number));
    assert_eq!(n.values().iter().cloned().collect::<Vec<_>>(), numbers);

    let s = back.column("s").unwrap();
    assert_eq!(s.data_type(), &DataType::maybe(DataType::Text));
    assert_eq!(s.values().iter().cloned().collect::<Vec<_>>(), labels);
}

#[test]
fn fractional_numbers_survive_as_doubles() {
    let values = optional(vec![Some(0.25), None, Some(1e12)]);
    let table = Table::new(
        "t",
        vec![Column::new("x", DataType::maybe(DataType::Number), values.clone()).unwrap()],
    )
    .unwrap();
    let mut types = TypeRegistry::new();
    let bytes = to_bytes(&convert_table_to_r(&table, TableKind::DataFrame, &types).unwrap()).unwrap();
    let tables = convert_r_to_tables(&from_bytes(&bytes).unwrap(), false, &mut types).unwrap();
    let x = tables[0].1.column("x").unwrap();
    assert_eq!(x.values().iter().cloned().collect::<Vec<_>>(), values);
}

#[test]
fn list_column_round_trip() {
    let table = Table::new(
        "t",
        vec![Column::new(
            "l",
            DataType::array(DataType::Number),
            [
                Value::array([Value::from(1), Value::from(2)]),
                Value::array([Value::from(3), Value::from(4)]),
            ],
        )
        .unwrap()],
    )
    .unwrap();
    let mut types = TypeRegistry::new();
    let bytes = to_bytes(&convert_table_to_r(&table, TableKind::Tibble, &types).unwrap()).unwrap();
    let tables = convert_r_to_tables(&from_bytes(&bytes).unwrap(), false, &mut types).unwrap();
    let l = tables[0].1.column("l").unwrap();
    assert_eq!(l.data_type(), &DataType::array(DataType::Number));
    assert_eq!(l.values(), table.columns()[0].values());
}
