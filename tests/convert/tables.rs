//! Data frame and tibble conventions.

use rtable_convert::{ConvertOptions, TableKind, convert_r_to_tables_with, convert_table_to_r_with};
use rtable_foundation::{Column, DataType, ErrorKind, Table, TagType, TypeManager, TypeRegistry, Value};
use rtable_rdata::{NA_INTEGER, RValue};

fn people() -> Table {
    Table::new(
        "people",
        vec![
            Column::new("first name", DataType::Text, [Value::from("Ada"), Value::from("Alan")]).unwrap(),
            Column::new("if", DataType::Boolean, [Value::from(true), Value::from(false)]).unwrap(),
        ],
    )
    .unwrap()
}

#[test]
fn data_frame_names_are_escaped() {
    let options = ConvertOptions::default();
    let r = convert_table_to_r_with(&people(), &options, &TypeRegistry::new()).unwrap();
    let names: Vec<&str> = r
        .names()
        .unwrap()
        .iter()
        .map(|n| n.as_deref().unwrap())
        .collect();
    assert_eq!(names, ["first.name", "if."]);
}

#[test]
fn enum_columns_round_trip_as_factors() {
    let mut types = TypeRegistry::new();
    types
        .register_tagged_type(
            "Size",
            vec![],
            vec![TagType::bare("S"), TagType::bare("M"), TagType::bare("L")],
        )
        .unwrap();
    let table = Table::new(
        "shirts",
        vec![Column::new("size", DataType::tagged("Size"), [Value::tag(2), Value::tag(0)]).unwrap()],
    )
    .unwrap();

    let options = ConvertOptions::default().with_table_kind(TableKind::Tibble);
    let r = convert_table_to_r_with(&table, &options, &types).unwrap();
    let tables = convert_r_to_tables_with(&r, &options, &mut types).unwrap();
    let size = tables[0].1.column("size").unwrap();
    // The existing definition is reused rather than a new "size 0".
    assert_eq!(size.data_type(), &DataType::tagged("Size"));
    assert_eq!(size.values().get(0), Some(&Value::tag(2)));
}

#[test]
fn default_table_name_is_configurable() {
    let frame = RValue::GenericList {
        values: vec![RValue::ints(vec![1])],
        attributes: Some(Box::new(RValue::attribute_list([
            ("names", RValue::strings(["n"])),
            ("class", RValue::strings(["data.frame"])),
            ("row.names", RValue::ints(vec![NA_INTEGER, -1])),
        ]))),
        is_object: true,
    };
    let options = ConvertOptions::default().with_default_table_name("imported");
    let tables = convert_r_to_tables_with(&frame, &options, &mut TypeRegistry::new()).unwrap();
    assert_eq!(tables[0].0, "imported");
}

#[test]
fn column_errors_name_the_column_and_table() {
    let frame = RValue::GenericList {
        values: vec![RValue::GenericList {
            values: vec![RValue::ints(vec![1]), RValue::strings(["a"])],
            attributes: None,
            is_object: false,
        }],
        attributes: Some(Box::new(RValue::attribute_list([
            ("names", RValue::strings(["mixed"])),
            ("class", RValue::strings(["data.frame"])),
        ]))),
        is_object: true,
    };
    let err = convert_r_to_tables_with(&frame, &ConvertOptions::default(), &mut TypeRegistry::new())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CannotGeneralize { .. }));
    let msg = err.to_string();
    assert!(msg.contains("column \"mixed\""));
    assert!(msg.contains("table \"data\""));
}
