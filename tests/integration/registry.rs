//! Factor types persisted between runs.

use std::sync::Arc;

use rtable::convert::convert_r_to_tables;
use rtable::foundation::{DataType, TypeManager};
use rtable::rdata::{NA_INTEGER, RValue};
use rtable::runtime::serialize;

fn survey(levels: &[&str]) -> RValue {
    RValue::GenericList {
        values: vec![RValue::FactorList {
            values: vec![1, 2, NA_INTEGER],
            level_names: levels.iter().map(|&l| Arc::from(l)).collect(),
        }],
        attributes: Some(Box::new(RValue::attribute_list([
            ("names", RValue::strings(["answer"])),
            ("class", RValue::strings(["data.frame"])),
            ("row.names", RValue::ints(vec![NA_INTEGER, -3])),
        ]))),
        is_object: true,
    }
}

#[test]
fn factor_types_are_reused_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("types.msgpack");

    let mut first = serialize::load_or_default(&path).unwrap();
    let tables = convert_r_to_tables(&survey(&["yes", "no"]), false, &mut first).unwrap();
    let expected = DataType::maybe(DataType::tagged("answer 0"));
    assert_eq!(tables[0].1.column("answer").unwrap().data_type(), &expected);
    serialize::save_to_file(&first, &path).unwrap();

    let mut second = serialize::load_or_default(&path).unwrap();
    let tables = convert_r_to_tables(&survey(&["no", "yes"]), false, &mut second).unwrap();
    assert_eq!(tables[0].1.column("answer").unwrap().data_type(), &expected);
    assert!(second.lookup_tagged_type("answer 1").is_none());
}
