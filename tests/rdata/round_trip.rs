//! Encode/decode round trips across the value model.

use std::sync::Arc;

use chrono::NaiveDate;
use rtable_foundation::{DateTimeKind, Temporal};
use rtable_rdata::{NA_INTEGER, PairListEntry, RValue, from_bytes, na_real, to_bytes};

fn round_trip(value: &RValue) -> RValue {
    from_bytes(&to_bytes(value).unwrap()).unwrap()
}

#[test]
fn vectors_with_missing_values() {
    for value in [
        RValue::ints(vec![1, NA_INTEGER, i32::MAX]),
        RValue::doubles(vec![f64::INFINITY, na_real(), -0.0]),
        RValue::logicals(vec![Some(false), None, Some(true)]),
        RValue::StringVector {
            values: vec![Some(Arc::from("héllo")), None, Some(Arc::from(""))],
            attributes: None,
        },
    ] {
        assert_eq!(round_trip(&value), value);
    }
}

#[test]
fn factor_survives() {
    let factor = RValue::FactorList {
        values: vec![3, 1, NA_INTEGER],
        level_names: vec![Arc::from("a"), Arc::from("b"), Arc::from("c")],
    };
    assert_eq!(round_trip(&factor), factor);
}

#[test]
fn dates_survive() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let value = RValue::TemporalVector {
        kind: DateTimeKind::YearMonthDay,
        values: vec![Some(Temporal::Date(date)), None],
        attributes: Some(Box::new(RValue::attribute_list([(
            "class",
            RValue::strings(["Date"]),
        )]))),
    };
    assert_eq!(round_trip(&value), value);
}

#[test]
fn zoned_times_come_back_in_utc() {
    let utc = NaiveDate::from_ymd_opt(2020, 6, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap()
        .and_utc()
        .fixed_offset();
    let value = RValue::TemporalVector {
        kind: DateTimeKind::DateTimeZoned,
        values: vec![Some(Temporal::Zoned(utc))],
        attributes: Some(Box::new(RValue::attribute_list([
            ("class", RValue::strings(["POSIXct", "POSIXt"])),
            ("tzone", RValue::strings(["UTC"])),
        ]))),
    };
    assert_eq!(round_trip(&value), value);
}

#[test]
fn nested_lists_and_pair_lists() {
    let value = RValue::GenericList {
        values: vec![
            RValue::Nil,
            RValue::PairList(vec![
                PairListEntry::tagged("a", RValue::ints(vec![1])),
                PairListEntry::untagged(RValue::strings(["b"])),
                PairListEntry::tagged("a", RValue::doubles(vec![2.0])),
            ]),
            RValue::GenericList {
                values: vec![RValue::strings(["deep"])],
                attributes: None,
                is_object: false,
            },
        ],
        attributes: None,
        is_object: false,
    };
    assert_eq!(round_trip(&value), value);
}

#[test]
fn empty_pair_list_reads_back_as_nil() {
    let bytes = to_bytes(&RValue::PairList(Vec::new())).unwrap();
    assert_eq!(bytes, to_bytes(&RValue::Nil).unwrap());
    assert_eq!(from_bytes(&bytes).unwrap(), RValue::Nil);
}
