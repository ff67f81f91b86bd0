//! Decoding serializations built byte by byte, the way R writes them.

use std::sync::Arc;

use chrono::NaiveDate;
use rtable_foundation::{DateTimeKind, ErrorKind, Temporal};
use rtable_rdata::{NA_INTEGER, RValue, from_bytes};

const INTSXP: u32 = 13;
const REALSXP: u32 = 14;
const STRSXP: u32 = 16;
const VECSXP: u32 = 19;
const LISTSXP: u32 = 2;
const SYMSXP: u32 = 1;
const REFSXP: u32 = 255;
const NILVALUE: u32 = 254;
const OBJECT: u32 = 1 << 8;
const ATTR: u32 = 1 << 9;
const TAG: u32 = 1 << 10;

#[derive(Default)]
struct Bytes(Vec<u8>);

impl Bytes {
    fn v3() -> Self {
        let mut b = Self::default();
        b.raw(b"X\n").int(3).int(0x0004_0300).int(0x0003_0500).int(5).raw(b"UTF-8");
        b
    }

    fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(bytes);
        self
    }

    fn int(&mut self, n: i32) -> &mut Self {
        self.raw(&n.to_be_bytes())
    }

    fn bits(&mut self, n: u32) -> &mut Self {
        self.raw(&n.to_be_bytes())
    }

    fn double(&mut self, x: f64) -> &mut Self {
        self.raw(&x.to_be_bytes())
    }

    fn chars(&mut self, s: &str) -> &mut Self {
        let len = i32::try_from(s.len()).unwrap();
        self.bits(0x0004_0009).int(len).raw(s.as_bytes())
    }

    fn strings(&mut self, values: &[&str]) -> &mut Self {
        self.bits(STRSXP).int(i32::try_from(values.len()).unwrap());
        for s in values {
            self.chars(s);
        }
        self
    }

    /// A tagged attribute node with a fresh symbol.
    fn attribute(&mut self, name: &str) -> &mut Self {
        self.bits(LISTSXP | TAG).bits(SYMSXP).chars(name)
    }
}

#[test]
fn factor_with_levels_and_class() {
    let mut b = Bytes::v3();
    b.bits(INTSXP | OBJECT | ATTR).int(3).int(2).int(NA_INTEGER).int(1);
    b.attribute("levels").strings(&["lo", "hi"]);
    b.attribute("class").strings(&["factor"]);
    b.bits(NILVALUE);

    assert_eq!(
        from_bytes(&b.0).unwrap(),
        RValue::FactorList {
            values: vec![2, NA_INTEGER, 1],
            level_names: vec![Arc::from("lo"), Arc::from("hi")],
        }
    );
}

#[test]
fn date_vector_becomes_temporal() {
    let mut b = Bytes::v3();
    b.bits(REALSXP | OBJECT | ATTR).int(2).double(0.0).double(19_000.0);
    b.attribute("class").strings(&["Date"]);
    b.bits(NILVALUE);

    let RValue::TemporalVector { kind, values, .. } = from_bytes(&b.0).unwrap() else {
        panic!("expected a temporal vector");
    };
    assert_eq!(kind, DateTimeKind::YearMonthDay);
    assert_eq!(
        values[0],
        Some(Temporal::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()))
    );
    assert_eq!(
        values[1],
        Some(Temporal::Date(NaiveDate::from_ymd_opt(2022, 1, 8).unwrap()))
    );
}

#[test]
fn data_frame_attributes() {
    // data.frame(a = 7L, b = "x")
    let mut b = Bytes::v3();
    b.bits(VECSXP | OBJECT | ATTR).int(2);
    b.bits(INTSXP).int(1).int(7);
    b.strings(&["x"]);
    b.attribute("names").strings(&["a", "b"]);
    b.attribute("class").strings(&["data.frame"]);
    b.attribute("row.names").bits(INTSXP).int(2).int(NA_INTEGER).int(-1);
    b.bits(NILVALUE);

    let frame = from_bytes(&b.0).unwrap();
    assert!(frame.inherits("data.frame"));
    assert_eq!(frame.names().map(<[_]>::len), Some(2));
    assert_eq!(
        frame.attribute("row.names"),
        Some(&RValue::ints(vec![NA_INTEGER, -1]))
    );
}

#[test]
fn repeated_symbol_uses_reference() {
    // pairlist(x = 1L, x = 2L): the second tag is REF 1.
    let mut b = Bytes::v3();
    b.bits(LISTSXP | TAG).bits(SYMSXP).chars("x").bits(INTSXP).int(1).int(1);
    b.bits(LISTSXP | TAG).bits(REFSXP | (1 << 8)).bits(INTSXP).int(1).int(2);
    b.bits(NILVALUE);

    let RValue::PairList(entries) = from_bytes(&b.0).unwrap() else {
        panic!("expected a pair list");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].tag_name(), Some("x"));
    assert_eq!(entries[1].tag_name(), Some("x"));
}

#[test]
fn compact_sequence_from_modern_r() {
    let mut b = Bytes::v3();
    b.bits(238);
    b.bits(LISTSXP).bits(SYMSXP).chars("compact_intseq");
    b.bits(LISTSXP).bits(SYMSXP).chars("base");
    b.bits(LISTSXP).bits(INTSXP).int(1).int(13);
    b.bits(NILVALUE);
    b.bits(REALSXP).int(3).double(5.0).double(10.0).double(-1.0);
    b.bits(NILVALUE);

    assert_eq!(from_bytes(&b.0).unwrap(), RValue::ints(vec![10, 9, 8, 7, 6]));
}

fn compact_sequence(class: &str, state: [f64; 3]) -> Vec<u8> {
    let mut b = Bytes::v3();
    b.bits(238);
    b.bits(LISTSXP).bits(SYMSXP).chars(class);
    b.bits(LISTSXP).bits(SYMSXP).chars("base");
    b.bits(LISTSXP).bits(INTSXP).int(1).int(14);
    b.bits(NILVALUE);
    b.bits(REALSXP).int(3);
    for x in state {
        b.double(x);
    }
    b.bits(NILVALUE);
    b.0
}

#[test]
fn huge_compact_sequences_are_format_errors() {
    for class in ["compact_realseq", "compact_intseq"] {
        let err = from_bytes(&compact_sequence(class, [1e15, 1.0, 1.0])).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Format(_)), "{class}: {err}");
        assert!(err.to_string().contains("compact sequence length"));
    }
}

#[test]
fn compact_intseq_leaving_int_range_fails_before_expanding() {
    let bytes = compact_sequence("compact_intseq", [2e9, 0.0, 2.0]);
    let err = from_bytes(&bytes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Format(_)));
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn compact_realseq_expands() {
    let bytes = compact_sequence("compact_realseq", [3.0, 0.5, 0.25]);
    assert_eq!(from_bytes(&bytes).unwrap(), RValue::doubles(vec![0.5, 0.75, 1.0]));
}

#[test]
fn compressed_input_is_rejected() {
    let err = from_bytes(&[0x1f, 0x8b, 0x08, 0x00]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Format(_)));
}

#[test]
fn truncated_input_is_an_io_error() {
    let mut b = Bytes::v3();
    b.bits(INTSXP).int(4).int(1);
    let err = from_bytes(&b.0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
    assert!(err.to_string().contains("truncated"));
}
