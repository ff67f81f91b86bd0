//! Pretty-printing decoded values.

use rtable_rdata::{NA_INTEGER, PrettyConfig, RValue, from_bytes, pretty::pretty_print_with_config, pretty_print, to_bytes};

fn frame() -> RValue {
    RValue::GenericList {
        values: vec![RValue::ints(vec![1, NA_INTEGER]), RValue::strings(["a", "b"])],
        attributes: Some(Box::new(RValue::attribute_list([
            ("names", RValue::strings(["n", "s"])),
            ("class", RValue::strings(["data.frame"])),
        ]))),
        is_object: true,
    }
}

#[test]
fn decoded_frame_dump() {
    let decoded = from_bytes(&to_bytes(&frame()).unwrap()).unwrap();
    let text = pretty_print(&decoded);
    assert!(text.starts_with("GenericList (object) [2]\n"));
    assert!(text.contains("@class StringVector [\"data.frame\"]"));
    assert!(text.contains("[[1]] IntVector [1, NA]"));
}

#[test]
fn attributes_can_be_hidden() {
    let config = PrettyConfig {
        show_attributes: false,
        ..PrettyConfig::default()
    };
    let text = pretty_print_with_config(&frame(), config);
    assert!(!text.contains('@'));
    assert!(text.contains("[[2]] StringVector [\"a\", \"b\"]"));
}
