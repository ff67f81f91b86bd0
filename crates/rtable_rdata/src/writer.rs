//! XDR encoder.
//!
//! Output is a version 3 serialization that `readRDS` accepts. Symbols are
//! written once and referenced afterwards, mirroring the reader's table.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use rtable_foundation::{Error, Result};
use tracing::debug;

use crate::header::{ASCII_MASK, NA_INTEGER, SexpType, TypeHeader, UTF8_MASK};
use crate::rvalue::{PairListEntry, RValue};
use crate::temporal;

/// Writer stamp: R 4.1.0.
pub const WRITER_VERSION: i32 = 0x0004_0100;

/// Oldest R able to read the output: 3.5.0.
pub const MIN_READER_VERSION: i32 = 0x0003_0500;

const SERIALIZATION_VERSION: i32 = 3;
const NATIVE_ENCODING: &str = "UTF-8";
const MAX_PACKED_REFERENCE: u32 = 0x00FF_FFFF;

/// Encoder for one R object.
pub struct RWriter<W> {
    output: W,
    symbols: HashMap<Arc<str>, u32>,
    references: u32,
    nodes: usize,
}

impl<W: Write> RWriter<W> {
    /// Creates a writer over a byte sink.
    pub fn new(output: W) -> Self {
        Self {
            output,
            symbols: HashMap::new(),
            references: 0,
            nodes: 0,
        }
    }

    /// Writes the preamble and the value, flushes, and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the sink fails, or a format error for a
    /// vector or string too long for the format.
    pub fn write(mut self, value: &RValue) -> Result<W> {
        self.write_preamble()?;
        self.write_item(value)?;
        self.output.flush()?;
        debug!(
            nodes = self.nodes,
            symbols = self.symbols.len(),
            "encoded R object"
        );
        Ok(self.output)
    }

    fn write_preamble(&mut self) -> Result<()> {
        self.write_raw(b"X\n")?;
        self.write_int(SERIALIZATION_VERSION)?;
        self.write_int(WRITER_VERSION)?;
        self.write_int(MIN_READER_VERSION)?;
        self.write_length(NATIVE_ENCODING.len())?;
        self.write_raw(NATIVE_ENCODING.as_bytes())
    }

    fn write_item(&mut self, value: &RValue) -> Result<()> {
        self.nodes += 1;
        match value {
            RValue::Nil => self.write_header(TypeHeader::new(SexpType::Nil, false, false, false)),
            RValue::String {
                value,
                is_symbol: false,
            } => self.write_chars(value.as_deref()),
            RValue::String {
                value,
                is_symbol: true,
            } => self.write_symbol(value.as_ref()),
            RValue::IntVector { values, attributes } => {
                self.write_vector_header(SexpType::IntVector, attributes.as_deref(), values.len())?;
                for &v in values {
                    self.write_int(v)?;
                }
                self.write_attributes(attributes.as_deref())
            }
            RValue::DoubleVector { values, attributes } => {
                self.write_vector_header(
                    SexpType::DoubleVector,
                    attributes.as_deref(),
                    values.len(),
                )?;
                for &v in values {
                    self.write_double(v)?;
                }
                self.write_attributes(attributes.as_deref())
            }
            RValue::LogicalVector {
                values,
                is_na,
                attributes,
            } => {
                self.write_vector_header(
                    SexpType::LogicalVector,
                    attributes.as_deref(),
                    values.len(),
                )?;
                for (i, &v) in values.iter().enumerate() {
                    let na = is_na.as_ref().is_some_and(|flags| flags.get(i) == Some(&true));
                    self.write_int(if na { NA_INTEGER } else { i32::from(v) })?;
                }
                self.write_attributes(attributes.as_deref())
            }
            RValue::StringVector { values, attributes } => {
                self.write_vector_header(
                    SexpType::StringVector,
                    attributes.as_deref(),
                    values.len(),
                )?;
                for v in values {
                    self.write_chars(v.as_deref())?;
                }
                self.write_attributes(attributes.as_deref())
            }
            RValue::TemporalVector {
                values, attributes, ..
            } => {
                self.write_vector_header(
                    SexpType::DoubleVector,
                    attributes.as_deref(),
                    values.len(),
                )?;
                for v in values {
                    self.write_double(temporal::to_r_double_opt(v.as_ref()))?;
                }
                self.write_attributes(attributes.as_deref())
            }
            RValue::GenericList {
                values,
                attributes,
                is_object,
            } => {
                self.write_header(TypeHeader::new(
                    SexpType::GenericVector,
                    *is_object,
                    attributes.is_some(),
                    false,
                ))?;
                self.write_length(values.len())?;
                for v in values {
                    self.write_item(v)?;
                }
                self.write_attributes(attributes.as_deref())
            }
            RValue::PairList(entries) => self.write_pair_list(entries),
            RValue::FactorList {
                values,
                level_names,
            } => {
                let attributes = RValue::attribute_list([
                    ("levels", RValue::strings(level_names.iter().cloned())),
                    ("class", RValue::strings(["factor"])),
                ]);
                self.write_item(&RValue::IntVector {
                    values: values.clone(),
                    attributes: Some(Box::new(attributes)),
                })
            }
        }
    }

    /// Writes one pair per entry, each followed directly by the next, and a
    /// single `NIL` after the last. An empty list is just `NIL`.
    fn write_pair_list(&mut self, entries: &[PairListEntry]) -> Result<()> {
        for entry in entries {
            self.write_header(TypeHeader::new(
                SexpType::PairList,
                false,
                entry.attributes.is_some(),
                entry.tag.is_some(),
            ))?;
            if let Some(attributes) = &entry.attributes {
                self.write_item(attributes)?;
            }
            if let Some(tag) = &entry.tag {
                self.write_item(tag)?;
            }
            self.write_item(&entry.item)?;
        }
        self.write_header(TypeHeader::new(SexpType::Nil, false, false, false))
    }

    fn write_vector_header(
        &mut self,
        sexp: SexpType,
        attributes: Option<&RValue>,
        len: usize,
    ) -> Result<()> {
        let is_object = attributes.and_then(|a| a.lookup("class")).is_some();
        self.write_header(TypeHeader::new(sexp, is_object, attributes.is_some(), false))?;
        self.write_length(len)
    }

    fn write_attributes(&mut self, attributes: Option<&RValue>) -> Result<()> {
        match attributes {
            Some(a) => self.write_item(a),
            None => Ok(()),
        }
    }

    fn write_symbol(&mut self, name: Option<&Arc<str>>) -> Result<()> {
        if let Some(&index) = name.and_then(|n| self.symbols.get(n)) {
            if index <= MAX_PACKED_REFERENCE {
                return self.write_header(TypeHeader::reference(index));
            }
            let index = i32::try_from(index).map_err(|_| Error::format("reference overflow"))?;
            self.write_header(TypeHeader::reference(0))?;
            return self.write_int(index);
        }
        // Every fresh symbol takes a table slot on the reading side.
        self.references = self
            .references
            .checked_add(1)
            .ok_or_else(|| Error::format("too many distinct symbols"))?;
        if let Some(name) = name {
            self.symbols.insert(name.clone(), self.references);
        }
        self.write_header(TypeHeader::new(SexpType::Symbol, false, false, false))?;
        self.write_chars(name.map(|n| &**n))
    }

    /// Writes a `CHARSXP` with the encoding bits R sets.
    fn write_chars(&mut self, value: Option<&str>) -> Result<()> {
        let header = TypeHeader::new(SexpType::StringSingle, false, false, false);
        match value {
            None => {
                self.write_header(header)?;
                self.write_int(-1)
            }
            Some(s) => {
                let levels = if s.is_ascii() { ASCII_MASK } else { UTF8_MASK };
                self.write_header(header.with_levels(levels))?;
                let len = i32::try_from(s.len())
                    .map_err(|_| Error::format(format!("string of {} bytes is too long", s.len())))?;
                self.write_int(len)?;
                self.write_raw(s.as_bytes())
            }
        }
    }

    /// Writes a vector length, switching to the long form past `i32::MAX`.
    fn write_length(&mut self, len: usize) -> Result<()> {
        if let Ok(n) = i32::try_from(len) {
            return self.write_int(n);
        }
        let len = u64::try_from(len).map_err(|_| Error::format("vector length overflow"))?;
        #[allow(clippy::cast_possible_truncation)]
        let (upper, lower) = ((len >> 32) as u32, len as u32);
        self.write_int(-1)?;
        self.write_raw(&upper.to_be_bytes())?;
        self.write_raw(&lower.to_be_bytes())
    }

    fn write_header(&mut self, header: TypeHeader) -> Result<()> {
        self.write_raw(&header.bits().to_be_bytes())
    }

    fn write_int(&mut self, n: i32) -> Result<()> {
        self.write_raw(&n.to_be_bytes())
    }

    fn write_double(&mut self, x: f64) -> Result<()> {
        self.write_raw(&x.to_be_bytes())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes)?;
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;
    use crate::reader::RReader;

    fn text() -> impl Strategy<Value = Option<Arc<str>>> {
        prop_oneof![
            4 => "[a-zA-Z0-9 é]{0,8}".prop_map(|s| Some(Arc::from(s))),
            1 => Just(None),
        ]
    }

    fn names(len: usize) -> impl Strategy<Value = Option<Box<RValue>>> {
        prop_oneof![
            Just(None),
            proptest::collection::vec("[a-z]{1,4}", len).prop_map(|n| {
                Some(Box::new(RValue::attribute_list([("names", RValue::strings(n))])))
            }),
        ]
    }

    fn leaf() -> impl Strategy<Value = RValue> {
        prop_oneof![
            Just(RValue::Nil),
            text().prop_map(|value| RValue::String {
                value,
                is_symbol: false
            }),
            proptest::collection::vec(any::<i32>(), 0..8)
                .prop_flat_map(|v| {
                    let n = v.len();
                    (Just(v), names(n))
                })
                .prop_map(|(values, attributes)| RValue::IntVector { values, attributes }),
            proptest::collection::vec(any::<f64>(), 0..8)
                .prop_map(RValue::doubles),
            proptest::collection::vec(proptest::option::of(any::<bool>()), 0..8)
                .prop_map(RValue::logicals),
            proptest::collection::vec(text(), 0..8).prop_map(|values| RValue::StringVector {
                values,
                attributes: None
            }),
            proptest::collection::vec(1..4_i32, 0..8).prop_map(|values| RValue::FactorList {
                values,
                level_names: ["lo", "mid", "hi"].into_iter().map(Arc::from).collect(),
            }),
        ]
    }

    fn tree() -> impl Strategy<Value = RValue> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                (proptest::collection::vec(inner.clone(), 0..4), any::<bool>()).prop_map(
                    |(values, is_object)| RValue::GenericList {
                        values,
                        attributes: None,
                        is_object,
                    }
                ),
                proptest::collection::vec(("[a-c]{1,2}", inner), 1..4).prop_map(|entries| {
                    RValue::PairList(
                        entries
                            .into_iter()
                            .map(|(tag, item)| PairListEntry::tagged(tag, item))
                            .collect(),
                    )
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn read_inverts_write(v in tree()) {
            let bytes = RWriter::new(Vec::new()).write(&v).unwrap();
            let back = RReader::new(&bytes[..]).read().unwrap();
            prop_assert_eq!(back, v);
        }
    }
}
