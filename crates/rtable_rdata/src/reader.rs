//! XDR decoder.
//!
//! A reader decodes exactly one top-level object. Symbols are registered in
//! a reference table as they are read; later `REFSXP` nodes refer back to
//! them by 1-based index. The table lives as long as the reader, so it is
//! never shared between two decodes.

use std::io::{self, Read};
use std::sync::Arc;

use rtable_foundation::{Error, ErrorKind, Result};
use tracing::{debug, trace, warn};

use crate::classify::classify;
use crate::header::{LATIN1_MASK, NA_INTEGER, SexpType, TypeHeader};
use crate::rvalue::{PairListEntry, RValue};

/// Caps up-front allocation so a corrupt length cannot exhaust memory
/// before the stream runs dry.
const MAX_PREALLOCATION: usize = 1 << 16;

/// Longest compact sequence that is expanded.
const MAX_SEQUENCE_LENGTH: f64 = 2_147_483_647.0;

/// Decoder for one serialized R object.
pub struct RReader<R> {
    input: R,
    references: Vec<RValue>,
    nodes: usize,
}

impl<R: Read> RReader<R> {
    /// Creates a reader over a byte stream.
    pub const fn new(input: R) -> Self {
        Self {
            input,
            references: Vec::new(),
            nodes: 0,
        }
    }

    /// Reads the preamble and one object, then classifies the result.
    ///
    /// # Errors
    ///
    /// Returns a format error for anything other than version 2 or 3 XDR
    /// input, an I/O error if the stream ends early, and an internal error
    /// for node types the codec does not know.
    pub fn read(mut self) -> Result<RValue> {
        self.read_preamble()?;
        let raw = self.read_item()?;
        debug!(
            nodes = self.nodes,
            references = self.references.len(),
            "decoded R object"
        );
        Ok(classify(raw))
    }

    fn read_preamble(&mut self) -> Result<()> {
        let mut magic = [0u8; 2];
        self.read_exact(&mut magic)?;
        match &magic {
            b"X\n" => {}
            b"A\n" => return Err(Error::format("ASCII serialization is not supported")),
            b"B\n" => return Err(Error::format("native binary serialization is not supported")),
            [0x1f, 0x8b] => {
                return Err(Error::format(
                    "input is gzip-compressed; decompress it or save with compress = FALSE",
                ));
            }
            other => {
                return Err(Error::format(format!(
                    "unrecognised serialization magic {other:02x?}"
                )));
            }
        }

        let version = self.read_int()?;
        if !(2..=3).contains(&version) {
            return Err(Error::format(format!(
                "unsupported serialization version {version}"
            )));
        }
        let writer_version = self.read_int()?;
        let min_reader_version = self.read_int()?;
        if version == 3 {
            let len = self.read_length()?;
            let mut encoding = vec![0u8; len.min(MAX_PREALLOCATION)];
            if encoding.len() != len {
                return Err(Error::format(format!("native encoding name of {len} bytes")));
            }
            self.read_exact(&mut encoding)?;
            trace!(encoding = %String::from_utf8_lossy(&encoding), "native encoding");
        }
        debug!(
            version,
            writer = %format_version(writer_version),
            min_reader = %format_version(min_reader_version),
            "read R serialization preamble"
        );
        Ok(())
    }

    fn read_item(&mut self) -> Result<RValue> {
        let header = TypeHeader::from_bits(self.read_bits()?);
        self.read_item_with(header)
    }

    fn read_item_with(&mut self, header: TypeHeader) -> Result<RValue> {
        self.nodes += 1;
        let Some(sexp) = header.sexp_type() else {
            return Err(Error::new(ErrorKind::UnknownTypeTag(header.type_tag())));
        };
        match sexp {
            SexpType::Nil => Ok(RValue::Nil),
            SexpType::Symbol => self.read_symbol(),
            SexpType::Reference => self.read_reference(header),
            SexpType::StringSingle => Ok(RValue::String {
                value: self.read_string_body(header)?,
                is_symbol: false,
            }),
            SexpType::LogicalVector => {
                let len = self.read_length()?;
                let mut raw = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                for _ in 0..len {
                    raw.push(self.read_int()?);
                }
                let is_na = raw
                    .contains(&NA_INTEGER)
                    .then(|| raw.iter().map(|&x| x == NA_INTEGER).collect());
                let values = raw.iter().map(|&x| x != 0 && x != NA_INTEGER).collect();
                Ok(RValue::LogicalVector {
                    values,
                    is_na,
                    attributes: self.read_attributes(header)?,
                })
            }
            SexpType::IntVector => {
                let len = self.read_length()?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                for _ in 0..len {
                    values.push(self.read_int()?);
                }
                Ok(RValue::IntVector {
                    values,
                    attributes: self.read_attributes(header)?,
                })
            }
            SexpType::DoubleVector => {
                let len = self.read_length()?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                for _ in 0..len {
                    values.push(self.read_double()?);
                }
                Ok(RValue::DoubleVector {
                    values,
                    attributes: self.read_attributes(header)?,
                })
            }
            SexpType::StringVector => {
                let len = self.read_length()?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                for _ in 0..len {
                    let element = TypeHeader::from_bits(self.read_bits()?);
                    if element.sexp_type() != Some(SexpType::StringSingle) {
                        return Err(Error::format(format!(
                            "character vector element has type tag {}",
                            element.type_tag()
                        )));
                    }
                    self.nodes += 1;
                    values.push(self.read_string_body(element)?);
                }
                Ok(RValue::StringVector {
                    values,
                    attributes: self.read_attributes(header)?,
                })
            }
            SexpType::GenericVector => {
                let len = self.read_length()?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                for _ in 0..len {
                    values.push(self.read_item()?);
                }
                Ok(RValue::GenericList {
                    values,
                    attributes: self.read_attributes(header)?,
                    is_object: header.is_object(),
                })
            }
            SexpType::PairList => self.read_pair_list(header),
            SexpType::Altrep => self.read_altrep(header),
        }
    }

    /// Reads the attribute item that trails a vector, if flagged.
    fn read_attributes(&mut self, header: TypeHeader) -> Result<Option<Box<RValue>>> {
        if header.has_attributes() {
            Ok(Some(Box::new(self.read_item()?)))
        } else {
            Ok(None)
        }
    }

    /// Reads the tag item of a pair-list node, if flagged.
    fn read_tag(&mut self, header: TypeHeader) -> Result<Option<Box<RValue>>> {
        if header.has_tag() {
            Ok(Some(Box::new(self.read_item()?)))
        } else {
            Ok(None)
        }
    }

    /// Reads a chain of pair-list nodes into one flat list.
    ///
    /// Each node is attributes, tag, value, then the continuation, which is
    /// either the next node's header or `NIL`.
    fn read_pair_list(&mut self, first: TypeHeader) -> Result<RValue> {
        let mut entries = Vec::new();
        let mut header = first;
        loop {
            let attributes = self.read_attributes(header)?;
            let tag = self.read_tag(header)?;
            let item = self.read_item()?;
            entries.push(PairListEntry {
                attributes,
                tag,
                item,
            });

            let next = TypeHeader::from_bits(self.read_bits()?);
            match next.sexp_type() {
                Some(SexpType::PairList) => {
                    self.nodes += 1;
                    header = next;
                }
                Some(SexpType::Nil) => break,
                _ => {
                    return Err(Error::format(format!(
                        "pair list continues with type tag {}",
                        next.type_tag()
                    )));
                }
            }
        }
        Ok(RValue::PairList(entries))
    }

    fn read_symbol(&mut self) -> Result<RValue> {
        let name = match self.read_item()? {
            RValue::String { value, .. } => value,
            other => {
                return Err(Error::format(format!(
                    "symbol name is a {}",
                    other.variant_name()
                )));
            }
        };
        let symbol = RValue::String {
            value: name,
            is_symbol: true,
        };
        self.references.push(symbol.clone());
        Ok(symbol)
    }

    fn read_reference(&mut self, header: TypeHeader) -> Result<RValue> {
        let index = match header.reference_index() {
            0 => u32::try_from(self.read_int()?)
                .map_err(|_| Error::format("negative reference index"))?,
            i => i,
        };
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.references.get(i))
            .cloned()
            .ok_or_else(|| {
                Error::format(format!(
                    "reference {index} with only {} entries in the reference table",
                    self.references.len()
                ))
            })
    }

    /// Reads the body of a `CHARSXP`: a length (`-1` for NA) and the bytes.
    fn read_string_body(&mut self, header: TypeHeader) -> Result<Option<Arc<str>>> {
        let len = self.read_int()?;
        if len == -1 {
            return Ok(None);
        }
        let len = usize::try_from(len)
            .map_err(|_| Error::format(format!("string length {len}")))?;
        let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOCATION));
        (&mut self.input)
            .take(len as u64)
            .read_to_end(&mut bytes)
            .map_err(map_io)?;
        if bytes.len() != len {
            return Err(truncated());
        }
        let text = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) if header.levels() & LATIN1_MASK != 0 => {
                e.into_bytes().into_iter().map(char::from).collect()
            }
            Err(e) => {
                warn!("string is not valid UTF-8; replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(Arc::from(text)))
    }

    /// Expands the ALTREP classes R uses for compact sequences, wrappers and
    /// deferred coercions into ordinary vectors.
    fn read_altrep(&mut self, header: TypeHeader) -> Result<RValue> {
        let info = self.read_item()?;
        let state = self.read_item()?;
        let attributes = match self.read_item()? {
            RValue::Nil => None,
            other => Some(other),
        };
        let class = match &info {
            RValue::PairList(entries) => entries.first().and_then(|e| e.item.as_str()),
            _ => None,
        }
        .ok_or_else(|| Error::format("ALTREP node without a class symbol"))?;
        trace!(class, "expanding ALTREP node");

        let value = match class {
            "compact_intseq" => {
                let (len, start, step) = compact_sequence(&state)?;
                // Checking both ends bounds every element in between.
                if len > 0 {
                    for x in [start, sequence_element(start, step, len - 1)] {
                        if i32_from_f64(x).is_none() {
                            return Err(Error::format(format!(
                                "compact_intseq element {x} out of range"
                            )));
                        }
                    }
                }
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                for i in 0..len {
                    let x = sequence_element(start, step, i);
                    values.push(i32_from_f64(x).ok_or_else(|| {
                        Error::format(format!("compact_intseq element {x} out of range"))
                    })?);
                }
                RValue::ints(values)
            }
            "compact_realseq" => {
                let (len, start, step) = compact_sequence(&state)?;
                let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATION));
                values.extend((0..len).map(|i| sequence_element(start, step, i)));
                RValue::doubles(values)
            }
            "wrap_integer" | "wrap_real" | "wrap_logical" | "wrap_string" | "wrap_list" => {
                match state {
                    RValue::PairList(mut entries) if !entries.is_empty() => {
                        let wrapped = entries.swap_remove(0).item;
                        if let RValue::GenericList {
                            values, attributes, ..
                        } = wrapped
                        {
                            RValue::GenericList {
                                values,
                                attributes,
                                is_object: header.is_object(),
                            }
                        } else {
                            wrapped
                        }
                    }
                    other => {
                        return Err(Error::format(format!(
                            "{class} state is a {}",
                            other.variant_name()
                        )));
                    }
                }
            }
            "deferred_string" => deferred_string(state)?,
            other => {
                return Err(Error::format(format!(
                    "unsupported ALTREP class \"{other}\""
                )));
            }
        };
        Ok(match attributes {
            Some(a) => value.with_attributes(Some(a)),
            None => value,
        })
    }

    /// Reads a vector length, following the long-vector escape.
    fn read_length(&mut self) -> Result<usize> {
        let len = self.read_int()?;
        match len {
            -1 => {
                let upper = u64::from(self.read_bits()?);
                let lower = u64::from(self.read_bits()?);
                usize::try_from((upper << 32) | lower)
                    .map_err(|_| Error::format("long vector does not fit in memory"))
            }
            n => usize::try_from(n).map_err(|_| Error::format(format!("vector length {n}"))),
        }
    }

    fn read_bits(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn read_int(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    fn read_double(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.input.read_exact(buf).map_err(map_io)
    }
}

fn truncated() -> Error {
    Error::io("truncated R data: unexpected end of input")
}

fn map_io(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        truncated()
    } else {
        Error::from(err)
    }
}

fn format_version(v: i32) -> String {
    format!("{}.{}.{}", v / 65_536, (v % 65_536) / 256, v % 256)
}

/// Decodes the `(length, start, step)` state of a compact sequence.
fn compact_sequence(state: &RValue) -> Result<(usize, f64, f64)> {
    let numbers: Vec<f64> = match state {
        RValue::DoubleVector { values, .. } => values.clone(),
        RValue::IntVector { values, .. } => values.iter().copied().map(f64::from).collect(),
        other => {
            return Err(Error::format(format!(
                "compact sequence state is a {}",
                other.variant_name()
            )));
        }
    };
    let &[len, start, step] = numbers.as_slice() else {
        return Err(Error::format(format!(
            "compact sequence state has {} elements",
            numbers.len()
        )));
    };
    if !(len.is_finite() && (0.0..=MAX_SEQUENCE_LENGTH).contains(&len)) {
        return Err(Error::format(format!("compact sequence length {len}")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let len = len as usize;
    Ok((len, start, step))
}

fn sequence_element(start: f64, step: f64, i: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let i = i as f64;
    start + i * step
}

fn i32_from_f64(x: f64) -> Option<i32> {
    #[allow(clippy::cast_possible_truncation)]
    let n = x as i32;
    (f64::from(n) == x && n != NA_INTEGER).then_some(n)
}

/// Expands a deferred integer-to-string coercion.
fn deferred_string(state: RValue) -> Result<RValue> {
    let RValue::PairList(mut entries) = state else {
        return Err(Error::format("deferred_string state is not a pair list"));
    };
    if entries.is_empty() {
        return Err(Error::format("deferred_string state is empty"));
    }
    match entries.swap_remove(0).item {
        RValue::IntVector { values, .. } => Ok(RValue::StringVector {
            values: values
                .into_iter()
                .map(|n| (n != NA_INTEGER).then(|| Arc::from(n.to_string())))
                .collect(),
            attributes: None,
        }),
        other => Err(Error::format(format!(
            "deferred_string over a {} is not supported",
            other.variant_name()
        ))),
    }
}
