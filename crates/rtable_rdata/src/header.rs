//! Node headers and type tags.
//!
//! Every serialized node starts with one 32-bit big-endian header:
//!
//! ```text
//! bits 0-7    type tag
//! bit  8      is_object
//! bit  9      has_attributes
//! bit  10     has_tag
//! bits 12-27  levels (string encoding flags for CHARSXP)
//! ```
//!
//! Reference nodes reuse bits 8-31 for the table index instead.

use std::fmt;

/// The integer NA sentinel (also used for logical NA).
pub const NA_INTEGER: i32 = i32::MIN;

/// Bit pattern of R's `NA_real_`, a NaN with payload 1954.
pub const NA_REAL_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// R's `NA_real_`.
#[must_use]
pub const fn na_real() -> f64 {
    f64::from_bits(NA_REAL_BITS)
}

const IS_OBJECT_BIT: u32 = 1 << 8;
const HAS_ATTRIBUTES_BIT: u32 = 1 << 9;
const HAS_TAG_BIT: u32 = 1 << 10;
const LEVELS_SHIFT: u32 = 12;
const LEVELS_MASK: u32 = 0xFFFF;

/// `levels` flag: the string is marked as Latin-1.
pub const LATIN1_MASK: u32 = 1 << 2;
/// `levels` flag: the string is marked as UTF-8.
pub const UTF8_MASK: u32 = 1 << 3;
/// `levels` flag: the string is pure ASCII.
pub const ASCII_MASK: u32 = 1 << 6;

/// The node types this codec understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SexpType {
    /// `SYMSXP`
    Symbol = 1,
    /// `LISTSXP`
    PairList = 2,
    /// `CHARSXP`, a single string
    StringSingle = 9,
    /// `LGLSXP`
    LogicalVector = 10,
    /// `INTSXP`
    IntVector = 13,
    /// `REALSXP`
    DoubleVector = 14,
    /// `STRSXP`
    StringVector = 16,
    /// `VECSXP`
    GenericVector = 19,
    /// `ALTREP_SXP`
    Altrep = 238,
    /// `NILVALUE_SXP`
    Nil = 254,
    /// `REFSXP`
    Reference = 255,
}

impl SexpType {
    /// Maps a wire tag to a known type.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            1 => Self::Symbol,
            2 => Self::PairList,
            9 => Self::StringSingle,
            10 => Self::LogicalVector,
            13 => Self::IntVector,
            14 => Self::DoubleVector,
            16 => Self::StringVector,
            19 => Self::GenericVector,
            238 => Self::Altrep,
            254 => Self::Nil,
            255 => Self::Reference,
            _ => return None,
        })
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// A decoded node header.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHeader(u32);

impl TypeHeader {
    /// Wraps raw header bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Builds a header for a node of the given type.
    #[must_use]
    pub const fn new(sexp: SexpType, is_object: bool, has_attributes: bool, has_tag: bool) -> Self {
        let mut bits = sexp.tag() as u32;
        if is_object {
            bits |= IS_OBJECT_BIT;
        }
        if has_attributes {
            bits |= HAS_ATTRIBUTES_BIT;
        }
        if has_tag {
            bits |= HAS_TAG_BIT;
        }
        Self(bits)
    }

    /// Builds a reference header with the index packed into the high bits.
    #[must_use]
    pub const fn reference(index: u32) -> Self {
        Self((index << 8) | SexpType::Reference.tag() as u32)
    }

    /// Returns the header with its `levels` field replaced.
    #[must_use]
    pub const fn with_levels(self, levels: u32) -> Self {
        Self((self.0 & !(LEVELS_MASK << LEVELS_SHIFT)) | ((levels & LEVELS_MASK) << LEVELS_SHIFT))
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn type_tag(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Returns the known type, if the tag is one.
    #[must_use]
    pub const fn sexp_type(self) -> Option<SexpType> {
        SexpType::from_tag(self.type_tag())
    }

    /// Returns true if the node is an S3/S4 object.
    #[must_use]
    pub const fn is_object(self) -> bool {
        self.0 & IS_OBJECT_BIT != 0
    }

    /// Returns true if an attribute item follows the node.
    #[must_use]
    pub const fn has_attributes(self) -> bool {
        self.0 & HAS_ATTRIBUTES_BIT != 0
    }

    /// Returns true if a pair-list node carries a tag.
    #[must_use]
    pub const fn has_tag(self) -> bool {
        self.0 & HAS_TAG_BIT != 0
    }

    /// Returns the `levels` field.
    #[must_use]
    pub const fn levels(self) -> u32 {
        (self.0 >> LEVELS_SHIFT) & LEVELS_MASK
    }

    /// Returns the packed reference index (0 means it follows as an int).
    #[must_use]
    pub const fn reference_index(self) -> u32 {
        self.0 >> 8
    }
}

impl fmt::Debug for TypeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHeader")
            .field("type_tag", &self.type_tag())
            .field("is_object", &self.is_object())
            .field("has_attributes", &self.has_attributes())
            .field("has_tag", &self.has_tag())
            .field("levels", &self.levels())
            .finish()
    }
}
