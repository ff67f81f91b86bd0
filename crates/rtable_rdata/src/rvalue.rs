//! In-memory form of decoded R objects.

use std::sync::Arc;

use rtable_foundation::{DateTimeKind, Error, Result, Temporal};

/// A decoded R object.
///
/// Attributes, when present, are conventionally a [`RValue::PairList`]
/// used as a name to value map (`names`, `class`, `levels`, `row.names`,
/// `tzone`, ...).
///
/// Equality compares doubles bitwise, so NA and NaN entries compare equal
/// to themselves.
#[derive(Clone, Debug)]
pub enum RValue {
    /// `NULL`.
    Nil,
    /// A single string, or a symbol when `is_symbol` is set.
    String {
        /// The text, `None` for `NA_character_`.
        value: Option<Arc<str>>,
        /// True for symbols (pair-list tags, attribute names).
        is_symbol: bool,
    },
    /// An integer vector. NA is [`crate::NA_INTEGER`].
    IntVector {
        /// Elements.
        values: Vec<i32>,
        /// Attribute pair list.
        attributes: Option<Box<RValue>>,
    },
    /// A double vector. NA is any NaN.
    DoubleVector {
        /// Elements.
        values: Vec<f64>,
        /// Attribute pair list.
        attributes: Option<Box<RValue>>,
    },
    /// A logical vector.
    LogicalVector {
        /// Elements; NA positions hold `false`.
        values: Vec<bool>,
        /// NA flags, only present if at least one element is NA.
        is_na: Option<Vec<bool>>,
        /// Attribute pair list.
        attributes: Option<Box<RValue>>,
    },
    /// A character vector.
    StringVector {
        /// Elements, `None` for NA.
        values: Vec<Option<Arc<str>>>,
        /// Attribute pair list.
        attributes: Option<Box<RValue>>,
    },
    /// A double vector reconstructed as dates or times.
    TemporalVector {
        /// What the doubles encode.
        kind: DateTimeKind,
        /// Elements, `None` for NA.
        values: Vec<Option<Temporal>>,
        /// Attribute pair list (kept, including `class`).
        attributes: Option<Box<RValue>>,
    },
    /// A list (`VECSXP`).
    GenericList {
        /// Elements.
        values: Vec<RValue>,
        /// Attribute pair list.
        attributes: Option<Box<RValue>>,
        /// The node's object bit.
        is_object: bool,
    },
    /// A pair list, flattened.
    PairList(Vec<PairListEntry>),
    /// A factor reconstructed from an integer vector with `levels`.
    FactorList {
        /// 1-based level codes; NA is [`crate::NA_INTEGER`].
        values: Vec<i32>,
        /// Level names.
        level_names: Vec<Arc<str>>,
    },
}

/// One node of a pair list.
#[derive(Clone, Debug, PartialEq)]
pub struct PairListEntry {
    /// Attributes of this node.
    pub attributes: Option<Box<RValue>>,
    /// Tag, usually a symbol.
    pub tag: Option<Box<RValue>>,
    /// The node's value.
    pub item: RValue,
}

impl PairListEntry {
    /// Creates an entry tagged with a symbol.
    #[must_use]
    pub fn tagged(name: impl Into<Arc<str>>, item: RValue) -> Self {
        Self {
            attributes: None,
            tag: Some(Box::new(RValue::symbol(name))),
            item,
        }
    }

    /// Creates an untagged entry.
    #[must_use]
    pub const fn untagged(item: RValue) -> Self {
        Self {
            attributes: None,
            tag: None,
            item,
        }
    }

    /// Returns the tag's text, if the tag is a string or symbol.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref().and_then(RValue::as_str)
    }
}

impl RValue {
    /// Creates a symbol.
    #[must_use]
    pub fn symbol(name: impl Into<Arc<str>>) -> Self {
        Self::String {
            value: Some(name.into()),
            is_symbol: true,
        }
    }

    /// Creates a character vector without NAs or attributes.
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::StringVector {
            values: values.into_iter().map(|s| Some(s.into())).collect(),
            attributes: None,
        }
    }

    /// Creates an integer vector without attributes.
    #[must_use]
    pub const fn ints(values: Vec<i32>) -> Self {
        Self::IntVector {
            values,
            attributes: None,
        }
    }

    /// Creates a double vector without attributes.
    #[must_use]
    pub const fn doubles(values: Vec<f64>) -> Self {
        Self::DoubleVector {
            values,
            attributes: None,
        }
    }

    /// Creates a logical vector, storing NA flags only if one is set.
    #[must_use]
    pub fn logicals(values: Vec<Option<bool>>) -> Self {
        let is_na = values
            .iter()
            .any(Option::is_none)
            .then(|| values.iter().map(Option::is_none).collect());
        Self::LogicalVector {
            values: values.into_iter().map(|v| v.unwrap_or(false)).collect(),
            is_na,
            attributes: None,
        }
    }

    /// Creates an attribute pair list from name/value pairs.
    pub fn attribute_list<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, RValue)>,
        S: Into<Arc<str>>,
    {
        Self::PairList(
            entries
                .into_iter()
                .map(|(name, item)| PairListEntry::tagged(name, item))
                .collect(),
        )
    }

    /// Short name of the variant, for messages.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Nil => "NULL",
            Self::String {
                is_symbol: true, ..
            } => "Symbol",
            Self::String { .. } => "String",
            Self::IntVector { .. } => "IntVector",
            Self::DoubleVector { .. } => "DoubleVector",
            Self::LogicalVector { .. } => "LogicalVector",
            Self::StringVector { .. } => "StringVector",
            Self::TemporalVector { .. } => "TemporalVector",
            Self::GenericList { .. } => "GenericList",
            Self::PairList(_) => "PairList",
            Self::FactorList { .. } => "FactorList",
        }
    }

    /// Returns the attribute pair list of a vector or list.
    #[must_use]
    pub fn attributes(&self) -> Option<&RValue> {
        match self {
            Self::IntVector { attributes, .. }
            | Self::DoubleVector { attributes, .. }
            | Self::LogicalVector { attributes, .. }
            | Self::StringVector { attributes, .. }
            | Self::TemporalVector { attributes, .. }
            | Self::GenericList { attributes, .. } => attributes.as_deref(),
            Self::Nil | Self::String { .. } | Self::PairList(_) | Self::FactorList { .. } => None,
        }
    }

    /// Replaces the attributes of a vector or list. Other variants are
    /// returned unchanged.
    #[must_use]
    pub fn with_attributes(mut self, new: Option<RValue>) -> Self {
        match &mut self {
            Self::IntVector { attributes, .. }
            | Self::DoubleVector { attributes, .. }
            | Self::LogicalVector { attributes, .. }
            | Self::StringVector { attributes, .. }
            | Self::TemporalVector { attributes, .. }
            | Self::GenericList { attributes, .. } => *attributes = new.map(Box::new),
            Self::Nil | Self::String { .. } | Self::PairList(_) | Self::FactorList { .. } => {}
        }
        self
    }

    /// Looks up a tagged entry of a pair list by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&RValue> {
        match self {
            Self::PairList(entries) => entries
                .iter()
                .find(|e| e.tag_name() == Some(name))
                .map(|e| &e.item),
            _ => None,
        }
    }

    /// Looks up one attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&RValue> {
        self.attributes().and_then(|a| a.lookup(name))
    }

    /// Returns the text of a single string or symbol.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String {
                value: Some(s), ..
            } => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of a character vector.
    #[must_use]
    pub fn string_values(&self) -> Option<&[Option<Arc<str>>]> {
        match self {
            Self::StringVector { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Returns the elements of a character vector, or a format error naming
    /// what was expected.
    ///
    /// # Errors
    ///
    /// Fails if this is not a character vector.
    pub fn expect_string_values(&self, what: &str) -> Result<&[Option<Arc<str>>]> {
        self.string_values().ok_or_else(|| {
            Error::format(format!(
                "expected {what} to be a character vector, found {}",
                self.variant_name()
            ))
        })
    }

    /// Returns the `class` attribute's entries.
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attribute("class")
            .and_then(RValue::string_values)
            .map(|v| v.iter().filter_map(Option::as_deref).collect())
            .unwrap_or_default()
    }

    /// Returns true if `class` contains the given entry.
    #[must_use]
    pub fn inherits(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Returns the `names` attribute.
    #[must_use]
    pub fn names(&self) -> Option<&[Option<Arc<str>>]> {
        self.attribute("names").and_then(RValue::string_values)
    }

    /// Returns the element count of a vector, list or pair list, 1 for a
    /// single string and 0 for `NULL`.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nil => 0,
            Self::String { .. } => 1,
            Self::IntVector { values, .. } | Self::FactorList { values, .. } => values.len(),
            Self::DoubleVector { values, .. } => values.len(),
            Self::LogicalVector { values, .. } => values.len(),
            Self::StringVector { values, .. } => values.len(),
            Self::TemporalVector { values, .. } => values.len(),
            Self::GenericList { values, .. } => values.len(),
            Self::PairList(entries) => entries.len(),
        }
    }

    /// Returns true if [`RValue::len`] is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn doubles_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

impl PartialEq for RValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (
                Self::String {
                    value: a,
                    is_symbol: sa,
                },
                Self::String {
                    value: b,
                    is_symbol: sb,
                },
            ) => a == b && sa == sb,
            (
                Self::IntVector {
                    values: a,
                    attributes: aa,
                },
                Self::IntVector {
                    values: b,
                    attributes: ba,
                },
            ) => a == b && aa == ba,
            (
                Self::DoubleVector {
                    values: a,
                    attributes: aa,
                },
                Self::DoubleVector {
                    values: b,
                    attributes: ba,
                },
            ) => doubles_eq(a, b) && aa == ba,
            (
                Self::LogicalVector {
                    values: a,
                    is_na: an,
                    attributes: aa,
                },
                Self::LogicalVector {
                    values: b,
                    is_na: bn,
                    attributes: ba,
                },
            ) => a == b && an == bn && aa == ba,
            (
                Self::StringVector {
                    values: a,
                    attributes: aa,
                },
                Self::StringVector {
                    values: b,
                    attributes: ba,
                },
            ) => a == b && aa == ba,
            (
                Self::TemporalVector {
                    kind: ak,
                    values: a,
                    attributes: aa,
                },
                Self::TemporalVector {
                    kind: bk,
                    values: b,
                    attributes: ba,
                },
            ) => ak == bk && a == b && aa == ba,
            (
                Self::GenericList {
                    values: a,
                    attributes: aa,
                    is_object: ao,
                },
                Self::GenericList {
                    values: b,
                    attributes: ba,
                    is_object: bo,
                },
            ) => a == b && aa == ba && ao == bo,
            (Self::PairList(a), Self::PairList(b)) => a == b,
            (
                Self::FactorList {
                    values: a,
                    level_names: al,
                },
                Self::FactorList {
                    values: b,
                    level_names: bl,
                },
            ) => a == b && al == bl,
            _ => false,
        }
    }
}
