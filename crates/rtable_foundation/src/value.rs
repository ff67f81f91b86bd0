//! Host value type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::{RtMap, RtVec};
use crate::tagged::{MISSING_TAG, PRESENT_TAG};
use crate::temporal::Temporal;

/// Host value.
///
/// Values are immutable and cheaply cloneable; arrays and records use
/// persistent collections. Optionality is explicit: a missing value is the
/// `Missing` tag of the built-in `Maybe` type, never a null.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A number.
    Number(f64),
    /// Text.
    Text(Arc<str>),
    /// A boolean.
    Bool(bool),
    /// A date or time.
    Temporal(Temporal),
    /// A tag of a tagged type, with its payload if the tag carries one.
    Tagged(TaggedValue),
    /// A record, fields ordered by name.
    Record(RtMap<Arc<str>, Value>),
    /// An array.
    Array(RtVec<Value>),
}

/// A tagged-type value: the tag's index in its definition and the payload.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedValue {
    /// Index of the tag within its type definition.
    pub tag: usize,
    /// Payload, present only for tags that carry one.
    pub inner: Option<Box<Value>>,
}

impl Value {
    /// Wraps a value as the `Present` tag of `Maybe`.
    #[must_use]
    pub fn present(value: Value) -> Self {
        Self::Tagged(TaggedValue {
            tag: PRESENT_TAG,
            inner: Some(Box::new(value)),
        })
    }

    /// The `Missing` tag of `Maybe`.
    #[must_use]
    pub fn missing() -> Self {
        Self::Tagged(TaggedValue {
            tag: MISSING_TAG,
            inner: None,
        })
    }

    /// Creates a payload-free tag value.
    #[must_use]
    pub fn tag(tag: usize) -> Self {
        Self::Tagged(TaggedValue { tag, inner: None })
    }

    /// Creates a record from name/value pairs.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<Arc<str>>,
    {
        Self::Record(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// Creates an array from values.
    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::Array(items.into_iter().collect())
    }

    /// Reads a `Maybe` value: `Some(None)` for missing, `Some(Some(v))` for
    /// present, `None` if this is not shaped like a `Maybe` value.
    #[must_use]
    pub fn as_maybe(&self) -> Option<Option<&Value>> {
        match self {
            Self::Tagged(TaggedValue {
                tag: MISSING_TAG,
                inner: None,
            }) => Some(None),
            Self::Tagged(TaggedValue {
                tag: PRESENT_TAG,
                inner: Some(v),
            }) => Some(Some(&**v)),
            _ => None,
        }
    }

    /// Returns true if this is the `Missing` tag.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self.as_maybe(), Some(None))
    }

    /// Attempts to extract a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a date/time.
    #[must_use]
    pub const fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    /// Attempts to extract a tagged value.
    #[must_use]
    pub const fn as_tagged(&self) -> Option<&TaggedValue> {
        match self {
            Self::Tagged(t) => Some(t),
            _ => None,
        }
    }

    /// Attempts to extract record fields.
    #[must_use]
    pub const fn as_record(&self) -> Option<&RtMap<Arc<str>, Value>> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Attempts to extract array items.
    #[must_use]
    pub const fn as_array(&self) -> Option<&RtVec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
            Self::Temporal(_) => "date",
            Self::Tagged(_) => "tagged value",
            Self::Record(_) => "record",
            Self::Array(_) => "array",
        }
    }
}

// Floats compare by bits so that NaN equals itself and Hash stays consistent.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Temporal(a), Self::Temporal(b)) => a == b,
            (Self::Tagged(a), Self::Tagged(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Number(n) => n.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Temporal(t) => t.hash(state),
            Self::Tagged(t) => t.hash(state),
            Self::Record(r) => r.hash(state),
            Self::Array(a) => a.hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Temporal(t) => write!(f, "{t}"),
            Self::Tagged(t) => write!(f, "{t:?}"),
            Self::Record(r) => write!(f, "{r:?}"),
            Self::Array(a) => write!(f, "{a:?}"),
        }
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "#{}({inner:?})", self.tag),
            None => write!(f, "#{}", self.tag),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Temporal(t) => write!(f, "{t}"),
            Self::Tagged(_) => match self.as_maybe() {
                Some(None) => write!(f, "NA"),
                Some(Some(v)) => write!(f, "{v}"),
                None => write!(f, "{self:?}"),
            },
            Self::Record(r) => {
                write!(f, "{{")?;
                for (i, (k, v)) in r.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Array(a) => {
                write!(f, "[")?;
                for (i, item) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::Text(s)
    }
}

impl From<Temporal> for Value {
    fn from(t: Temporal) -> Self {
        Self::Temporal(t)
    }
}
