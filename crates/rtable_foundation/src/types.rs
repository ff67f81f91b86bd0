//! Type descriptors for host columns and values.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::RtMap;
use crate::tagged::{MAYBE_TYPE_NAME, MISSING_TAG, PRESENT_TAG};
use crate::temporal::DateTimeKind;
use crate::value::Value;

/// Type descriptor for a host column or value.
///
/// A column's type describes its elements; arrays only appear when a
/// column's elements are themselves lists.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    /// Numbers (R integers and doubles alike).
    Number,
    /// Text.
    Text,
    /// Booleans.
    Boolean,
    /// Dates and times of the given kind.
    Date(DateTimeKind),
    /// An instance of a registered tagged (sum) type.
    Tagged(TaggedTypeRef),
    /// A record with named fields.
    Record(RecordType),
    /// A homogeneous array.
    Array(Box<DataType>),
    /// A type parameter, only meaningful inside a tagged type definition.
    TypeVar(usize),
}

/// Reference to a tagged type by name, with its type arguments.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedTypeRef {
    /// Registered type name.
    pub name: Arc<str>,
    /// Arguments for the definition's type parameters, in order.
    pub args: Vec<DataType>,
}

impl TaggedTypeRef {
    /// Creates a reference to a type without parameters.
    #[must_use]
    pub fn plain(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// Record type: field names mapped to field types, ordered by name.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordType {
    fields: RtMap<Arc<str>, DataType>,
}

impl RecordType {
    /// Creates a record type from name/type pairs.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<Arc<str>>,
    {
        Self {
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        }
    }

    /// Returns the type of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DataType> {
        self.fields.get(&Arc::from(name))
    }

    /// Returns the fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&Arc<str>, &DataType)> {
        self.fields.iter()
    }

    /// Returns the field names in order.
    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.fields.keys()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl DataType {
    /// Creates the optional type `Maybe<inner>`.
    #[must_use]
    pub fn maybe(inner: DataType) -> Self {
        Self::Tagged(TaggedTypeRef {
            name: Arc::from(MAYBE_TYPE_NAME),
            args: vec![inner],
        })
    }

    /// Creates an array type.
    #[must_use]
    pub fn array(element: DataType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates a record type from name/type pairs.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<Arc<str>>,
    {
        Self::Record(RecordType::new(fields))
    }

    /// Creates a reference to a parameterless tagged type.
    #[must_use]
    pub fn tagged(name: impl Into<Arc<str>>) -> Self {
        Self::Tagged(TaggedTypeRef::plain(name))
    }

    /// Returns the wrapped type if this is `Maybe<T>`.
    #[must_use]
    pub fn maybe_inner(&self) -> Option<&DataType> {
        match self {
            Self::Tagged(r) if &*r.name == MAYBE_TYPE_NAME && r.args.len() == 1 => r.args.first(),
            _ => None,
        }
    }

    /// Returns true if this is `Maybe<T>` for some `T`.
    #[must_use]
    pub fn is_maybe(&self) -> bool {
        self.maybe_inner().is_some()
    }

    /// Replaces type variables with the given arguments.
    ///
    /// Variables without a matching argument are left in place.
    #[must_use]
    pub fn substitute(&self, args: &[DataType]) -> DataType {
        match self {
            Self::TypeVar(i) => args.get(*i).cloned().unwrap_or(Self::TypeVar(*i)),
            Self::Tagged(r) => Self::Tagged(TaggedTypeRef {
                name: r.name.clone(),
                args: r.args.iter().map(|a| a.substitute(args)).collect(),
            }),
            Self::Record(rec) => Self::Record(RecordType {
                fields: rec
                    .fields()
                    .map(|(n, t)| (n.clone(), t.substitute(args)))
                    .collect(),
            }),
            Self::Array(e) => Self::array(e.substitute(args)),
            Self::Number | Self::Text | Self::Boolean | Self::Date(_) => self.clone(),
        }
    }

    /// Checks whether a value has the shape this type describes.
    ///
    /// Tagged values are checked for `Maybe` only; other tagged types would
    /// need their definitions, so any tagged value is admitted for them.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Number, Value::Number(_))
            | (Self::Text, Value::Text(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::TypeVar(_), _) => true,
            (Self::Date(kind), Value::Temporal(t)) => t.kind() == *kind,
            (Self::Tagged(_), Value::Tagged(tv)) => match self.maybe_inner() {
                Some(inner) => match (tv.tag, &tv.inner) {
                    (MISSING_TAG, None) => true,
                    (PRESENT_TAG, Some(v)) => inner.admits(v),
                    _ => false,
                },
                None => true,
            },
            (Self::Record(rec), Value::Record(fields)) => {
                rec.len() == fields.len()
                    && rec
                        .fields()
                        .all(|(name, t)| fields.get(name).is_some_and(|v| t.admits(v)))
            }
            (Self::Array(e), Value::Array(items)) => items.iter().all(|v| e.admits(v)),
            _ => false,
        }
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Text => write!(f, "text"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date(kind) => write!(f, "{kind}"),
            Self::Tagged(r) => write!(f, "{r:?}"),
            Self::Record(rec) => {
                write!(f, "{{")?;
                for (i, (name, t)) in rec.fields().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {t:?}")?;
                }
                write!(f, "}}")
            }
            Self::Array(e) => write!(f, "[{e:?}]"),
            Self::TypeVar(i) => write!(f, "'{i}"),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Debug for TaggedTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, a) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{a:?}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&DataType::Record(self.clone()), f)
    }
}
