//! Tagged (sum) type definitions and the registry that owns them.
//!
//! Converters never reach for a global registry; they receive a
//! [`TypeManager`] and register or look up definitions through it.

use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collections::RtMap;
use crate::types::DataType;
use crate::value::Value;

/// Name of the built-in optional type.
pub const MAYBE_TYPE_NAME: &str = "Maybe";

/// Tag index of `Missing` in the built-in optional type.
pub const MISSING_TAG: usize = 0;

/// Tag index of `Present` in the built-in optional type.
pub const PRESENT_TAG: usize = 1;

/// One tag (variant) of a tagged type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TagType {
    /// Tag name.
    pub name: Arc<str>,
    /// Payload type, if the tag carries one. May refer to type variables.
    pub inner: Option<DataType>,
}

impl TagType {
    /// Creates a tag without a payload.
    #[must_use]
    pub fn bare(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            inner: None,
        }
    }

    /// Creates a tag carrying a payload of the given type.
    #[must_use]
    pub fn with_payload(name: impl Into<Arc<str>>, inner: DataType) -> Self {
        Self {
            name: name.into(),
            inner: Some(inner),
        }
    }
}

/// A registered tagged type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaggedTypeDefinition {
    /// Type name, unique within a registry.
    pub name: Arc<str>,
    /// Names of the type parameters, referenced as `TypeVar(i)`.
    pub type_params: Vec<Arc<str>>,
    /// Tags in declaration order.
    pub tags: Vec<TagType>,
}

impl TaggedTypeDefinition {
    /// The built-in `Maybe<a>` definition.
    #[must_use]
    pub fn maybe() -> Self {
        Self {
            name: Arc::from(MAYBE_TYPE_NAME),
            type_params: vec![Arc::from("a")],
            tags: vec![
                TagType::bare("Missing"),
                TagType::with_payload("Present", DataType::TypeVar(0)),
            ],
        }
    }

    /// Returns the index of the tag with the given name.
    #[must_use]
    pub fn tag_index(&self, name: &str) -> Option<usize> {
        self.tags.iter().position(|t| &*t.name == name)
    }

    /// Returns true if no tag carries a payload.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.tags.iter().all(|t| t.inner.is_none())
    }

    /// Returns the tags with type variables replaced by `args`.
    #[must_use]
    pub fn instantiate(&self, args: &[DataType]) -> Vec<TagType> {
        self.tags
            .iter()
            .map(|t| TagType {
                name: t.name.clone(),
                inner: t.inner.as_ref().map(|i| i.substitute(args)),
            })
            .collect()
    }

    /// Returns true if this is a parameterless enum whose tag names are
    /// exactly `names`, in any order.
    #[must_use]
    pub fn is_enum_over(&self, names: &[Arc<str>]) -> bool {
        if !self.type_params.is_empty() || !self.is_enum() || self.tags.len() != names.len() {
            return false;
        }
        let ours: HashSet<&str> = self.tags.iter().map(|t| &*t.name).collect();
        let theirs: HashSet<&str> = names.iter().map(|n| &**n).collect();
        ours == theirs
    }
}

/// The host's type registry, as seen by converters.
pub trait TypeManager {
    /// Registers a tagged type.
    ///
    /// Returns the existing definition when an identical one is already
    /// registered under `name`, and `None` when `name` is taken by a
    /// different definition.
    fn register_tagged_type(
        &mut self,
        name: &str,
        type_params: Vec<Arc<str>>,
        tags: Vec<TagType>,
    ) -> Option<Arc<TaggedTypeDefinition>>;

    /// Returns every registered tagged type by name.
    fn known_tagged_types(&self) -> RtMap<Arc<str>, Arc<TaggedTypeDefinition>>;

    /// Looks up one tagged type by name.
    fn lookup_tagged_type(&self, name: &str) -> Option<Arc<TaggedTypeDefinition>> {
        self.known_tagged_types().get(&Arc::from(name)).cloned()
    }

    /// Builds `Maybe<inner>`.
    fn make_maybe_type(&self, inner: DataType) -> DataType {
        DataType::maybe(inner)
    }

    /// Wraps a value as present.
    fn maybe_present(&self, value: Value) -> Value {
        Value::present(value)
    }

    /// The missing value.
    fn maybe_missing(&self) -> Value {
        Value::missing()
    }
}

/// In-memory [`TypeManager`] with `Maybe` pre-registered.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeRegistry {
    types: RtMap<Arc<str>, Arc<TaggedTypeDefinition>>,
}

impl TypeRegistry {
    /// Creates a registry holding only the built-in types.
    #[must_use]
    pub fn new() -> Self {
        let maybe = TaggedTypeDefinition::maybe();
        Self {
            types: RtMap::new().insert(maybe.name.clone(), Arc::new(maybe)),
        }
    }

    /// Returns the number of registered types, built-ins included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered (never the case for `new()`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeManager for TypeRegistry {
    fn register_tagged_type(
        &mut self,
        name: &str,
        type_params: Vec<Arc<str>>,
        tags: Vec<TagType>,
    ) -> Option<Arc<TaggedTypeDefinition>> {
        let key: Arc<str> = Arc::from(name);
        if let Some(existing) = self.types.get(&key) {
            if existing.type_params == type_params && existing.tags == tags {
                return Some(existing.clone());
            }
            warn!(name, "tagged type name already registered with different tags");
            return None;
        }
        let definition = Arc::new(TaggedTypeDefinition {
            name: key.clone(),
            type_params,
            tags,
        });
        debug!(name, tags = definition.tags.len(), "registered tagged type");
        self.types = self.types.insert(key, definition.clone());
        Some(definition)
    }

    fn known_tagged_types(&self) -> RtMap<Arc<str>, Arc<TaggedTypeDefinition>> {
        self.types.clone()
    }
}
