//! R values to typed host values.

use std::sync::Arc;

use rtable_foundation::{
    DataType, Error, ErrorKind, Result, TagType, TaggedTypeDefinition, TypeManager, Value,
};
use rtable_rdata::{NA_INTEGER, PairListEntry, RValue};
use tracing::debug;

use crate::generalize::generalize;

/// Number of `"<hint> N"` names tried for a new factor type.
const FACTOR_NAME_ATTEMPTS: usize = 100;

/// One element type and one value per source element.
///
/// The type describes the elements; it is only an array type when the
/// elements themselves are arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValues {
    /// Element type.
    pub data_type: DataType,
    /// Converted values.
    pub values: Vec<Value>,
}

impl TypedValues {
    /// Pairs a type with values.
    #[must_use]
    pub const fn new(data_type: DataType, values: Vec<Value>) -> Self {
        Self { data_type, values }
    }

    /// Collapses to a single value: one value stays as it is, anything else
    /// becomes an array.
    #[must_use]
    pub fn into_single(self) -> (DataType, Value) {
        match <[Value; 1]>::try_from(self.values) {
            Ok([value]) => (self.data_type, value),
            Err(values) => (DataType::array(self.data_type), Value::array(values)),
        }
    }
}

/// Converts R values into typed host values.
///
/// New tagged types for factors are registered through the injected
/// [`TypeManager`]; the hint names them. Missing values are wrapped in the
/// manager's `Maybe` type.
pub struct RConverter<'a> {
    types: &'a mut dyn TypeManager,
    hint: String,
}

impl<'a> RConverter<'a> {
    /// Creates a converter. `hint` seeds the names of factor types.
    pub fn new(types: &'a mut dyn TypeManager, hint: impl Into<String>) -> Self {
        Self {
            types,
            hint: hint.into(),
        }
    }

    /// Converts one R value.
    ///
    /// # Errors
    ///
    /// Fails for `NULL`, for list elements without a common type, for
    /// factor codes outside the levels, and when no name is left for a new
    /// factor type.
    pub fn convert(&mut self, value: &RValue) -> Result<TypedValues> {
        match value {
            RValue::Nil => Err(Error::new(ErrorKind::NilValue)),
            RValue::String { value, .. } => Ok(self.optional_column(
                DataType::Text,
                std::iter::once(value.clone().map(Value::Text)),
            )),
            RValue::StringVector { values, .. } => Ok(self.optional_column(
                DataType::Text,
                values.iter().map(|v| v.clone().map(Value::Text)),
            )),
            RValue::LogicalVector { values, is_na, .. } => Ok(self.optional_column(
                DataType::Boolean,
                values.iter().enumerate().map(|(i, &b)| {
                    let na = is_na.as_ref().is_some_and(|f| f.get(i) == Some(&true));
                    (!na).then_some(Value::Bool(b))
                }),
            )),
            RValue::IntVector { values, .. } => Ok(self.optional_column(
                DataType::Number,
                values
                    .iter()
                    .map(|&n| (n != NA_INTEGER).then(|| Value::Number(f64::from(n)))),
            )),
            RValue::DoubleVector { values, .. } => Ok(self.optional_column(
                DataType::Number,
                values.iter().map(|&x| (!x.is_nan()).then_some(Value::Number(x))),
            )),
            RValue::TemporalVector { kind, values, .. } => Ok(self.optional_column(
                DataType::Date(*kind),
                values.iter().map(|t| t.map(Value::Temporal)),
            )),
            RValue::GenericList { values, .. } => match value.names() {
                Some(names) if names.len() == values.len() => {
                    let fields = names.iter().zip(values).map(|(n, v)| (n.as_deref(), v));
                    self.convert_record(fields)
                }
                _ => self.convert_list(values),
            },
            RValue::PairList(entries) => match entries.as_slice() {
                [
                    PairListEntry {
                        item: RValue::FactorList {
                            values,
                            level_names,
                        },
                        ..
                    },
                    _,
                ] => self.convert_factor(values, level_names),
                _ => self.convert_record(entries.iter().map(|e| (e.tag_name(), &e.item))),
            },
            RValue::FactorList {
                values,
                level_names,
            } => self.convert_factor(values, level_names),
        }
    }

    /// Converts with a different naming hint, restoring the old one after.
    fn convert_with_hint(&mut self, hint: &str, value: &RValue) -> Result<TypedValues> {
        let saved = std::mem::replace(&mut self.hint, hint.to_owned());
        let result = self.convert(value);
        self.hint = saved;
        result
    }

    /// Builds one record from named values. Each field's values collapse
    /// to a single value.
    fn convert_record<'v, I>(&mut self, fields: I) -> Result<TypedValues>
    where
        I: Iterator<Item = (Option<&'v str>, &'v RValue)>,
    {
        let mut field_types = Vec::new();
        let mut field_values = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (i, (name, item)) in fields.enumerate() {
            let name: Arc<str> = match name {
                Some(n) if !n.is_empty() => Arc::from(n),
                _ => Arc::from(format!("Unnamed field {}", i + 1)),
            };
            if !seen.insert(name.clone()) {
                return Err(Error::format(format!("duplicate field name \"{name}\"")));
            }
            let (t, v) = self
                .convert_with_hint(&name, item)
                .map_err(|e| e.in_frame(format!("field \"{name}\"")))?
                .into_single();
            field_types.push((name.clone(), t));
            field_values.push((name, v));
        }
        Ok(TypedValues::new(
            DataType::record(field_types),
            vec![Value::record(field_values)],
        ))
    }

    /// Converts a list to one value per element, generalized to one type.
    fn convert_list(&mut self, items: &[RValue]) -> Result<TypedValues> {
        if items.is_empty() {
            return Ok(TypedValues::new(DataType::Text, Vec::new()));
        }
        let elements = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.convert(item)
                    .map(TypedValues::into_single)
                    .map_err(|e| e.in_frame(format!("list element {}", i + 1)))
            })
            .collect::<Result<Vec<_>>>()?;
        let types: Vec<DataType> = elements.iter().map(|(t, _)| t.clone()).collect();
        let general = generalize(&types, &*self.types)?;
        let values = elements
            .into_iter()
            .map(|(t, v)| general.lift(&*self.types, &t, v))
            .collect::<Result<Vec<_>>>()?;
        Ok(TypedValues::new(general.result_type, values))
    }

    fn convert_factor(&mut self, codes: &[i32], levels: &[Arc<str>]) -> Result<TypedValues> {
        let definition = self.factor_type(levels)?;
        // A reused definition may list the same tags in another order.
        let tag_of_level = levels
            .iter()
            .map(|l| {
                definition.tag_index(l).ok_or_else(|| {
                    Error::internal(format!(
                        "factor type {} has no tag \"{l}\"",
                        definition.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tags = codes
            .iter()
            .map(|&code| {
                if code == NA_INTEGER {
                    return Ok(None);
                }
                usize::try_from(code)
                    .ok()
                    .and_then(|c| c.checked_sub(1))
                    .and_then(|i| tag_of_level.get(i))
                    .map(|&tag| Some(Value::tag(tag)))
                    .ok_or_else(|| {
                        Error::new(ErrorKind::FactorIndexOutOfRange {
                            index: code,
                            levels: levels.len(),
                        })
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.optional_column(
            DataType::tagged(definition.name.clone()),
            tags.into_iter(),
        ))
    }

    /// Finds a registered enum over exactly these levels, or registers one
    /// under the first free `"<hint> N"` name.
    fn factor_type(&mut self, levels: &[Arc<str>]) -> Result<Arc<TaggedTypeDefinition>> {
        if let Some(existing) = self
            .types
            .known_tagged_types()
            .values()
            .find(|d| d.is_enum_over(levels))
        {
            return Ok(existing.clone());
        }
        let tags: Vec<TagType> = levels.iter().map(|l| TagType::bare(l.clone())).collect();
        for i in 0..FACTOR_NAME_ATTEMPTS {
            let name = format!("{} {i}", self.hint);
            if self.types.lookup_tagged_type(&name).is_some() {
                continue;
            }
            let registered = self.types.register_tagged_type(&name, Vec::new(), tags.clone());
            if let Some(definition) = registered {
                debug!(name = %definition.name, levels = levels.len(), "registered factor type");
                return Ok(definition);
            }
        }
        Err(Error::new(ErrorKind::TypeNamesExhausted(self.hint.clone())))
    }

    /// Builds a column that is plain when every value is present and
    /// optional otherwise.
    fn optional_column<I>(&self, data_type: DataType, values: I) -> TypedValues
    where
        I: Iterator<Item = Option<Value>>,
    {
        let values: Vec<Option<Value>> = values.collect();
        if values.iter().all(Option::is_some) {
            return TypedValues::new(data_type, values.into_iter().flatten().collect());
        }
        TypedValues::new(
            self.types.make_maybe_type(data_type),
            values
                .into_iter()
                .map(|v| match v {
                    Some(v) => self.types.maybe_present(v),
                    None => self.types.maybe_missing(),
                })
                .collect(),
        )
    }
}
