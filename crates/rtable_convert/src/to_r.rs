//! Host columns to R vectors.
//!
//! Works over `Option<Value>` rows, `None` standing for a missing value
//! once an optional wrapper has been peeled off.

use std::sync::Arc;

use rtable_foundation::{
    Column, DataType, DateTimeKind, Error, ErrorKind, Result, TagType, TypeManager, Value,
};
use rtable_rdata::{NA_INTEGER, RValue, na_real};
use tracing::trace;

type Rows = Vec<Option<Value>>;

/// Converts a column to the R vector holding its values.
///
/// With `allow_nested`, record and array columns become list columns;
/// deeper nesting is rejected either way.
///
/// # Errors
///
/// Fails for tagged types with several payload tags, for nesting R
/// tables cannot hold, for tagged types the manager does not know, and
/// with an internal error if a value does not match the column type.
pub fn column_to_r(column: &Column, types: &dyn TypeManager, allow_nested: bool) -> Result<RValue> {
    let rows: Rows = column.values().iter().cloned().map(Some).collect();
    let converter = ToR {
        types,
        allow_nested,
    };
    converter
        .convert(column.data_type(), rows, 0)
        .map_err(|e| e.in_frame(format!("column \"{}\"", column.name())))
}

struct ToR<'a> {
    types: &'a dyn TypeManager,
    allow_nested: bool,
}

impl ToR<'_> {
    fn convert(&self, data_type: &DataType, rows: Rows, depth: usize) -> Result<RValue> {
        match data_type {
            DataType::Number => numbers_to_r(data_type, rows),
            DataType::Text => Ok(RValue::StringVector {
                values: rows
                    .into_iter()
                    .map(|v| v.map(|v| expect_text(data_type, v)).transpose())
                    .collect::<Result<_>>()?,
                attributes: None,
            }),
            DataType::Boolean => Ok(RValue::logicals(
                rows.into_iter()
                    .map(|v| {
                        v.map(|v| v.as_bool().ok_or_else(|| mismatch(data_type, &v)))
                            .transpose()
                    })
                    .collect::<Result<_>>()?,
            )),
            DataType::Date(kind) => Ok(RValue::TemporalVector {
                kind: *kind,
                values: rows
                    .into_iter()
                    .map(|v| {
                        v.map(|v| v.as_temporal().copied().ok_or_else(|| mismatch(data_type, &v)))
                            .transpose()
                    })
                    .collect::<Result<_>>()?,
                attributes: temporal_attributes(*kind),
            }),
            DataType::Tagged(reference) => {
                let definition = self
                    .types
                    .lookup_tagged_type(&reference.name)
                    .ok_or_else(|| Error::new(ErrorKind::UnknownTaggedType(reference.name.to_string())))?;
                let tags = definition.instantiate(&reference.args);
                let payloads: Vec<(usize, &DataType)> = tags
                    .iter()
                    .enumerate()
                    .filter_map(|(i, t)| t.inner.as_ref().map(|inner| (i, inner)))
                    .collect();
                match (tags.len(), payloads.as_slice()) {
                    (1, [(_, payload)]) => {
                        trace!(tagged = %data_type, "unwrapping single-tag type");
                        let inner = rows
                            .into_iter()
                            .map(|v| v.map(|v| payload_of(data_type, v)).transpose().map(Option::flatten))
                            .collect::<Result<_>>()?;
                        self.convert(payload, inner, depth)
                    }
                    (2, [(present, payload)]) => {
                        let inner = rows
                            .into_iter()
                            .map(|v| match v {
                                Some(Value::Tagged(t)) if t.tag == *present => {
                                    Ok(t.inner.map(|b| *b))
                                }
                                Some(Value::Tagged(_)) | None => Ok(None),
                                Some(other) => Err(mismatch(data_type, &other)),
                            })
                            .collect::<Result<_>>()?;
                        self.convert(payload, inner, depth)
                    }
                    (_, []) => enum_to_factor(data_type, &tags, rows),
                    _ => Err(Error::new(ErrorKind::NestedTaggedType(data_type.to_string()))),
                }
            }
            DataType::Record(_) | DataType::Array(_) if !self.allow_nested || depth > 0 => {
                Err(Error::new(ErrorKind::UnsupportedNesting {
                    depth,
                    data_type: data_type.clone(),
                }))
            }
            DataType::Record(record) => {
                let values = rows
                    .into_iter()
                    .map(|row| match row {
                        None => Ok(RValue::Nil),
                        Some(Value::Record(fields)) => {
                            let mut names = Vec::with_capacity(record.len());
                            let mut items = Vec::with_capacity(record.len());
                            for (name, field_type) in record.fields() {
                                let value = fields.get(name).cloned().ok_or_else(|| {
                                    Error::internal(format!("record value has no field \"{name}\""))
                                })?;
                                items.push(self.convert(field_type, vec![Some(value)], depth + 1)?);
                                names.push(name.clone());
                            }
                            Ok(RValue::GenericList {
                                values: items,
                                attributes: Some(Box::new(RValue::attribute_list([(
                                    "names",
                                    RValue::strings(names),
                                )]))),
                                is_object: false,
                            })
                        }
                        Some(other) => Err(mismatch(data_type, &other)),
                    })
                    .collect::<Result<_>>()?;
                Ok(list_column(values))
            }
            DataType::Array(element) => {
                let values = rows
                    .into_iter()
                    .map(|row| match row {
                        None => Ok(RValue::Nil),
                        Some(Value::Array(items)) => {
                            self.convert(element, items.into_iter().map(Some).collect(), depth + 1)
                        }
                        Some(other) => Err(mismatch(data_type, &other)),
                    })
                    .collect::<Result<_>>()?;
                Ok(list_column(values))
            }
            DataType::TypeVar(i) => Err(Error::internal(format!(
                "unbound type variable '{i} in a column type"
            ))),
        }
    }
}

fn mismatch(expected: &DataType, found: &Value) -> Error {
    Error::type_mismatch(expected.clone(), found.kind_name())
}

fn expect_text(data_type: &DataType, v: Value) -> Result<Arc<str>> {
    match v {
        Value::Text(s) => Ok(s),
        other => Err(mismatch(data_type, &other)),
    }
}

fn payload_of(data_type: &DataType, v: Value) -> Result<Option<Value>> {
    match v {
        Value::Tagged(t) => Ok(t.inner.map(|b| *b)),
        other => Err(mismatch(data_type, &other)),
    }
}

const fn list_column(values: Vec<RValue>) -> RValue {
    RValue::GenericList {
        values,
        attributes: None,
        is_object: false,
    }
}

fn as_int(x: f64) -> Option<i32> {
    #[allow(clippy::cast_possible_truncation)]
    let n = x as i32;
    (f64::from(n) == x && n != NA_INTEGER).then_some(n)
}

/// Emits an integer vector when every present value is a whole number in
/// range, doubles otherwise.
fn numbers_to_r(data_type: &DataType, rows: Rows) -> Result<RValue> {
    let numbers: Vec<Option<f64>> = rows
        .into_iter()
        .map(|row| {
            row.map(|v| v.as_number().ok_or_else(|| mismatch(data_type, &v)))
                .transpose()
        })
        .collect::<Result<_>>()?;
    let ints: Option<Vec<i32>> = numbers
        .iter()
        .map(|x| x.map_or(Some(NA_INTEGER), as_int))
        .collect();
    Ok(match ints {
        Some(ints) => RValue::ints(ints),
        None => RValue::doubles(numbers.into_iter().map(|x| x.unwrap_or(na_real())).collect()),
    })
}

fn temporal_attributes(kind: DateTimeKind) -> Option<Box<RValue>> {
    let attributes = match kind {
        DateTimeKind::YearMonthDay | DateTimeKind::YearMonth | DateTimeKind::Year => {
            RValue::attribute_list([("class", RValue::strings(["Date"]))])
        }
        DateTimeKind::DateTime => {
            RValue::attribute_list([("class", RValue::strings(["POSIXct", "POSIXt"]))])
        }
        DateTimeKind::DateTimeZoned => RValue::attribute_list([
            ("class", RValue::strings(["POSIXct", "POSIXt"])),
            ("tzone", RValue::strings(["UTC"])),
        ]),
        DateTimeKind::TimeOfDay => return None,
    };
    Some(Box::new(attributes))
}

/// Pure enums become factors with the tag names as levels.
fn enum_to_factor(
    data_type: &DataType,
    tags: &[TagType],
    rows: Rows,
) -> Result<RValue> {
    let values = rows
        .into_iter()
        .map(|row| match row {
            None => Ok(NA_INTEGER),
            Some(Value::Tagged(t)) if t.tag < tags.len() => i32::try_from(t.tag + 1)
                .map_err(|_| Error::internal(format!("tag index {} overflows", t.tag))),
            Some(other) => Err(mismatch(data_type, &other)),
        })
        .collect::<Result<_>>()?;
    Ok(RValue::FactorList {
        values,
        level_names: tags.iter().map(|t| t.name.clone()).collect(),
    })
}
