//! Typed columns and tables.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::RtVec;
use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;

/// A named column: one element type and one value per row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    name: Arc<str>,
    data_type: DataType,
    values: RtVec<Value>,
}

impl Column {
    /// Creates a column, checking every value against the type.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch naming the first value whose shape the type
    /// does not admit.
    pub fn new<I>(name: impl Into<Arc<str>>, data_type: DataType, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let name = name.into();
        let values: RtVec<Value> = values.into_iter().collect();
        if let Some((row, bad)) = values.iter().enumerate().find(|(_, v)| !data_type.admits(v)) {
            return Err(Error::type_mismatch(
                data_type,
                format!("{} {bad:?} in row {row}", bad.kind_name()),
            )
            .in_frame(format!("column \"{name}\"")));
        }
        Ok(Self {
            name,
            data_type,
            values,
        })
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element type.
    #[must_use]
    pub const fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Returns the values.
    #[must_use]
    pub const fn values(&self) -> &RtVec<Value> {
        &self.values
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named table of equally long columns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    name: Arc<str>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table.
    ///
    /// # Errors
    ///
    /// Returns a length mismatch if the columns differ in row count.
    pub fn new(name: impl Into<Arc<str>>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if let Some(first) = columns.first() {
            if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(Error::length_mismatch(
                    format!("column \"{}\"", bad.name()),
                    first.len(),
                    bad.len(),
                )
                .in_frame(format!("table \"{name}\"")));
            }
        }
        Ok(Self { name, columns })
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns the number of rows (0 for a table without columns).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }
}
