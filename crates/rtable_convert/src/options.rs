//! Options for table conversion.

use crate::frame::TableKind;

/// Name given to a table that R did not name.
pub const DEFAULT_TABLE_NAME: &str = "data";

/// Options for table conversion in both directions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Accept an R list of data frames as several tables.
    pub allow_multiple: bool,

    /// Write record and array columns as R list columns.
    pub allow_nested: bool,

    /// Class and naming conventions used when writing.
    pub table_kind: TableKind,

    /// Name for tables R did not name.
    pub default_table_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            allow_multiple: false,
            allow_nested: true,
            table_kind: TableKind::DataFrame,
            default_table_name: DEFAULT_TABLE_NAME.to_owned(),
        }
    }
}

impl ConvertOptions {
    /// Builder method to accept several tables.
    #[must_use]
    pub fn with_allow_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = allow_multiple;
        self
    }

    /// Builder method to allow list columns.
    #[must_use]
    pub fn with_allow_nested(mut self, allow_nested: bool) -> Self {
        self.allow_nested = allow_nested;
        self
    }

    /// Builder method to set the table kind.
    #[must_use]
    pub fn with_table_kind(mut self, table_kind: TableKind) -> Self {
        self.table_kind = table_kind;
        self
    }

    /// Builder method to set the fallback table name.
    #[must_use]
    pub fn with_default_table_name(mut self, name: impl Into<String>) -> Self {
        self.default_table_name = name.into();
        self
    }
}
