//! Tables to and from R data frames.
//!
//! A data frame is a list of equal-length column vectors with `names`,
//! `class` and `row.names` attributes. Tibbles are data frames with two
//! extra classes and verbatim column names.

use std::sync::Arc;

use rtable_foundation::{Column, Error, ErrorKind, Result, Table, TypeManager};
use rtable_rdata::{NA_INTEGER, RValue};
use tracing::debug;

use crate::names::make_names;
use crate::options::ConvertOptions;
use crate::to_host::RConverter;
use crate::to_r::column_to_r;

/// Which R table class to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableKind {
    /// A base `data.frame`; column names are escaped like `make.names`.
    #[default]
    DataFrame,
    /// A tibble (`tbl_df`); column names are kept verbatim.
    Tibble,
}

impl TableKind {
    fn classes(self) -> &'static [&'static str] {
        match self {
            Self::DataFrame => &["data.frame"],
            Self::Tibble => &["tbl_df", "tbl", "data.frame"],
        }
    }
}

/// Converts an R value into named tables.
///
/// See [`convert_r_to_tables_with`].
///
/// # Errors
///
/// As [`convert_r_to_tables_with`].
pub fn convert_r_to_tables(
    value: &RValue,
    allow_multiple: bool,
    types: &mut dyn TypeManager,
) -> Result<Vec<(String, Table)>> {
    let options = ConvertOptions::default().with_allow_multiple(allow_multiple);
    convert_r_to_tables_with(value, &options, types)
}

/// Converts an R value into named tables.
///
/// - a data frame becomes one table named after the default table name;
/// - a non-empty list of data frames becomes one table per frame, named by
///   the list's names where present;
/// - any other named list is read as a data frame;
/// - any other value becomes a one-column table with column `value`.
///
/// # Errors
///
/// Fails with `MultipleTables` if several frames are found and the options
/// do not allow it, with `NilValue` for `NULL`, with `LengthMismatch` for
/// ragged columns, and with any column conversion error, framed by column
/// and table name.
pub fn convert_r_to_tables_with(
    value: &RValue,
    options: &ConvertOptions,
    types: &mut dyn TypeManager,
) -> Result<Vec<(String, Table)>> {
    if let Some(frames) = frame_list(value) {
        if frames.len() > 1 && !options.allow_multiple {
            return Err(Error::new(ErrorKind::MultipleTables { count: frames.len() }));
        }
        let names = value.names();
        debug!(count = frames.len(), "reading list of data frames");
        return frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let name = names
                    .and_then(|n| n.get(i))
                    .and_then(|n| n.as_deref())
                    .filter(|n| !n.is_empty())
                    .map_or_else(
                        || {
                            if frames.len() == 1 {
                                options.default_table_name.clone()
                            } else {
                                format!("{} {}", options.default_table_name, i + 1)
                            }
                        },
                        str::to_owned,
                    );
                let table = frame_to_table(&name, frame, types)?;
                Ok((name, table))
            })
            .collect();
    }

    let name = options.default_table_name.clone();
    let table = match value {
        RValue::Nil => return Err(Error::new(ErrorKind::NilValue)),
        RValue::GenericList { .. } if is_frame(value) || value.names().is_some() => {
            frame_to_table(&name, value, types)?
        }
        other => {
            debug!(kind = other.variant_name(), "reading a bare value as a one-column table");
            let converted = RConverter::new(types, "value")
                .convert(other)
                .map_err(|e| e.in_frame("column \"value\"").in_frame(format!("table \"{name}\"")))?;
            let column = Column::new("value", converted.data_type, converted.values)?;
            Table::new(name.as_str(), vec![column])?
        }
    };
    Ok(vec![(name, table)])
}

fn is_frame(value: &RValue) -> bool {
    matches!(value, RValue::GenericList { .. }) && value.inherits("data.frame")
}

/// The elements of a non-empty, non-frame list made only of frames.
fn frame_list(value: &RValue) -> Option<&[RValue]> {
    match value {
        RValue::GenericList { values, .. }
            if !values.is_empty() && !is_frame(value) && values.iter().all(is_frame) =>
        {
            Some(values)
        }
        _ => None,
    }
}

/// Row count declared by `row.names`, either the compact `c(NA, -n)` form
/// or an explicit vector of names.
fn declared_rows(frame: &RValue) -> Option<usize> {
    match frame.attribute("row.names")? {
        RValue::IntVector { values, .. } => match values.as_slice() {
            &[NA_INTEGER, n] => usize::try_from(n.unsigned_abs()).ok(),
            names => Some(names.len()),
        },
        RValue::DoubleVector { values, .. } => Some(values.len()),
        RValue::StringVector { values, .. } => Some(values.len()),
        _ => None,
    }
}

fn frame_to_table(name: &str, frame: &RValue, types: &mut dyn TypeManager) -> Result<Table> {
    let RValue::GenericList { values, .. } = frame else {
        return Err(Error::internal(format!(
            "expected a list for table \"{name}\", found {}",
            frame.variant_name()
        )));
    };
    let column_names = frame.names();
    let mut rows = declared_rows(frame);
    debug!(table = name, columns = values.len(), rows, "converting data frame");

    let mut columns = Vec::with_capacity(values.len());
    for (i, column) in values.iter().enumerate() {
        let column_name: Arc<str> = column_names
            .and_then(|n| n.get(i))
            .and_then(Clone::clone)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Arc::from(format!("Unnamed field {}", i + 1)));
        let converted = convert_column(&column_name, column, types)
            .map_err(|e| e.in_frame(format!("table \"{name}\"")))?;
        let expected = *rows.get_or_insert(converted.len());
        if converted.len() != expected {
            return Err(Error::length_mismatch(
                format!("column \"{column_name}\""),
                expected,
                converted.len(),
            )
            .in_frame(format!("table \"{name}\"")));
        }
        columns.push(converted);
    }
    Table::new(name, columns)
}

fn convert_column(name: &Arc<str>, column: &RValue, types: &mut dyn TypeManager) -> Result<Column> {
    // A list column's names label rows, not record fields.
    let stripped;
    let column = match column {
        RValue::GenericList { values, is_object, .. } if !is_frame(column) => {
            stripped = RValue::GenericList {
                values: values.clone(),
                attributes: None,
                is_object: *is_object,
            };
            &stripped
        }
        other => other,
    };
    let converted = RConverter::new(types, &**name)
        .convert(column)
        .map_err(|e| e.in_frame(format!("column \"{name}\"")))?;
    Column::new(name.clone(), converted.data_type, converted.values)
}

/// Converts a table into an R data frame or tibble.
///
/// # Errors
///
/// As [`convert_table_to_r_with`].
pub fn convert_table_to_r(table: &Table, kind: TableKind, types: &dyn TypeManager) -> Result<RValue> {
    let options = ConvertOptions::default().with_table_kind(kind);
    convert_table_to_r_with(table, &options, types)
}

/// Converts a table into an R data frame or tibble.
///
/// Columns are converted with [`column_to_r`]. Data frame column names are
/// escaped and de-duplicated the way `data.frame()` would; tibble names
/// are written as they are. Rows are unnamed (`row.names = c(NA, -n)`).
///
/// # Errors
///
/// Fails if a column cannot be expressed in R, framed by the table name.
pub fn convert_table_to_r_with(
    table: &Table,
    options: &ConvertOptions,
    types: &dyn TypeManager,
) -> Result<RValue> {
    let in_table = |e: Error| e.in_frame(format!("table \"{}\"", table.name()));
    let columns = table
        .columns()
        .iter()
        .map(|c| column_to_r(c, types, options.allow_nested))
        .collect::<Result<Vec<_>>>()
        .map_err(in_table)?;

    let raw_names = table.columns().iter().map(Column::name);
    let names: Vec<String> = match options.table_kind {
        TableKind::DataFrame => make_names(raw_names),
        TableKind::Tibble => raw_names.map(str::to_owned).collect(),
    };
    let rows = i32::try_from(table.row_count())
        .map_err(|_| in_table(Error::format(format!("{} rows exceed R's row limit", table.row_count()))))?;
    debug!(table = table.name(), kind = ?options.table_kind, rows, "writing data frame");

    Ok(RValue::GenericList {
        values: columns,
        attributes: Some(Box::new(RValue::attribute_list([
            ("names", RValue::strings(names)),
            ("class", RValue::strings(options.table_kind.classes().iter().copied())),
            ("row.names", RValue::ints(vec![NA_INTEGER, -rows])),
        ]))),
        is_object: true,
    })
}
