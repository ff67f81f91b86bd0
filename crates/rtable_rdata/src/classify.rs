//! Post-decode classification.
//!
//! The decoder produces only wire-level variants. This pass rebuilds the
//! two shapes R expresses through attributes:
//!
//! - an integer vector carrying `levels` becomes a [`RValue::FactorList`]
//! - a double vector of class `Date` or `POSIXct` becomes a
//!   [`RValue::TemporalVector`]
//!
//! The pass runs once per decode and returns a new tree.

use std::sync::Arc;

use rtable_foundation::DateTimeKind;

use crate::rvalue::{PairListEntry, RValue};
use crate::temporal;

/// Rebuilds factors and temporal vectors throughout a decoded tree.
#[must_use]
pub fn classify(value: RValue) -> RValue {
    match value {
        RValue::IntVector { values, attributes } => {
            let attributes = attributes.map(|a| Box::new(classify(*a)));
            match factor_levels(attributes.as_deref()) {
                Some(level_names) => RValue::FactorList {
                    values,
                    level_names,
                },
                None => RValue::IntVector { values, attributes },
            }
        }
        RValue::DoubleVector { values, attributes } => {
            let attributes = attributes.map(|a| Box::new(classify(*a)));
            match temporal_kind(attributes.as_deref()) {
                Some(kind) => RValue::TemporalVector {
                    kind,
                    values: values
                        .into_iter()
                        .map(|x| temporal::from_r_double(kind, x))
                        .collect(),
                    attributes,
                },
                None => RValue::DoubleVector { values, attributes },
            }
        }
        RValue::GenericList {
            values,
            attributes,
            is_object,
        } => RValue::GenericList {
            values: values.into_iter().map(classify).collect(),
            attributes: attributes.map(|a| Box::new(classify(*a))),
            is_object,
        },
        RValue::PairList(entries) => RValue::PairList(
            entries
                .into_iter()
                .map(|e| PairListEntry {
                    attributes: e.attributes.map(|a| Box::new(classify(*a))),
                    tag: e.tag,
                    item: classify(e.item),
                })
                .collect(),
        ),
        other @ (RValue::Nil
        | RValue::String { .. }
        | RValue::LogicalVector { .. }
        | RValue::StringVector { .. }
        | RValue::TemporalVector { .. }
        | RValue::FactorList { .. }) => other,
    }
}

fn factor_levels(attributes: Option<&RValue>) -> Option<Vec<Arc<str>>> {
    let levels = attributes?.lookup("levels")?.string_values()?;
    Some(
        levels
            .iter()
            .map(|l| l.clone().unwrap_or_else(|| Arc::from("NA")))
            .collect(),
    )
}

fn temporal_kind(attributes: Option<&RValue>) -> Option<DateTimeKind> {
    let attributes = attributes?;
    let classes = attributes.lookup("class")?.string_values()?;
    let has = |name: &str| classes.iter().any(|c| c.as_deref() == Some(name));
    if has("Date") {
        Some(DateTimeKind::YearMonthDay)
    } else if has("POSIXct") {
        let zoned = attributes
            .lookup("tzone")
            .and_then(RValue::string_values)
            .and_then(|z| z.first().cloned().flatten())
            .is_some_and(|z| !z.is_empty());
        Some(if zoned {
            DateTimeKind::DateTimeZoned
        } else {
            DateTimeKind::DateTime
        })
    } else {
        None
    }
}
