//! Pretty-printer for decoded R objects.
//!
//! Renders an [`RValue`] tree as an indented outline, one node per line,
//! with attributes listed under their owner as `@name`.
//!
//! # Example
//!
//! ```
//! use rtable_rdata::{RValue, pretty::pretty_print};
//!
//! let v = RValue::ints(vec![1, 2, 3]);
//! assert_eq!(pretty_print(&v), "IntVector [1, 2, 3]\n");
//! ```

use std::fmt::Write;

use crate::header::NA_INTEGER;
use crate::rvalue::{PairListEntry, RValue};

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
    /// Maximum number of vector elements shown before eliding the rest.
    pub max_elements: usize,
    /// Whether to print attributes.
    pub show_attributes: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            max_elements: 10,
            show_attributes: true,
        }
    }
}

/// Pretty-print a value to a string.
#[must_use]
pub fn pretty_print(value: &RValue) -> String {
    pretty_print_with_config(value, PrettyConfig::default())
}

/// Pretty-print a value with custom configuration.
#[must_use]
pub fn pretty_print_with_config(value: &RValue, config: PrettyConfig) -> String {
    let mut printer = PrettyPrinter::new(config);
    printer.print(value);
    printer.output
}

/// Pretty-printer state.
struct PrettyPrinter {
    config: PrettyConfig,
    output: String,
    indent_level: usize,
}

impl PrettyPrinter {
    fn new(config: PrettyConfig) -> Self {
        Self {
            config,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn print(&mut self, value: &RValue) {
        match value {
            RValue::Nil => self.output.push_str("NULL\n"),
            RValue::String {
                value,
                is_symbol: true,
            } => {
                let _ = writeln!(self.output, "Symbol {}", value.as_deref().unwrap_or("NA"));
            }
            RValue::String { value, .. } => {
                self.output.push_str("String ");
                self.push_text(value.as_deref());
                self.output.push('\n');
            }
            RValue::IntVector { values, attributes } => {
                self.print_elements("IntVector", values, |out, &v| {
                    if v == NA_INTEGER {
                        out.push_str("NA");
                    } else {
                        let _ = write!(out, "{v}");
                    }
                });
                self.print_attributes(attributes.as_deref());
            }
            RValue::DoubleVector { values, attributes } => {
                self.print_elements("DoubleVector", values, |out, &v| {
                    if v.is_nan() {
                        out.push_str("NA");
                    } else {
                        let _ = write!(out, "{v}");
                    }
                });
                self.print_attributes(attributes.as_deref());
            }
            RValue::LogicalVector {
                values,
                is_na,
                attributes,
            } => {
                let flags: Vec<Option<bool>> = values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let na = is_na.as_ref().is_some_and(|f| f.get(i) == Some(&true));
                        (!na).then_some(v)
                    })
                    .collect();
                self.print_elements("LogicalVector", &flags, |out, v| match v {
                    Some(true) => out.push_str("TRUE"),
                    Some(false) => out.push_str("FALSE"),
                    None => out.push_str("NA"),
                });
                self.print_attributes(attributes.as_deref());
            }
            RValue::StringVector { values, attributes } => {
                self.print_elements("StringVector", values, |out, v| match v {
                    Some(s) => {
                        let _ = write!(out, "{:?}", &**s);
                    }
                    None => out.push_str("NA"),
                });
                self.print_attributes(attributes.as_deref());
            }
            RValue::TemporalVector {
                kind,
                values,
                attributes,
            } => {
                let label = format!("TemporalVector<{kind}>");
                self.print_elements(&label, values, |out, v| match v {
                    Some(t) => {
                        let _ = write!(out, "{t}");
                    }
                    None => out.push_str("NA"),
                });
                self.print_attributes(attributes.as_deref());
            }
            RValue::FactorList {
                values,
                level_names,
            } => {
                self.print_elements("FactorList", values, |out, &code| {
                    let level = usize::try_from(code)
                        .ok()
                        .and_then(|c| c.checked_sub(1))
                        .and_then(|i| level_names.get(i));
                    match level {
                        Some(l) => out.push_str(l),
                        None if code == NA_INTEGER => out.push_str("NA"),
                        None => {
                            let _ = write!(out, "<{code}?>");
                        }
                    }
                });
                self.indent_level += 1;
                self.indent();
                let _ = writeln!(self.output, "levels: {}", level_names.join(", "));
                self.indent_level -= 1;
            }
            RValue::GenericList {
                values,
                attributes,
                is_object,
            } => {
                let object = if *is_object { " (object)" } else { "" };
                let _ = writeln!(self.output, "GenericList{object} [{}]", values.len());
                self.print_attributes(attributes.as_deref());
                self.indent_level += 1;
                for (i, v) in values.iter().enumerate() {
                    self.indent();
                    let _ = write!(self.output, "[[{}]] ", i + 1);
                    self.print(v);
                }
                self.indent_level -= 1;
            }
            RValue::PairList(entries) => {
                let _ = writeln!(self.output, "PairList [{}]", entries.len());
                self.indent_level += 1;
                for entry in entries {
                    self.print_entry(entry);
                }
                self.indent_level -= 1;
            }
        }
    }

    fn print_entry(&mut self, entry: &PairListEntry) {
        self.indent();
        match entry.tag_name() {
            Some(name) => {
                let _ = write!(self.output, "${name} ");
            }
            None => self.output.push_str("$ "),
        }
        self.print(&entry.item);
        if let Some(attributes) = entry.attributes.as_deref() {
            self.print_attributes(Some(attributes));
        }
    }

    fn print_attributes(&mut self, attributes: Option<&RValue>) {
        if !self.config.show_attributes {
            return;
        }
        let Some(attributes) = attributes else {
            return;
        };
        self.indent_level += 1;
        match attributes {
            RValue::PairList(entries) => {
                for entry in entries {
                    self.indent();
                    let _ = write!(self.output, "@{} ", entry.tag_name().unwrap_or("?"));
                    self.print(&entry.item);
                }
            }
            other => {
                self.indent();
                self.output.push_str("@ ");
                self.print(other);
            }
        }
        self.indent_level -= 1;
    }

    fn print_elements<T>(&mut self, label: &str, values: &[T], mut item: impl FnMut(&mut String, &T)) {
        let _ = write!(self.output, "{label} [");
        for (i, v) in values.iter().take(self.config.max_elements).enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            item(&mut self.output, v);
        }
        if values.len() > self.config.max_elements {
            let _ = write!(
                self.output,
                ", ... {} more",
                values.len() - self.config.max_elements
            );
        }
        self.output.push_str("]\n");
    }

    fn push_text(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                let _ = write!(self.output, "{s:?}");
            }
            None => self.output.push_str("NA"),
        }
    }

    fn indent(&mut self) {
        let width = self.indent_level * self.config.indent_width;
        self.output.extend(std::iter::repeat_n(' ', width));
    }
}
