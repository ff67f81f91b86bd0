//! Column-name escaping in the style of R's `make.names(unique = TRUE)`.
//!
//! `data.frame()` rewrites column names into syntactically valid R names;
//! tibbles keep them verbatim. Writing a `DataFrame` applies the same
//! rewriting so that R sees the names it would have produced itself.

use std::collections::{HashMap, HashSet};

/// Words that cannot be used as bare R names.
const RESERVED: &[&str] = &[
    "if",
    "else",
    "repeat",
    "while",
    "function",
    "for",
    "next",
    "break",
    "TRUE",
    "FALSE",
    "NULL",
    "Inf",
    "NaN",
    "NA",
    "NA_integer_",
    "NA_real_",
    "NA_character_",
    "NA_complex_",
    "in",
];

/// Rewrites one name into a syntactically valid R name.
///
/// Invalid characters become `.`; names that do not start with a letter,
/// or with a dot not followed by a digit, get an `X` prefix; reserved words
/// get a trailing `.`.
#[must_use]
pub fn make_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '_' {
                c
            } else {
                '.'
            }
        })
        .collect();

    let mut chars = out.chars();
    let needs_prefix = match (chars.next(), chars.next()) {
        (None, _) => true,
        (Some('.'), Some(d)) => d.is_ascii_digit(),
        (Some('.'), None) => false,
        (Some(c), _) => !c.is_alphabetic(),
    };
    if needs_prefix {
        out.insert(0, 'X');
    }
    if RESERVED.contains(&out.as_str()) {
        out.push('.');
    }
    out
}

/// Makes names unique by appending `.1`, `.2`, ... to repeats, skipping
/// suffixes that would collide with another name.
#[must_use]
pub fn make_unique(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                return name;
            }
            let counter = counters.entry(name.clone()).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{name}.{counter}");
                if taken.insert(candidate.clone()) {
                    seen.insert(candidate.clone());
                    return candidate;
                }
            }
        })
        .collect()
}

/// Applies [`make_name`] to every name, then [`make_unique`].
#[must_use]
pub fn make_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    make_unique(names.into_iter().map(make_name).collect())
}
