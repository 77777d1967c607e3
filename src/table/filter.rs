use std::fmt::Display;

use crate::core::Record;

/// A single `column = value` pair, used both as a `where` filter and as a
/// `set` assignment. The value is kept as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub column: String,
    pub value: String,
}

impl Clause {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// True when the record's field, in string form, equals the clause value.
    /// A record without the column never matches.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.column)
            .map_or(false, |datum| datum.matches_text(&self.value))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}
