use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Datum;

/// Name of the identity column every table starts with.
pub const ID_COLUMN: &str = "ID";

/// One row: column name to value, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: IndexMap<String, Datum>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: i64) -> Self {
        let mut record = Self::new();
        record.set(ID_COLUMN, Datum::Int(id));
        record
    }

    pub fn set(&mut self, column: &str, value: Datum) {
        self.fields.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Datum> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// The identity value, if the record carries an integer `ID`.
    pub fn id(&self) -> Option<i64> {
        self.get(ID_COLUMN).and_then(|v| v.as_int()).copied()
    }
}

impl<K: Into<String>> FromIterator<(K, Datum)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, Datum)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{}", result)
    }
}
