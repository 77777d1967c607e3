use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Type, ID_COLUMN};

/// Ordered column definitions of one table. `ID` is always first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    pub columns: IndexMap<String, Type>,
}

impl TableSchema {
    pub fn column_type(&self, column: &str) -> Option<Type> {
        self.columns.get(column).copied()
    }

    /// Columns the caller supplies on insert: everything except `ID`.
    pub fn value_columns(&self) -> impl Iterator<Item = (&str, Type)> + '_ {
        self.columns
            .iter()
            .filter(|(name, _)| name.as_str() != ID_COLUMN)
            .map(|(name, typ)| (name.as_str(), *typ))
    }

    /// `ID:int, name:str, ...`
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|(name, typ)| format!("{}:{}", name, typ))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Every table schema, keyed by table name in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    pub tables: IndexMap<String, TableSchema>,
}

/// Snapshot returned by `Metadata::info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub schema: TableSchema,
    pub record_count: usize,
}
