use log::{debug, info};

use self::defs::{Metadata, TableInfo, TableSchema};
use crate::core::{DbError, Record, Type, ID_COLUMN};

pub mod defs;

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new table from `name:type` column definitions.
    ///
    /// `ID:int` is prepended automatically. Every column is validated before
    /// anything is inserted, so on error the metadata is left untouched.
    pub fn create_table<S: AsRef<str>>(
        &mut self,
        table_name: &str,
        columns: &[S],
    ) -> Result<&TableSchema, DbError> {
        if table_name.is_empty() {
            return Err(DbError::validation("table name must not be empty"));
        }
        // The name doubles as the data document's file name.
        if table_name.starts_with('.') || table_name.contains(['/', '\\']) {
            return Err(DbError::validation(format!(
                "invalid table name \"{}\"",
                table_name
            )));
        }

        if self.exists_table(table_name) {
            return Err(DbError::validation(format!(
                "table \"{}\" already exists",
                table_name
            )));
        }

        let mut schema = TableSchema::default();
        schema.columns.insert(ID_COLUMN.to_string(), Type::Int);

        for column in columns {
            let column = column.as_ref();
            let (name, typ) = column.split_once(':').ok_or_else(|| {
                DbError::validation(format!(
                    "invalid column \"{}\", expected name:type",
                    column
                ))
            })?;
            let typ: Type = typ.parse()?;

            if name.is_empty() {
                return Err(DbError::validation(format!(
                    "invalid column \"{}\", name must not be empty",
                    column
                )));
            }
            if name == ID_COLUMN {
                return Err(DbError::validation(format!(
                    "column \"{}\" is added automatically",
                    ID_COLUMN
                )));
            }
            if schema.columns.insert(name.to_string(), typ).is_some() {
                return Err(DbError::validation(format!(
                    "column \"{}\" is declared more than once",
                    name
                )));
            }
        }

        info!("Creating table {} ({})", table_name, schema.describe());
        let (index, _) = self.tables.insert_full(table_name.to_string(), schema);
        Ok(&self.tables[index])
    }

    pub fn drop_table(&mut self, table_name: &str) -> Result<TableSchema, DbError> {
        let schema = self
            .tables
            .shift_remove(table_name)
            .ok_or_else(|| table_not_found(table_name))?;

        info!("Dropped table {}", table_name);
        Ok(schema)
    }

    pub fn exists_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    /// Table names in creation order.
    pub fn list_tables(&self) -> TableNames<'_> {
        TableNames {
            inner: self.tables.keys(),
        }
    }

    pub fn find_table_by_name(&self, table_name: &str) -> Result<&TableSchema, DbError> {
        self.tables
            .get(table_name)
            .ok_or_else(|| table_not_found(table_name))
    }

    /// Schema and row count of a table whose data document is `records`.
    pub fn info(&self, table_name: &str, records: &[Record]) -> Result<TableInfo, DbError> {
        let schema = self.find_table_by_name(table_name)?;
        debug!("Table {} holds {} records", table_name, records.len());

        Ok(TableInfo {
            name: table_name.to_string(),
            schema: schema.clone(),
            record_count: records.len(),
        })
    }
}

pub(crate) fn table_not_found(table_name: &str) -> DbError {
    DbError::not_found(format!("table \"{}\" does not exist", table_name))
}

/// Borrowing iterator over table names. Cloning it restarts the walk.
#[derive(Clone, Debug)]
pub struct TableNames<'a> {
    inner: indexmap::map::Keys<'a, String, TableSchema>,
}

impl<'a> Iterator for TableNames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TableNames<'_> {}
