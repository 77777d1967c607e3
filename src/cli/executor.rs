use log::info;

use super::commands::Command;
use crate::{
    catalog::defs::{TableInfo, TableSchema},
    core::{DbError, Record},
    storage::StorageManager,
    table::{self, Clause},
    util::guard::Cache,
};

/// Structured result of one command, rendered by [`super::display`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Created { table: String, schema: TableSchema },
    Dropped { table: String },
    Tables(Vec<String>),
    Info(TableInfo),
    Inserted { table: String, id: i64 },
    Records { schema: TableSchema, records: Vec<Record> },
    Updated { table: String, ids: Vec<i64> },
    Deleted { table: String, count: usize },
    /// The user declined a confirmation.
    Cancelled,
    Help,
    Exit,
}

/// Runs commands against the documents of one database directory.
///
/// Every command starts from a fresh load of the metadata document; mutating
/// commands write back the whole document they changed.
pub struct Executor {
    storage: StorageManager,
    selects: Cache<Vec<Record>>,
}

impl Executor {
    pub fn new(storage: StorageManager) -> Self {
        Self {
            storage,
            selects: Cache::new(),
        }
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn execute(&mut self, command: Command) -> Result<CommandResult, DbError> {
        if command.is_mutation() {
            self.selects.clear();
        }

        match command {
            Command::CreateTable { name, columns } => self.exec_create_table(name, &columns),
            Command::DropTable { name } => self.exec_drop_table(name),
            Command::ListTables => self.exec_list_tables(),
            Command::Info { name } => self.exec_info(&name),
            Command::Insert { table, values } => self.exec_insert(table, &values),
            Command::Select { table, filter } => self.exec_select(&table, filter.as_ref()),
            Command::Update { table, set, filter } => self.exec_update(table, &set, &filter),
            Command::Delete { table, filter } => self.exec_delete(table, &filter),
            Command::Help => Ok(CommandResult::Help),
            Command::Exit => Ok(CommandResult::Exit),
        }
    }

    fn exec_create_table(
        &mut self,
        name: String,
        columns: &[String],
    ) -> Result<CommandResult, DbError> {
        let mut metadata = self.storage.load_metadata()?;
        let schema = metadata.create_table(&name, columns)?.clone();
        self.storage.save_metadata(&metadata)?;

        Ok(CommandResult::Created {
            table: name,
            schema,
        })
    }

    /// The table's data document stays on disk.
    fn exec_drop_table(&mut self, name: String) -> Result<CommandResult, DbError> {
        let mut metadata = self.storage.load_metadata()?;
        metadata.drop_table(&name)?;
        self.storage.save_metadata(&metadata)?;

        Ok(CommandResult::Dropped { table: name })
    }

    fn exec_list_tables(&mut self) -> Result<CommandResult, DbError> {
        let metadata = self.storage.load_metadata()?;
        let tables = metadata.list_tables().map(str::to_string).collect();

        Ok(CommandResult::Tables(tables))
    }

    fn exec_info(&mut self, name: &str) -> Result<CommandResult, DbError> {
        let metadata = self.storage.load_metadata()?;
        metadata.find_table_by_name(name)?;
        let records = self.storage.load_table(name)?;

        Ok(CommandResult::Info(metadata.info(name, &records)?))
    }

    fn exec_insert(&mut self, table: String, values: &[String]) -> Result<CommandResult, DbError> {
        let metadata = self.storage.load_metadata()?;
        metadata.find_table_by_name(&table)?;

        let mut records = self.storage.load_table(&table)?;
        let id = table::insert(&metadata, &table, &mut records, values)?;
        self.storage.save_table(&table, &records)?;

        Ok(CommandResult::Inserted { table, id })
    }

    /// Results are cached per table and filter until the next mutation.
    fn exec_select(
        &mut self,
        table: &str,
        filter: Option<&Clause>,
    ) -> Result<CommandResult, DbError> {
        let metadata = self.storage.load_metadata()?;
        let schema = metadata.find_table_by_name(table)?.clone();

        let key = match filter {
            Some(clause) => format!("{} where {}", table, clause),
            None => table.to_string(),
        };
        let storage = &self.storage;
        let records = self
            .selects
            .get_or_try_insert_with(&key, || {
                let records = storage.load_table(table)?;
                Ok::<_, DbError>(table::select(&records, filter).into_iter().cloned().collect())
            })?
            .clone();

        Ok(CommandResult::Records { schema, records })
    }

    /// Records updated before a failure keep their changes and are saved.
    fn exec_update(
        &mut self,
        table: String,
        set: &[Clause],
        filter: &Clause,
    ) -> Result<CommandResult, DbError> {
        let metadata = self.storage.load_metadata()?;
        let schema = metadata.find_table_by_name(&table)?;

        let mut records = self.storage.load_table(&table)?;
        let before = records.clone();
        let outcome = table::update(&mut records, schema, set, filter);
        let changed = records != before;
        if changed {
            self.storage.save_table(&table, &records)?;
        }

        match outcome {
            Ok(updated) => {
                let ids = updated
                    .into_iter()
                    .filter_map(|index| records[index].id())
                    .collect();
                Ok(CommandResult::Updated { table, ids })
            }
            Err(e) => {
                if changed {
                    info!("Update of {} stopped part way: {}", table, e);
                }
                Err(e)
            }
        }
    }

    fn exec_delete(&mut self, table: String, filter: &Clause) -> Result<CommandResult, DbError> {
        let metadata = self.storage.load_metadata()?;
        metadata.find_table_by_name(&table)?;

        let mut records = self.storage.load_table(&table)?;
        let count = table::delete(&mut records, filter);
        if count > 0 {
            self.storage.save_table(&table, &records)?;
        }

        Ok(CommandResult::Deleted { table, count })
    }
}
