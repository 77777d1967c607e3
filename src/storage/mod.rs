use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;

use crate::{
    catalog::defs::Metadata,
    core::{DbError, ErrorKind, Record},
};

pub const DEFAULT_META_FILE: &str = "db_meta.json";
pub const DEFAULT_DATA_DIR: &str = "data";

/// Locates and reads/writes the JSON documents backing a database: one
/// metadata document, plus one data document per table.
#[derive(Debug, Clone)]
pub struct StorageManager {
    meta_path: PathBuf,
    data_dir: PathBuf,
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new(DEFAULT_META_FILE, DEFAULT_DATA_DIR)
    }
}

impl StorageManager {
    pub fn new(meta_path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            meta_path: meta_path.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `<data_dir>/<table>.json`
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", table_name))
    }

    pub fn load_metadata(&self) -> Result<Metadata, DbError> {
        load_document(&self.meta_path)
    }

    pub fn save_metadata(&self, metadata: &Metadata) -> Result<(), DbError> {
        save_document(&self.meta_path, metadata)
    }

    /// Records of a table. A table that never had an insert has no document
    /// yet and loads as empty.
    pub fn load_table(&self, table_name: &str) -> Result<Vec<Record>, DbError> {
        load_document(&self.table_path(table_name))
    }

    pub fn save_table(&self, table_name: &str, records: &[Record]) -> Result<(), DbError> {
        save_document(&self.table_path(table_name), &records)
    }
}

/// Read a JSON document, degrading to `T::default()` when the file is
/// missing or does not parse.
pub fn load_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, DbError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist yet, starting empty", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&text) {
        Ok(document) => Ok(document),
        Err(e) => {
            let err = DbError::from(e);
            if err.kind != ErrorKind::Corruption {
                return Err(err);
            }
            warn!(
                "{} is corrupted ({}), starting empty",
                path.display(),
                err.message
            );
            Ok(T::default())
        }
    }
}

/// Replace the document at `path` in one step: the JSON is written to a
/// temporary file next to it, which is then renamed over the target.
pub fn save_document<T: Serialize + ?Sized>(path: &Path, document: &T) -> Result<(), DbError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file());
        let mut serializer =
            Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut serializer)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    file.persist(path).map_err(|e| DbError::from(e.error))?;

    debug!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::core::Datum;

    fn storage(dir: &Path) -> StorageManager {
        StorageManager::new(dir.join("db_meta.json"), dir.join("data"))
    }

    #[test]
    fn missing_documents_load_empty() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path());

        assert_eq!(storage.load_metadata().unwrap(), Metadata::default());
        assert!(storage.load_table("users").unwrap().is_empty());
    }

    #[test]
    fn corrupted_documents_load_empty() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path());

        fs::write(storage.meta_path(), "{\"users\": ").unwrap();
        assert_eq!(storage.load_metadata().unwrap(), Metadata::default());

        fs::create_dir_all(storage.data_dir()).unwrap();
        fs::write(storage.table_path("users"), "[{\"ID\": 1.5}]").unwrap();
        assert!(storage.load_table("users").unwrap().is_empty());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory where the metadata file should be.
        let storage = StorageManager::new(dir.path(), dir.path().join("data"));
        let err = storage.load_metadata().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn metadata_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path());

        let mut metadata = Metadata::new();
        metadata.create_table("users", &["name:str", "age:int"]).unwrap();
        metadata.create_table("tags", &["label:str"]).unwrap();
        storage.save_metadata(&metadata).unwrap();

        assert_eq!(storage.load_metadata().unwrap(), metadata);
    }

    #[test]
    fn table_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path());

        let records = (1..=3)
            .map(|id| {
                [
                    ("ID", Datum::Int(id)),
                    ("name", Datum::from(format!("user {}", id).as_str())),
                    ("active", Datum::Bool(id % 2 == 0)),
                ]
                .into_iter()
                .collect::<Record>()
            })
            .collect::<Vec<_>>();

        storage.save_table("users", &records).unwrap();
        assert!(storage.table_path("users").exists());
        assert_eq!(storage.load_table("users").unwrap(), records);
    }

    #[test]
    fn documents_are_pretty_printed() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path());

        let records = vec![Record::with_id(1)];
        storage.save_table("t", &records).unwrap();

        let text = fs::read_to_string(storage.table_path("t")).unwrap();
        assert_eq!(text, "[\n    {\n        \"ID\": 1\n    }\n]\n");
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path());

        storage
            .save_table("t", &[Record::with_id(1), Record::with_id(2)])
            .unwrap();
        storage.save_table("t", &[]).unwrap();
        assert!(storage.load_table("t").unwrap().is_empty());

        let leftovers = fs::read_dir(storage.data_dir()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
