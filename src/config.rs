use std::path::PathBuf;

use log::LevelFilter;

use crate::storage::{StorageManager, DEFAULT_DATA_DIR, DEFAULT_META_FILE};

/// Runtime settings, resolved from the command line by the binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub meta_file: PathBuf,
    pub data_dir: PathBuf,
    /// Skip the confirmation prompt of destructive commands.
    pub assume_yes: bool,
    /// Print elapsed time after `insert` and `select`.
    pub show_timing: bool,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta_file: PathBuf::from(DEFAULT_META_FILE),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            assume_yes: false,
            show_timing: true,
            log_level: LevelFilter::Warn,
        }
    }
}

impl Config {
    pub fn storage(&self) -> StorageManager {
        StorageManager::new(&self.meta_file, &self.data_dir)
    }
}
