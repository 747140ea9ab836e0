use std::path::{Path, PathBuf};

use crate::constants::{DATA_DIR_NAME, STORAGE_KEY};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory the file-backed key-value store writes into
    pub data_dir: PathBuf,
    /// Key the document is stored under
    pub storage_key: String,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(DATA_DIR_NAME))
    }
}
