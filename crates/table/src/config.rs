use std::path::{Path, PathBuf};

use confstore::ConfigStore;

use crate::error::TableError;

const FILESYSTEM: &str = "filesystem";

/// Where tables live and how hard flushes push data to disk.
///
/// Built explicitly and handed to every [`Table`](crate::Table) constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage root; tables go to `<root>/data/<name>`.
    pub root: PathBuf,
    /// `fsync` column files, `_symbols` and `_meta` at the end of each flush.
    pub sync: bool,
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            sync: false,
        }
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Reads `[filesystem] path` and `[filesystem] sync` from a config file.
    ///
    /// A missing file or option falls back to the current directory and
    /// `sync = false`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let store = ConfigStore::open(path)?;
        let root = match store.get(FILESYSTEM, "path") {
            Ok(p) => PathBuf::from(p),
            Err(_) => std::env::current_dir()?,
        };
        let sync = match store.get_or(FILESYSTEM, "sync", "false").as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(TableError::InvalidConfig(format!(
                    "[{FILESYSTEM}] sync must be true or false, got {other:?}"
                )))
            }
        };
        Ok(Self { root, sync })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// `<root>/data/<name>`. The name must be a single plain path component
    /// so the table stays under the data directory.
    pub fn table_dir(&self, name: &str) -> Result<PathBuf, TableError> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(TableError::InvalidTableName(name.to_string()));
        }
        Ok(self.data_dir().join(name))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
