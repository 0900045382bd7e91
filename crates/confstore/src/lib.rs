//! # Confstore
//!
//! A tiny section/key=value text store. The table engine keeps its `_meta`
//! sidecar in this format, and the store configuration file (`zdb.conf`)
//! uses it too.
//!
//! ## Format
//!
//! ```text
//! # comment
//! ; also a comment
//! [columns]
//! ts=TIMESTAMP
//! sym=SYMBOL
//!
//! [rows]
//! count=5
//! ```
//!
//! Lines are trimmed before parsing. Entries that appear before the first
//! `[section]` header belong to the `default` section. A line without `=` is
//! ignored. Keys and values are split at the first `=` and trimmed.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Section that receives entries written before any `[section]` header.
pub const DEFAULT_SECTION: &str = "default";

#[derive(Debug, Error)]
pub enum ConfError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("missing option [{section}] {key}")]
    Missing { section: String, key: String },
}

/// In-memory view of a section/key=value file, bound to its path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigStore {
    /// Binds a store to `path` and loads it. A missing file yields an empty
    /// store; it is created on the first [`persist`](ConfigStore::persist).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfError> {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            sections: BTreeMap::new(),
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the backing file, replacing everything held in memory.
    pub fn load(&mut self) -> Result<(), ConfError> {
        self.sections.clear();
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut section = DEFAULT_SECTION.to_string();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = match rest.find(']') {
                    Some(end) => &rest[..end],
                    None => rest,
                };
                section = name.trim().to_string();
                continue;
            }

            // no separator, not an option
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            self.sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), val.trim().to_string());
        }
        Ok(())
    }

    /// Writes every section back to disk.
    ///
    /// The text is written to `<path>.tmp` and renamed over the target so a
    /// reader never observes a half-written file.
    pub fn persist(&self) -> Result<(), ConfError> {
        self.persist_inner(false)
    }

    /// Same as [`persist`](ConfigStore::persist) but `fsync`s the file before
    /// the rename.
    pub fn persist_sync(&self) -> Result<(), ConfError> {
        self.persist_inner(true)
    }

    fn persist_inner(&self, sync: bool) -> Result<(), ConfError> {
        let tmp_path = tmp_path(&self.path);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut text = String::new();
        for (section, entries) in &self.sections {
            text.push('[');
            text.push_str(section);
            text.push_str("]\n");
            for (key, val) in entries {
                text.push_str(key);
                text.push('=');
                text.push_str(val);
                text.push('\n');
            }
            text.push('\n');
        }

        file.write_all(text.as_bytes())?;
        file.flush()?;
        if sync {
            file.sync_all()?;
        }
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }

    /// Returns the value for `key` in `section`, failing if either is absent.
    pub fn get(&self, section: &str, key: &str) -> Result<&str, ConfError> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
            .ok_or_else(|| ConfError::Missing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    pub fn get_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key)
            .map(str::to_string)
            .unwrap_or_else(|_| default.to_string())
    }

    /// Sets `key` in `section`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, val: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), val.into());
    }

    /// Removes a whole section. Returns `true` if it existed.
    pub fn clear_section(&mut self, section: &str) -> bool {
        self.sections.remove(section).is_some()
    }

    /// Iterates `(key, value)` pairs of `section` in key order.
    pub fn section(&self, section: &str) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|s| s.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    // -------------------- Parsing --------------------

    #[test]
    fn missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = ConfigStore::open(dir.path().join("nope.conf"))?;
        assert_eq!(store.section("default").count(), 0);
        assert!(store.get("rows", "count").is_err());
        Ok(())
    }

    #[test]
    fn parses_sections_comments_and_whitespace() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("zdb.conf");
        fs::write(
            &path,
            "top = level\n\
             # a comment\n\
             ; another comment\n\
             [ filesystem ]\n\
             \tpath =  /var/lib/zdb  \n\
             no separator here\n\
             \n\
             [columnOrder]\n\
             order=ts,sym,open\n",
        )?;

        let store = ConfigStore::open(&path)?;
        assert_eq!(store.get(DEFAULT_SECTION, "top")?, "level");
        assert_eq!(store.get("filesystem", "path")?, "/var/lib/zdb");
        assert_eq!(store.get("columnOrder", "order")?, "ts,sym,open");
        assert_eq!(store.section("filesystem").count(), 1);
        Ok(())
    }

    #[test]
    fn value_may_contain_equals() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("eq.conf");
        fs::write(&path, "[a]\nk=x=y\n")?;

        let store = ConfigStore::open(&path)?;
        assert_eq!(store.get("a", "k")?, "x=y");
        Ok(())
    }

    #[test]
    fn get_missing_names_section_and_key() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("m.conf")).unwrap();
        let err = store.get("columnOrder", "order").unwrap_err();
        match err {
            ConfError::Missing { section, key } => {
                assert_eq!(section, "columnOrder");
                assert_eq!(key, "order");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn get_or_falls_back() -> Result<()> {
        let dir = tempdir()?;
        let mut store = ConfigStore::open(dir.path().join("d.conf"))?;
        assert_eq!(store.get_or("rows", "count", "0"), "0");
        store.set("rows", "count", "12");
        assert_eq!(store.get_or("rows", "count", "0"), "12");
        Ok(())
    }

    // -------------------- Persist --------------------

    #[test]
    fn persist_and_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("_meta");

        let mut store = ConfigStore::open(&path)?;
        store.set("columns", "ts", "TIMESTAMP");
        store.set("columns", "open", "CURRENCY");
        store.set("rows", "count", "3");
        store.persist()?;

        assert!(!tmp_path(&path).exists(), "temp file must be renamed away");

        let reopened = ConfigStore::open(&path)?;
        assert_eq!(reopened.get("columns", "open")?, "CURRENCY");
        assert_eq!(reopened.get("rows", "count")?, "3");

        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("[columns]\nopen=CURRENCY\nts=TIMESTAMP\n\n"));
        Ok(())
    }

    #[test]
    fn load_discards_unpersisted_changes() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("r.conf");

        let mut store = ConfigStore::open(&path)?;
        store.set("rows", "count", "1");
        store.persist_sync()?;
        store.set("rows", "count", "99");
        store.load()?;
        assert_eq!(store.get("rows", "count")?, "1");
        Ok(())
    }

    #[test]
    fn clear_section_removes_entries() -> Result<()> {
        let dir = tempdir()?;
        let mut store = ConfigStore::open(dir.path().join("c.conf"))?;
        store.set("columns", "a", "INT32");
        assert!(store.clear_section("columns"));
        assert!(!store.clear_section("columns"));
        assert_eq!(store.section("columns").count(), 0);
        Ok(())
    }
}
