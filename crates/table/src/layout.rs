//! On-disk names inside a table directory.
//!
//! ```text
//! <root>/data/<table>/_meta
//! <root>/data/<table>/_symbols
//! <root>/data/<table>/_lock
//! <root>/data/<table>/<column>.<lower-cased type>
//! ```

use std::path::{Path, PathBuf};

use schema::Column;

/// Section/key=value metadata file.
pub const META_FILE: &str = "_meta";

/// Newline-delimited symbol dictionary.
pub const SYMBOLS_FILE: &str = "_symbols";

/// Lock file guarding the single writer.
pub const LOCK_FILE: &str = "_lock";

/// `open` of type `Currency` is stored in `open.currency`.
pub fn column_file_name(column: &Column) -> String {
    format!("{}.{}", column.name, column.ty.extension())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    dir: PathBuf,
}

impl TableLayout {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    pub fn symbols_path(&self) -> PathBuf {
        self.dir.join(SYMBOLS_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    pub fn column_path(&self, column: &Column) -> PathBuf {
        self.dir.join(column_file_name(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::ColumnType;

    #[test]
    fn column_files_use_lowercase_type() {
        let layout = TableLayout::new("/db/data/agg1d");
        let open = Column::new("open", ColumnType::Currency);
        let vol = Column::new("volume", ColumnType::Uint64);
        assert_eq!(column_file_name(&open), "open.currency");
        assert_eq!(
            layout.column_path(&vol),
            PathBuf::from("/db/data/agg1d/volume.uint64")
        );
    }

    #[test]
    fn sidecars() {
        let layout = TableLayout::new("/db/data/t");
        assert_eq!(layout.meta_path(), PathBuf::from("/db/data/t/_meta"));
        assert_eq!(layout.symbols_path(), PathBuf::from("/db/data/t/_symbols"));
        assert_eq!(layout.lock_path(), PathBuf::from("/db/data/t/_lock"));
        assert_eq!(layout.dir(), Path::new("/db/data/t"));
    }
}
