use std::path::Path;

use confstore::ConfigStore;
use schema::{ColumnType, Schema, TIMESTAMP_COLUMN};
use tracing::debug;

use crate::error::TableError;

const COLUMNS: &str = "columns";
const ROWS: &str = "rows";
const COUNT: &str = "count";
const COLUMN_ORDER: &str = "columnOrder";
const ORDER: &str = "order";

/// The `_meta` file of one table.
///
/// ```text
/// [columns]
/// ts=TIMESTAMP
/// sym=SYMBOL
/// [columnOrder]
/// order=ts,sym
/// [rows]
/// count=42
/// ```
#[derive(Debug)]
pub(crate) struct TableMeta {
    store: ConfigStore,
    table: String,
}

impl TableMeta {
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self, TableError> {
        Ok(Self {
            store: ConfigStore::open(path)?,
            table: table.to_string(),
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> TableError {
        TableError::InvalidMeta {
            table: self.table.clone(),
            reason: reason.into(),
        }
    }

    pub fn row_count(&self) -> Result<u64, TableError> {
        let raw = self.store.get_or(ROWS, COUNT, "0");
        raw.trim()
            .parse()
            .map_err(|_| self.invalid(format!("row count {raw:?} is not a number")))
    }

    pub fn set_row_count(&mut self, rows: u64) {
        self.store.set(ROWS, COUNT, rows.to_string());
    }

    pub fn has_schema(&self) -> bool {
        self.store.get(COLUMN_ORDER, ORDER).is_ok()
    }

    /// Rebuilds the schema from `columnOrder` and `columns`.
    pub fn schema(&self) -> Result<Schema, TableError> {
        let order = self
            .store
            .get(COLUMN_ORDER, ORDER)
            .map_err(|_| TableError::NoSuchTable(self.table.clone()))?;

        let mut names = order.split(',').map(str::trim);
        if names.next() != Some(TIMESTAMP_COLUMN) {
            return Err(self.invalid(format!(
                "column order {order:?} does not start with {TIMESTAMP_COLUMN}"
            )));
        }

        let mut schema = Schema::new(self.table.as_str());
        let ts_ty = self.column_type(TIMESTAMP_COLUMN)?;
        if ts_ty != ColumnType::Timestamp {
            return Err(self.invalid(format!("{TIMESTAMP_COLUMN} is declared as {ts_ty}")));
        }
        for name in names {
            let ty = self.column_type(name)?;
            schema.add(name, ty)?;
        }
        Ok(schema)
    }

    fn column_type(&self, name: &str) -> Result<ColumnType, TableError> {
        let raw = self
            .store
            .get(COLUMNS, name)
            .map_err(|_| self.invalid(format!("column {name:?} has no type")))?;
        Ok(raw.parse()?)
    }

    /// Replaces the `columns` and `columnOrder` sections with `schema`.
    pub fn set_schema(&mut self, schema: &Schema) {
        self.store.clear_section(COLUMNS);
        for column in schema.columns() {
            self.store.set(COLUMNS, column.name.as_str(), column.ty.name());
        }
        self.store.set(COLUMN_ORDER, ORDER, schema.column_order());
    }

    pub fn persist(&self, sync: bool) -> Result<(), TableError> {
        if sync {
            self.store.persist_sync()?;
        } else {
            self.store.persist()?;
        }
        debug!(table = %self.table, path = ?self.store.path(), sync, "persisted table metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use schema::SchemaError;
    use std::fs;
    use tempfile::tempdir;

    fn agg1d() -> Schema {
        Schema::with_columns(
            "agg1d",
            [
                ("sym", ColumnType::Symbol),
                ("open", ColumnType::Currency),
                ("volume", ColumnType::Uint64),
            ],
        )
        .unwrap()
    }

    #[test]
    fn schema_and_count_survive_reload() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("_meta");

        let mut meta = TableMeta::open(&path, "agg1d")?;
        assert!(!meta.has_schema());
        assert_eq!(meta.row_count()?, 0);
        meta.set_schema(&agg1d());
        meta.set_row_count(5);
        meta.persist(false)?;

        let text = fs::read_to_string(&path)?;
        assert!(text.contains("order=ts,sym,open,volume"));
        assert!(text.contains("CURRENCY"));

        let meta = TableMeta::open(&path, "agg1d")?;
        assert_eq!(meta.schema()?, agg1d());
        assert_eq!(meta.row_count()?, 5);
        Ok(())
    }

    #[test]
    fn missing_order_is_no_such_table() -> Result<()> {
        let dir = tempdir()?;
        let meta = TableMeta::open(dir.path().join("_meta"), "ghost")?;
        match meta.schema() {
            Err(TableError::NoSuchTable(name)) => assert_eq!(name, "ghost"),
            other => panic!("unexpected: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn order_must_lead_with_ts() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("_meta");
        fs::write(&path, "[columns]\nsym=SYMBOL\nts=TIMESTAMP\n[columnOrder]\norder=sym,ts\n")?;
        let meta = TableMeta::open(&path, "t")?;
        assert!(matches!(meta.schema(), Err(TableError::InvalidMeta { .. })));
        Ok(())
    }

    #[test]
    fn undeclared_column_is_invalid() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("_meta");
        fs::write(&path, "[columns]\nts=TIMESTAMP\n[columnOrder]\norder=ts,px\n")?;
        let meta = TableMeta::open(&path, "t")?;
        assert!(matches!(meta.schema(), Err(TableError::InvalidMeta { .. })));
        Ok(())
    }

    #[test]
    fn unknown_type_name_surfaces() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("_meta");
        fs::write(&path, "[columns]\nts=TIMESTAMP\npx=DECIMAL\n[columnOrder]\norder=ts,px\n")?;
        let meta = TableMeta::open(&path, "t")?;
        match meta.schema() {
            Err(TableError::Schema(SchemaError::InvalidColumnType(name))) => {
                assert_eq!(name, "DECIMAL")
            }
            other => panic!("unexpected: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn bad_row_count() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("_meta");
        fs::write(&path, "[rows]\ncount=lots\n")?;
        let meta = TableMeta::open(&path, "t")?;
        assert!(matches!(meta.row_count(), Err(TableError::InvalidMeta { .. })));
        Ok(())
    }
}
