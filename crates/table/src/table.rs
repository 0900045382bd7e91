use std::borrow::Borrow;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

use fs2::FileExt;
use schema::{Row, RowLiteral, Schema, SchemaError, Value, TIMESTAMP_COLUMN};
use symbols::Dictionary;
use tracing::{debug, dispatcher, error, info, warn, Dispatch};

use crate::config::StoreConfig;
use crate::error::TableError;
use crate::layout::TableLayout;
use crate::meta::TableMeta;
use crate::reader::ColumnReader;
use crate::writer::ColumnWriter;

/// Construction options for [`Table`].
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Where the table's log events go. Defaults to the dispatcher that is
    /// current when the table is constructed.
    pub dispatch: Option<Dispatch>,
}

impl TableOptions {
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }
}

/// A buffered row that [`Table::flush`] left out because it does not fit
/// the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Index of the row in the buffer, in write order.
    pub position: usize,
    pub row: Row,
    pub error: SchemaError,
}

/// Outcome of one [`Table::flush`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushSummary {
    pub rows_written: usize,
    pub skipped: Vec<SkippedRow>,
}

impl FlushSummary {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A columnar table of timestamped rows.
///
/// # Write Path
///
/// 1. [`write`](Table::write) and friends append to an in-memory buffer.
/// 2. [`flush`](Table::flush) drops rows that do not fit the schema,
///    stable-sorts the rest by timestamp and appends them column by column.
/// 3. The symbol dictionary is rewritten, then the row count is bumped and
///    `_meta` persisted.
///
/// # Read Path
///
/// [`read`](Table::read) seeks every column file to the first requested row
/// and decodes `to - from` cells from each. Only flushed rows are visible.
///
/// # Logging
///
/// Every event is emitted through the [`Dispatch`] captured at construction,
/// so one table's log output can be routed independently of the process-wide
/// subscriber.
#[derive(Debug)]
pub struct Table {
    schema: Schema,
    layout: TableLayout,
    meta: TableMeta,
    dictionary: Dictionary,
    buffer: Vec<Row>,
    rows: u64,
    sync: bool,
    dispatch: Dispatch,
    _lock: File,
}

impl Table {
    /// Opens the table described by `schema`, creating it if needed.
    ///
    /// An existing directory is resumed: its dictionary and row count are
    /// loaded. The schema is written to `_meta` right away.
    ///
    /// # Errors
    ///
    /// [`TableError::SchemaConflict`] if rows already exist under a different
    /// column layout, [`TableError::Locked`] if another [`Table`] holds the
    /// directory.
    pub fn create(config: &StoreConfig, schema: Schema) -> Result<Self, TableError> {
        Self::create_with(config, schema, TableOptions::default())
    }

    pub fn create_with(
        config: &StoreConfig,
        schema: Schema,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        let dispatch = resolve_dispatch(options.dispatch);
        let scope = dispatch.clone();
        dispatcher::with_default(&scope, move || {
            let layout = TableLayout::new(config.table_dir(schema.name())?);
            fs::create_dir_all(layout.dir())?;
            let lock = acquire_lock(&layout, schema.name())?;

            let mut meta = TableMeta::open(layout.meta_path(), schema.name())?;
            let rows = meta.row_count()?;
            if rows > 0 && meta.has_schema() {
                let on_disk = meta.schema()?;
                if on_disk.columns() != schema.columns() {
                    error!(
                        table = schema.name(),
                        rows,
                        on_disk = %on_disk.column_order(),
                        requested = %schema.column_order(),
                        "schema does not match stored columns"
                    );
                    return Err(TableError::SchemaConflict {
                        table: schema.name().to_string(),
                        rows,
                        on_disk: describe(&on_disk),
                        requested: describe(&schema),
                    });
                }
            }
            meta.set_schema(&schema);
            meta.persist(config.sync)?;

            let dictionary = Dictionary::load(layout.symbols_path())?;
            info!(
                table = schema.name(),
                rows,
                symbols = dictionary.len(),
                columns = %schema.column_order(),
                "opened table by schema"
            );

            Ok(Self {
                schema,
                layout,
                meta,
                dictionary,
                buffer: Vec::new(),
                rows,
                sync: config.sync,
                dispatch,
                _lock: lock,
            })
        })
    }

    /// Opens an existing table, rebuilding its schema from `_meta`.
    ///
    /// # Errors
    ///
    /// [`TableError::NoSuchTable`] if the table was never created.
    pub fn open(config: &StoreConfig, name: &str) -> Result<Self, TableError> {
        Self::open_with(config, name, TableOptions::default())
    }

    pub fn open_with(
        config: &StoreConfig,
        name: &str,
        options: TableOptions,
    ) -> Result<Self, TableError> {
        let dispatch = resolve_dispatch(options.dispatch);
        let scope = dispatch.clone();
        dispatcher::with_default(&scope, move || {
            let layout = TableLayout::new(config.table_dir(name)?);
            // checked first so a failed open leaves nothing behind
            if !layout.meta_path().is_file() {
                error!(table = name, dir = ?layout.dir(), "no such table");
                return Err(TableError::NoSuchTable(name.to_string()));
            }
            let lock = acquire_lock(&layout, name)?;

            let meta = TableMeta::open(layout.meta_path(), name)?;
            let schema = meta.schema().map_err(|e| {
                error!(table = name, error = %e, "cannot load table schema");
                e
            })?;
            let rows = meta.row_count()?;
            let dictionary = Dictionary::load(layout.symbols_path())?;
            info!(
                table = name,
                rows,
                symbols = dictionary.len(),
                columns = %schema.column_order(),
                "opened table by name"
            );

            Ok(Self {
                schema,
                layout,
                meta,
                dictionary,
                buffer: Vec::new(),
                rows,
                sync: config.sync,
                dispatch,
                _lock: lock,
            })
        })
    }

    fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    // ---------------------- Write path ----------------------

    /// Buffers one row. Nothing reaches disk until [`flush`](Table::flush).
    pub fn write(&mut self, row: Row) {
        self.buffer.push(row);
    }

    pub fn write_all<I: IntoIterator<Item = Row>>(&mut self, rows: I) {
        self.buffer.extend(rows);
    }

    /// Coerces `literal` against the schema and buffers the result.
    pub fn write_literal(&mut self, literal: &RowLiteral) -> Result<(), TableError> {
        let row = self.in_scope(|| Row::from_literal(literal, &self.schema))?;
        self.buffer.push(row);
        Ok(())
    }

    /// Like [`write_literal`](Table::write_literal) for many rows. If any
    /// literal fails, none of them are buffered.
    pub fn write_literals<I>(&mut self, literals: I) -> Result<(), TableError>
    where
        I: IntoIterator,
        I::Item: Borrow<RowLiteral>,
    {
        let rows = self.in_scope(|| {
            literals
                .into_iter()
                .map(|lit| Row::from_literal(lit.borrow(), &self.schema))
                .collect::<Result<Vec<_>, _>>()
        })?;
        self.buffer.extend(rows);
        Ok(())
    }

    /// Writes the buffer to the column files.
    ///
    /// Rows that do not fit the schema are logged, left out and returned in
    /// [`FlushSummary::skipped`]; the remaining rows are stable-sorted by
    /// timestamp before being appended. An empty buffer is a no-op.
    ///
    /// On an I/O error the buffer keeps every row it held, the skipped ones
    /// included, and column files may already hold part of the valid ones.
    pub fn flush(&mut self) -> Result<FlushSummary, TableError> {
        let scope = self.dispatch.clone();
        dispatcher::with_default(&scope, || self.flush_buffer())
    }

    fn flush_buffer(&mut self) -> Result<FlushSummary, TableError> {
        let mut summary = FlushSummary::default();
        if self.buffer.is_empty() {
            debug!(table = self.schema.name(), "nothing to flush");
            return Ok(summary);
        }

        for (position, row) in std::mem::take(&mut self.buffer).into_iter().enumerate() {
            match row.validate(&self.schema) {
                Ok(()) => self.buffer.push(row),
                Err(error) => {
                    warn!(
                        table = self.schema.name(),
                        position,
                        ts = row.timestamp(),
                        %error,
                        "skipping row"
                    );
                    summary.skipped.push(SkippedRow {
                        position,
                        row,
                        error,
                    });
                }
            }
        }
        if self.buffer.is_empty() {
            return Ok(summary);
        }

        // stable: equal timestamps keep write order
        self.buffer.sort_by(Row::cmp_by_timestamp);

        if let Err(e) = self.append_buffer() {
            error!(
                table = self.schema.name(),
                buffered = self.buffer.len(),
                skipped = summary.skipped.len(),
                error = %e,
                "flush failed"
            );
            self.buffer
                .extend(summary.skipped.into_iter().map(|skipped| skipped.row));
            return Err(e);
        }

        let written = self.buffer.len();
        self.buffer.clear();
        info!(
            table = self.schema.name(),
            written,
            bytes = written * self.schema.row_width(),
            skipped = summary.skipped.len(),
            rows = self.rows,
            "flushed"
        );
        summary.rows_written = written;
        Ok(summary)
    }

    /// Appends the validated, sorted buffer and commits the new row count.
    fn append_buffer(&mut self) -> Result<(), TableError> {
        for (i, column) in self.schema.columns().iter().enumerate() {
            let mut writer = ColumnWriter::open(&self.layout.column_path(column), column)?;
            for row in &self.buffer {
                writer.append(&row.values()[i], &mut self.dictionary)?;
            }
            writer.finish(self.sync)?;
        }

        let symbols_path = self.layout.symbols_path();
        if self.sync {
            self.dictionary.persist_sync(symbols_path)?;
        } else {
            self.dictionary.persist(symbols_path)?;
        }

        self.meta.set_row_count(self.rows + self.buffer.len() as u64);
        self.meta.persist(self.sync)?;
        self.rows += self.buffer.len() as u64;
        Ok(())
    }

    // ---------------------- Read path ----------------------

    /// Reads flushed rows `from..to`.
    ///
    /// # Errors
    ///
    /// [`TableError::RowRange`] unless `from <= to <= row_count()`.
    pub fn read(&self, from: u64, to: u64) -> Result<Vec<Row>, TableError> {
        self.in_scope(|| self.read_rows(&self.schema, from, to))
    }

    /// Every flushed row.
    pub fn read_all(&self) -> Result<Vec<Row>, TableError> {
        self.read(0, self.rows)
    }

    /// Reads cells `from..to` of a single column, touching only its file.
    pub fn read_column(&self, name: &str, from: u64, to: u64) -> Result<Vec<Value>, TableError> {
        self.in_scope(|| {
            let column = self
                .schema
                .column(name)
                .ok_or_else(|| TableError::NoSuchColumn {
                    table: self.schema.name().to_string(),
                    column: name.to_string(),
                })?;
            self.check_range(from, to)?;
            if from == to {
                return Ok(Vec::new());
            }

            let mut reader = ColumnReader::open(&self.layout.column_path(column), column.ty, from)?;
            let cells = (from..to)
                .map(|_| reader.next_cell(&self.dictionary))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(table = self.schema.name(), column = name, from, to, "read column");
            Ok(cells)
        })
    }

    /// Schema of the rows [`read_columns`](Table::read_columns) returns for
    /// `names`: `ts` followed by the named columns in the order given.
    ///
    /// `ts` may be listed but is never repeated.
    ///
    /// # Errors
    ///
    /// [`TableError::NoSuchColumn`] for a name the table does not have.
    pub fn projection(&self, names: &[&str]) -> Result<Schema, TableError> {
        let mut projected = Schema::new(self.schema.name());
        for &name in names.iter().filter(|&&n| n != TIMESTAMP_COLUMN) {
            let column = self.schema.column(name).ok_or_else(|| TableError::NoSuchColumn {
                table: self.schema.name().to_string(),
                column: name.to_string(),
            })?;
            projected.add_column(column.clone())?;
        }
        Ok(projected)
    }

    /// Reads rows `from..to` holding only `ts` and the named columns.
    ///
    /// Only the files of those columns are opened. The returned rows fit
    /// [`projection(names)`](Table::projection).
    pub fn read_columns(&self, names: &[&str], from: u64, to: u64) -> Result<Vec<Row>, TableError> {
        self.in_scope(|| {
            let projected = self.projection(names)?;
            self.read_rows(&projected, from, to)
        })
    }

    fn check_range(&self, from: u64, to: u64) -> Result<(), TableError> {
        if from > to || to > self.rows {
            return Err(TableError::RowRange {
                from,
                to,
                rows: self.rows,
            });
        }
        Ok(())
    }

    /// Reads `from..to` from the columns of `schema`, whose first column is `ts`.
    fn read_rows(&self, schema: &Schema, from: u64, to: u64) -> Result<Vec<Row>, TableError> {
        self.check_range(from, to)?;
        let count = (to - from) as usize;
        let mut rows = Vec::with_capacity(count);
        if count == 0 {
            return Ok(rows);
        }

        let mut readers = schema
            .columns()
            .iter()
            .map(|c| ColumnReader::open(&self.layout.column_path(c), c.ty, from))
            .collect::<Result<Vec<_>, _>>()?;

        let (ts, cells) = readers.split_at_mut(1);
        for _ in 0..count {
            let mut row = Row::new(ts[0].next_timestamp()?);
            for reader in cells.iter_mut() {
                row.push(reader.next_cell(&self.dictionary)?);
            }
            rows.push(row);
        }
        debug!(
            table = self.schema.name(),
            columns = %schema.column_order(),
            from,
            to,
            "read rows"
        );
        Ok(rows)
    }

    // ---------------------- Accessors ----------------------

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn dir(&self) -> &Path {
        self.layout.dir()
    }

    /// Rows on disk; buffered rows are not counted.
    pub fn row_count(&self) -> u64 {
        self.rows
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Rows waiting for the next flush.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

fn resolve_dispatch(dispatch: Option<Dispatch>) -> Dispatch {
    dispatch.unwrap_or_else(|| dispatcher::get_default(Dispatch::clone))
}

fn acquire_lock(layout: &TableLayout, table: &str) -> Result<File, TableError> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(layout.lock_path())?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
            error!(table, dir = ?layout.dir(), "table is locked by another writer");
            Err(TableError::Locked(table.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn describe(schema: &Schema) -> String {
    schema
        .columns()
        .iter()
        .map(|c| format!("{}:{}", c.name, c.ty))
        .collect::<Vec<_>>()
        .join(",")
}
