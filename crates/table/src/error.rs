use std::io;

use confstore::ConfError;
use schema::{ColumnType, SchemaError};
use symbols::SymbolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Conf(#[from] ConfError),
    /// Opening by name found no persisted column order.
    #[error("no such table {0:?}")]
    NoSuchTable(String),
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),
    #[error("no fixed-width encoding for {0} columns")]
    UnsupportedColumnType(ColumnType),
    #[error("invalid metadata for table {table:?}: {reason}")]
    InvalidMeta { table: String, reason: String },
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
    #[error("table {table:?} holds {rows} rows with columns [{on_disk}], cannot reopen as [{requested}]")]
    SchemaConflict {
        table: String,
        rows: u64,
        on_disk: String,
        requested: String,
    },
    #[error("row range {from}..{to} is out of bounds for {rows} rows")]
    RowRange { from: u64, to: u64, rows: u64 },
    #[error("no column {column:?} in table {table:?}")]
    NoSuchColumn { table: String, column: String },
    #[error("table {0:?} is already open by another writer")]
    Locked(String),
}
