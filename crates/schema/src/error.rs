use thiserror::Error;

use crate::types::ColumnType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A type name that is not one of the known [`ColumnType`] names.
    #[error("invalid column type {0:?}")]
    InvalidColumnType(String),
    /// A column name `_meta` and the column file names cannot hold.
    #[error("invalid column name {name:?}: {reason}")]
    InvalidColumnName { name: String, reason: &'static str },
    #[error("column {0:?} already exists")]
    DuplicateColumn(String),
    #[error("symbol {symbol:?} must be {limit} or less bytes long")]
    SymbolTooLong { symbol: String, limit: usize },
    #[error("symbol {0:?} contains a line break or NUL")]
    InvalidSymbol(String),
    #[error("column {column:?} has type {expected}, got {found}")]
    ColumnTypeMismatch {
        column: String,
        expected: ColumnType,
        found: &'static str,
    },
    #[error("row has {found} values but schema {schema:?} has {expected} columns")]
    ColumnCountMismatch {
        schema: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
}
