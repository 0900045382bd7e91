use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use schema::{Column, ColumnType, SchemaError, Value};
use symbols::Dictionary;

use crate::codec::{encode_fixed, encode_symbol};
use crate::error::TableError;

/// Appends cells to one column file.
pub(crate) struct ColumnWriter {
    column: Column,
    out: BufWriter<File>,
}

impl ColumnWriter {
    /// Opens (creating if needed) the column file for appending.
    pub fn open(path: &Path, column: &Column) -> Result<Self, TableError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            column: column.clone(),
            out: BufWriter::new(file),
        })
    }

    /// Encodes `value`; symbols are interned into `dict` first.
    pub fn append(&mut self, value: &Value, dict: &mut Dictionary) -> Result<(), TableError> {
        if self.column.ty != ColumnType::Symbol {
            return encode_fixed(&mut self.out, &self.column, value);
        }
        match value {
            Value::Symbol(s) => encode_symbol(&mut self.out, dict.intern(s.as_str())),
            other => Err(SchemaError::ColumnTypeMismatch {
                column: self.column.name.clone(),
                expected: ColumnType::Symbol,
                found: other.kind_name(),
            }
            .into()),
        }
    }

    pub fn finish(mut self, sync: bool) -> Result<(), TableError> {
        self.out.flush()?;
        if sync {
            self.out.get_ref().sync_all()?;
        }
        Ok(())
    }
}
