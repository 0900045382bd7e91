use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use schema::{ColumnType, Value};
use symbols::Dictionary;

use crate::codec::decode_cell;
use crate::error::TableError;

/// Sequential cell reader over one column file.
pub(crate) struct ColumnReader {
    ty: ColumnType,
    input: BufReader<File>,
}

impl ColumnReader {
    /// Opens the column file positioned at row `first_row`.
    pub fn open(path: &Path, ty: ColumnType, first_row: u64) -> Result<Self, TableError> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(first_row * ty.width() as u64))?;
        Ok(Self {
            ty,
            input: BufReader::new(file),
        })
    }

    /// Reads a raw `ts` cell without going through [`Value`].
    pub fn next_timestamp(&mut self) -> Result<i64, TableError> {
        Ok(self.input.read_i64::<LittleEndian>()?)
    }

    pub fn next_cell(&mut self, dict: &Dictionary) -> Result<Value, TableError> {
        decode_cell(&mut self.input, self.ty, dict)
    }
}
