use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// The storable column types.
///
/// Every type has a fixed encoded width. `Symbol` is exchanged as text in
/// memory but stored as a 4-byte dictionary code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Nanoseconds since the Unix epoch.
    Timestamp,
    /// Decimal amount stored as `f32`, read back as integer micro-cents.
    Currency,
    Symbol,
    Int32,
    /// Good for up to 4.29B volume.
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
}

impl ColumnType {
    pub const ALL: [ColumnType; 9] = [
        ColumnType::Timestamp,
        ColumnType::Currency,
        ColumnType::Symbol,
        ColumnType::Int32,
        ColumnType::Uint32,
        ColumnType::Int64,
        ColumnType::Uint64,
        ColumnType::Float32,
        ColumnType::Float64,
    ];

    /// Encoded size of one cell in bytes.
    pub const fn width(self) -> usize {
        match self {
            ColumnType::Int64 | ColumnType::Uint64 | ColumnType::Timestamp | ColumnType::Float64 => 8,
            ColumnType::Int32
            | ColumnType::Uint32
            | ColumnType::Float32
            | ColumnType::Currency
            | ColumnType::Symbol => 4,
        }
    }

    /// Name used in table metadata.
    pub const fn name(self) -> &'static str {
        match self {
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Currency => "CURRENCY",
            ColumnType::Symbol => "SYMBOL",
            ColumnType::Int32 => "INT32",
            ColumnType::Uint32 => "UINT32",
            ColumnType::Int64 => "INT64",
            ColumnType::Uint64 => "UINT64",
            ColumnType::Float32 => "FLOAT32",
            ColumnType::Float64 => "FLOAT64",
        }
    }

    /// Lower-cased name, used as the column file extension (`open.currency`).
    pub const fn extension(self) -> &'static str {
        match self {
            ColumnType::Timestamp => "timestamp",
            ColumnType::Currency => "currency",
            ColumnType::Symbol => "symbol",
            ColumnType::Int32 => "int32",
            ColumnType::Uint32 => "uint32",
            ColumnType::Int64 => "int64",
            ColumnType::Uint64 => "uint64",
            ColumnType::Float32 => "float32",
            ColumnType::Float64 => "float64",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a type name case-insensitively. Unknown names usually mean a
/// corrupted or hand-edited `_meta` file.
impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ColumnType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::InvalidColumnType(s.to_string()))
    }
}
