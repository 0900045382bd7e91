use std::fmt;

use tracing::warn;

use crate::error::SchemaError;
use crate::types::ColumnType;

/// Maximum number of bytes of symbol text (an 8-byte cell minus a terminator).
pub const SYMBOL_CAPACITY: usize = 7;

/// Micro-cents per currency unit.
const MICROS: f32 = 1_000_000.0;

/// Short interned string stored in a `Symbol` column.
///
/// Holds at most [`SYMBOL_CAPACITY`] bytes and never a line break or NUL,
/// since the dictionary file is line oriented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(text: impl Into<String>) -> Result<Self, SchemaError> {
        let text = text.into();
        if text.len() > SYMBOL_CAPACITY {
            warn!(symbol = %text, limit = SYMBOL_CAPACITY, "symbol too long");
            return Err(SchemaError::SymbolTooLong {
                symbol: text,
                limit: SYMBOL_CAPACITY,
            });
        }
        if text.contains(['\n', '\r', '\0']) {
            return Err(SchemaError::InvalidSymbol(text));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Symbol {
    type Error = SchemaError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Symbol::new(text)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps width/alignment flags working
        f.pad(&self.0)
    }
}

/// A single cell of a [`Row`](crate::Row).
///
/// Which variant is valid at a position is dictated by the schema's column
/// type there (see [`Value::matches`]). A `Currency` column accepts both
/// `Currency` (the `f32` that gets written) and `MicroCents` (what a read
/// produces).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Timestamp(i64),
    Currency(f32),
    MicroCents(i64),
    Symbol(Symbol),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
}

impl Value {
    /// Returns `true` if this cell may be stored in a column of type `ty`.
    pub fn matches(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (Value::Timestamp(_), ColumnType::Timestamp)
                | (Value::Currency(_), ColumnType::Currency)
                | (Value::MicroCents(_), ColumnType::Currency)
                | (Value::Symbol(_), ColumnType::Symbol)
                | (Value::Int32(_), ColumnType::Int32)
                | (Value::Uint32(_), ColumnType::Uint32)
                | (Value::Int64(_), ColumnType::Int64)
                | (Value::Uint64(_), ColumnType::Uint64)
                | (Value::Float32(_), ColumnType::Float32)
                | (Value::Float64(_), ColumnType::Float64)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Timestamp(_) => "timestamp",
            Value::Currency(_) => "currency",
            Value::MicroCents(_) => "micro-cents",
            Value::Symbol(_) => "symbol",
            Value::Int32(_) => "int32",
            Value::Uint32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::Uint64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Currency cell as fixed-point micro-cents, whichever form it is held in.
    pub fn as_micro_cents(&self) -> Option<i64> {
        match self {
            Value::Currency(c) => Some(micro_cents(*c)),
            Value::MicroCents(m) => Some(*m),
            _ => None,
        }
    }
}

/// Converts an on-disk `f32` currency amount to micro-cents, truncating
/// toward zero. `40.23` becomes `40_230_000`.
///
/// The multiplication happens in `f32` so the result is exactly what a read
/// of the stored float yields.
pub fn micro_cents(amount: f32) -> i64 {
    (amount * MICROS) as i64
}

/// Inverse of [`micro_cents`], used when a decoded row is written again.
pub fn currency_from_micro_cents(micros: i64) -> f32 {
    (micros as f64 / 1_000_000.0) as f32
}
