use crate::error::SchemaError;
use crate::schema::Column;
use crate::types::ColumnType;
use crate::value::{Symbol, Value};

/// A self-describing builder value, matched against a column type when a
/// [`Row`](crate::Row) is built from a [`RowLiteral`].
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    I32(i32),
    U32(u32),
    F32(f32),
}

macro_rules! impl_from_literal {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Literal {
                fn from(v: $t) -> Self {
                    Literal::$variant(v)
                }
            }
        )*
    };
}

impl_from_literal! {
    i64 => I64,
    u64 => U64,
    f64 => F64,
    i32 => I32,
    u32 => U32,
    f32 => F32,
    String => Str,
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_string())
    }
}

impl Literal {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::I64(_) => "i64",
            Literal::U64(_) => "u64",
            Literal::F64(_) => "f64",
            Literal::I32(_) => "i32",
            Literal::U32(_) => "u32",
            Literal::F32(_) => "f32",
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match *self {
            Literal::I64(v) => Some(v.into()),
            Literal::U64(v) => Some(v.into()),
            Literal::I32(v) => Some(v.into()),
            Literal::U32(v) => Some(v.into()),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match *self {
            Literal::F64(v) => Some(v),
            Literal::F32(v) => Some(v.into()),
            _ => self.as_integer().map(|v| v as f64),
        }
    }

    /// Converts this literal into a cell for `column`.
    ///
    /// Integer columns accept any integer literal that fits without loss.
    /// Float and currency columns accept any numeric literal. Symbol columns
    /// accept only strings of at most 7 bytes.
    pub fn coerce(&self, column: &Column) -> Result<Value, SchemaError> {
        let mismatch = || SchemaError::ColumnTypeMismatch {
            column: column.name.clone(),
            expected: column.ty,
            found: self.kind_name(),
        };
        let int = |conv: fn(i128) -> Option<Value>| self.as_integer().and_then(conv).ok_or_else(mismatch);

        match column.ty {
            ColumnType::Symbol => match self {
                Literal::Str(s) => Ok(Value::Symbol(Symbol::new(s.as_str())?)),
                _ => Err(mismatch()),
            },
            ColumnType::Timestamp => int(|v| i64::try_from(v).ok().map(Value::Timestamp)),
            ColumnType::Int32 => int(|v| i32::try_from(v).ok().map(Value::Int32)),
            ColumnType::Uint32 => int(|v| u32::try_from(v).ok().map(Value::Uint32)),
            ColumnType::Int64 => int(|v| i64::try_from(v).ok().map(Value::Int64)),
            ColumnType::Uint64 => int(|v| u64::try_from(v).ok().map(Value::Uint64)),
            ColumnType::Currency => self
                .as_float()
                .map(|v| Value::Currency(v as f32))
                .ok_or_else(mismatch),
            ColumnType::Float32 => self
                .as_float()
                .map(|v| Value::Float32(v as f32))
                .ok_or_else(mismatch),
            ColumnType::Float64 => self.as_float().map(Value::Float64).ok_or_else(mismatch),
        }
    }
}

/// A row written as literals: a timestamp followed by one literal per
/// non-`ts` column of the target schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLiteral {
    pub ts: i64,
    pub values: Vec<Literal>,
}

impl RowLiteral {
    pub fn new(ts: i64, values: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            ts,
            values: values.into_iter().collect(),
        }
    }
}

/// Builds a [`RowLiteral`] from a timestamp and plain Rust literals.
///
/// ```rust
/// use schema::{row_literal, Literal};
///
/// let lit = row_literal![1_073_077_200_000_054_742, "MSFT", 40.23, 10_445_300u64];
/// assert_eq!(lit.values[0], Literal::Str("MSFT".into()));
/// ```
#[macro_export]
macro_rules! row_literal {
    ($ts:expr $(, $v:expr)* $(,)?) => {
        $crate::RowLiteral::new($ts, vec![$($crate::Literal::from($v)),*])
    };
}
