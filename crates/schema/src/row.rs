use std::cmp::Ordering;
use std::fmt;

use crate::error::SchemaError;
use crate::format::{format_micro_cents, format_nanos, PLACEHOLDER};
use crate::literal::RowLiteral;
use crate::schema::Schema;
use crate::value::{micro_cents, Value};

/// Width of the right-aligned field symbols are rendered in.
const SYMBOL_FIELD_WIDTH: usize = 7;

/// One row of cells. Cell 0 is always the row's timestamp.
///
/// A row carries no schema; the schema is passed to [`Row::validate`] and
/// [`Row::display`] by whoever knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    ts: i64,
    /// `values[0]` is always `Value::Timestamp(ts)`.
    values: Vec<Value>,
}

impl Row {
    pub fn new(ts: i64) -> Self {
        Self {
            ts,
            values: vec![Value::Timestamp(ts)],
        }
    }

    /// Builds a row by coercing each literal against the column at the same
    /// position of `schema`.
    pub fn from_literal(literal: &RowLiteral, schema: &Schema) -> Result<Self, SchemaError> {
        let expected = schema.len();
        let found = literal.values.len() + 1;
        if found != expected {
            return Err(SchemaError::ColumnCountMismatch {
                schema: schema.name().to_string(),
                expected,
                found,
            });
        }

        let mut row = Row::new(literal.ts);
        row.values.reserve(literal.values.len());
        for (lit, column) in literal.values.iter().zip(&schema.columns()[1..]) {
            row.values.push(lit.coerce(column)?);
        }
        Ok(row)
    }

    /// Appends the next cell.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn with(mut self, value: Value) -> Self {
        self.push(value);
        self
    }

    pub fn timestamp(&self) -> i64 {
        self.ts
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn cmp_by_timestamp(&self, other: &Row) -> Ordering {
        self.ts.cmp(&other.ts)
    }

    /// Checks that the row has one cell per column and that every cell fits
    /// its column's type.
    pub fn validate(&self, schema: &Schema) -> Result<(), SchemaError> {
        if self.values.len() != schema.len() {
            return Err(SchemaError::ColumnCountMismatch {
                schema: schema.name().to_string(),
                expected: schema.len(),
                found: self.values.len(),
            });
        }
        for (value, column) in self.values.iter().zip(schema.columns()) {
            if !value.matches(column.ty) {
                return Err(SchemaError::ColumnTypeMismatch {
                    column: column.name.clone(),
                    expected: column.ty,
                    found: value.kind_name(),
                });
            }
        }
        Ok(())
    }

    /// Renders the row as text using `schema` to interpret the cells.
    pub fn display<'a>(&'a self, schema: &'a Schema) -> RowDisplay<'a> {
        RowDisplay { row: self, schema }
    }
}

/// Presentation of a [`Row`] under a [`Schema`]. Cells are separated by a
/// single space; cells that do not fit their column render as `?`.
pub struct RowDisplay<'a> {
    row: &'a Row,
    schema: &'a Schema,
}

impl fmt::Display for RowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.schema.columns();
        let cells = self.row.values.len().max(columns.len());
        for i in 0..cells {
            if i > 0 {
                f.write_str(" ")?;
            }
            let (Some(value), Some(column)) = (self.row.values.get(i), columns.get(i)) else {
                f.write_str(PLACEHOLDER)?;
                continue;
            };
            if !value.matches(column.ty) {
                f.write_str(PLACEHOLDER)?;
                continue;
            }
            match value {
                Value::Timestamp(ts) => f.write_str(&format_nanos(*ts))?,
                Value::Currency(c) => f.write_str(&format_micro_cents(micro_cents(*c)))?,
                Value::MicroCents(m) => f.write_str(&format_micro_cents(*m))?,
                Value::Symbol(s) => write!(f, "{:>width$}", s, width = SYMBOL_FIELD_WIDTH)?,
                Value::Int32(v) => write!(f, "{v}")?,
                Value::Uint32(v) => write!(f, "{v}")?,
                Value::Int64(v) => write!(f, "{v}")?,
                Value::Uint64(v) => write!(f, "{v}")?,
                Value::Float32(v) => write!(f, "{v}")?,
                Value::Float64(v) => write!(f, "{v}")?,
            }
        }
        Ok(())
    }
}
