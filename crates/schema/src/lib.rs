//! # Schema
//!
//! The typed data model of the zdb column store.
//!
//! - [`ColumnType`] is the closed set of storable types, each with a fixed
//!   on-disk width.
//! - [`Schema`] is the ordered list of columns of one table. Column 0 is
//!   always `ts: Timestamp`; it is inserted by every constructor and cannot be
//!   removed or reordered.
//! - [`Value`] is one cell of a [`Row`]. Which variants are valid at a given
//!   position is decided by the schema, so rows stay schema-agnostic and the
//!   schema is passed explicitly wherever a row is checked or rendered.
//! - [`Literal`] / [`RowLiteral`] are loosely typed builder values that are
//!   coerced against a schema with [`Row::from_literal`].
//!
//! ## Example
//! ```rust
//! use schema::{row_literal, ColumnType, Row, Schema};
//!
//! let schema = Schema::with_columns(
//!     "agg1d",
//!     [("sym", ColumnType::Symbol), ("open", ColumnType::Currency)],
//! )
//! .unwrap();
//!
//! let row = Row::from_literal(&row_literal![1_000, "MSFT", 40.23], &schema).unwrap();
//! assert_eq!(row.timestamp(), 1_000);
//! assert_eq!(row.len(), 3);
//! ```

mod error;
mod format;
mod literal;
mod row;
mod schema;
mod types;
mod value;

pub use error::SchemaError;
pub use format::{format_micro_cents, format_nanos, parse_nanos, PLACEHOLDER};
pub use literal::{Literal, RowLiteral};
pub use row::{Row, RowDisplay};
pub use schema::{Column, Schema, TIMESTAMP_COLUMN};
pub use types::ColumnType;
pub use value::{currency_from_micro_cents, micro_cents, Symbol, Value, SYMBOL_CAPACITY};
