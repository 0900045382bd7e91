//! # Table
//!
//! Append-oriented columnar table engine for timestamped rows.
//!
//! Each table lives in its own directory under `<root>/data/<name>` and is
//! made of one raw binary file per column plus small sidecars:
//!
//! ```text
//! data/agg1d/
//! ├── _meta              [columns] name=TYPE, [rows] count=N, [columnOrder] order=ts,...
//! ├── _symbols           one symbol per line, line index = dictionary code
//! ├── _lock              advisory lock held by the single writer
//! ├── ts.timestamp       i64 LE per row
//! ├── sym.symbol         u32 LE dictionary code per row
//! ├── open.currency      f32 LE per row
//! └── volume.uint64      u64 LE per row
//! ```
//!
//! ## Write path
//!
//! [`Table::write`] only buffers rows in memory. [`Table::flush`] stable-sorts
//! the buffer by timestamp, appends every column's cells to its file
//! (interning new symbols on the way), rewrites `_symbols`, then bumps and
//! persists the row count. Sorting never crosses flush boundaries: rows that
//! already reached disk are not reordered against later flushes.
//!
//! ## Read path
//!
//! [`Table::read`] seeks each column file to the first requested row and
//! decodes cells back into [`schema::Row`]s. Currency cells come back as
//! micro-cents.
//!
//! ## Guarantees
//!
//! None of transactional, crash-atomic or multi-writer. A failed flush can
//! leave column files, `_symbols` and the row count out of step. Only one
//! [`Table`] may use a directory at a time; this is enforced with an
//! exclusive advisory lock.

mod codec;
mod config;
mod error;
mod layout;
mod meta;
mod reader;
mod table;
mod writer;

pub use codec::{decode_cell, decode_fixed, encode_fixed, encode_symbol};
pub use config::StoreConfig;
pub use error::TableError;
pub use layout::{column_file_name, TableLayout, LOCK_FILE, META_FILE, SYMBOLS_FILE};
pub use table::{FlushSummary, SkippedRow, Table, TableOptions};

pub use schema;
pub use symbols;
