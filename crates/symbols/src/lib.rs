//! # Symbols
//!
//! Bidirectional string ⇄ code dictionary backing `Symbol` columns.
//!
//! Column files store a 4-byte code per cell; the code is the string's line
//! index in the table's `_symbols` file. Codes are handed out in strictly
//! increasing order starting after the last code loaded from disk, so a code
//! that reached disk never changes meaning.
//!
//! ```text
//! _symbols
//! ┌──────────┐
//! │ MSFT\n   │  code 0
//! │ AAPL\n   │  code 1
//! │ AMZN\n   │  code 2
//! └──────────┘
//! ```

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The code has no string: the column file and dictionary disagree, or the
    /// dictionary was extended elsewhere and not reloaded.
    #[error("unknown symbol code {code} (dictionary holds {len})")]
    UnknownSymbolCode { code: u32, len: usize },
}

/// In-memory dictionary. Mutated by [`intern`](Dictionary::intern), written
/// back in full by [`persist`](Dictionary::persist).
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    codes: HashMap<String, u32>,
    strings: Vec<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a newline-delimited dictionary file. A missing or empty file
    /// yields an empty dictionary.
    ///
    /// A trailing `\r` on a line is dropped. If a hand-edited file repeats a
    /// string, lookups resolve to its first code but the repeat still takes
    /// its line's code so later codes keep their positions.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SymbolError> {
        let file = match File::open(path.as_ref()) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dict = Self::new();
        for line in BufReader::new(file).lines() {
            let mut line = line?;
            if line.ends_with('\r') {
                line.pop();
            }
            let code = dict.strings.len() as u32;
            dict.codes.entry(line.clone()).or_insert(code);
            dict.strings.push(line);
        }
        debug!(path = ?path.as_ref(), symbols = dict.len(), "loaded symbol dictionary");
        Ok(dict)
    }

    /// Returns the code of `s`, assigning the next free code if `s` is new.
    /// Only memory is touched; call [`persist`](Dictionary::persist) afterwards.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&code) = self.codes.get(s) {
            return code;
        }
        let code = self.strings.len() as u32;
        self.codes.insert(s.to_string(), code);
        self.strings.push(s.to_string());
        code
    }

    pub fn code(&self, s: &str) -> Option<u32> {
        self.codes.get(s).copied()
    }

    pub fn resolve(&self, code: u32) -> Result<&str, SymbolError> {
        self.strings
            .get(code as usize)
            .map(String::as_str)
            .ok_or(SymbolError::UnknownSymbolCode {
                code,
                len: self.strings.len(),
            })
    }

    /// Overwrites `path` with every string, one per line, in code order.
    ///
    /// Written to a temporary sibling and renamed into place, like the other
    /// sidecar files.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<(), SymbolError> {
        self.persist_inner(path.as_ref(), false)
    }

    /// [`persist`](Dictionary::persist) followed by `fsync` before the rename.
    pub fn persist_sync<P: AsRef<Path>>(&self, path: P) -> Result<(), SymbolError> {
        self.persist_inner(path.as_ref(), true)
    }

    fn persist_inner(&self, path: &Path, sync: bool) -> Result<(), SymbolError> {
        let tmp_path = path.with_extension("tmp");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut w = BufWriter::new(file);
        for s in &self.strings {
            w.write_all(s.as_bytes())?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        if sync {
            w.get_ref().sync_all()?;
        }
        drop(w);

        fs::rename(tmp_path, path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterates strings in code order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u32, s.as_str()))
    }
}
