use std::fmt;

use crate::error::SchemaError;
use crate::types::ColumnType;

/// Name of the mandatory first column.
pub const TIMESTAMP_COLUMN: &str = "ts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered columns of a table.
///
/// Columns can only be appended. The first column is always
/// `ts: Timestamp`, and names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema holding only the `ts` column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![Column::new(TIMESTAMP_COLUMN, ColumnType::Timestamp)],
        }
    }

    /// Creates a schema and appends `columns` after `ts`, in order.
    pub fn with_columns<I, S>(name: impl Into<String>, columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut schema = Self::new(name);
        for (col_name, ty) in columns {
            schema.add(col_name, ty)?;
        }
        Ok(schema)
    }

    /// Appends `column`.
    ///
    /// Names must survive the `_meta` text format and serve as file stems, so
    /// empty names, names with `,` `=` `/` `\` or control characters, names
    /// with surrounding whitespace and names starting with `[` `#` `;` fail
    /// with [`SchemaError::InvalidColumnName`].
    pub fn add_column(&mut self, column: Column) -> Result<(), SchemaError> {
        check_column_name(&column.name)?;
        if self.position(&column.name).is_some() {
            return Err(SchemaError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn add(&mut self, name: impl Into<String>, ty: ColumnType) -> Result<(), SchemaError> {
        self.add_column(Column::new(name, ty))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false`: a schema holds at least `ts`.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Comma-separated column names in schema order.
    pub fn column_order(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Bytes taken by one row across all column files.
    pub fn row_width(&self) -> usize {
        self.columns.iter().map(|c| c.ty.width()).sum()
    }
}

fn check_column_name(name: &str) -> Result<(), SchemaError> {
    let reason = if name.is_empty() {
        "empty"
    } else if name.contains([',', '=', '/', '\\']) {
        "contains one of , = / \\"
    } else if name.chars().any(char::is_control) {
        "contains a control character"
    } else if name.trim() != name {
        "has leading or trailing whitespace"
    } else if name.starts_with(['[', '#', ';']) {
        "starts with [ # or ;"
    } else {
        return Ok(());
    };
    Err(SchemaError::InvalidColumnName {
        name: name.to_string(),
        reason,
    })
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.name)?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", c.name, c.ty)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg1d() -> Schema {
        Schema::with_columns(
            "agg1d",
            [
                ("sym", ColumnType::Symbol),
                ("open", ColumnType::Currency),
                ("high", ColumnType::Currency),
                ("low", ColumnType::Currency),
                ("close", ColumnType::Currency),
                ("close_unadjusted", ColumnType::Currency),
                ("volume", ColumnType::Uint64),
            ],
        )
        .unwrap()
    }

    #[test]
    fn new_schema_starts_with_ts() {
        let s = Schema::new("empty");
        assert_eq!(s.len(), 1);
        assert_eq!(s.columns()[0], Column::new("ts", ColumnType::Timestamp));
    }

    #[test]
    fn with_columns_keeps_ts_first_and_order() {
        let s = agg1d();
        assert_eq!(s.len(), 8);
        assert_eq!(s.columns()[0].name, TIMESTAMP_COLUMN);
        assert_eq!(s.columns()[0].ty, ColumnType::Timestamp);
        assert_eq!(
            s.column_order(),
            "ts,sym,open,high,low,close,close_unadjusted,volume"
        );
        assert_eq!(s.position("volume"), Some(7));
        assert_eq!(s.column("open").map(|c| c.ty), Some(ColumnType::Currency));
        assert!(s.column("nope").is_none());
    }

    #[test]
    fn add_column_appends() {
        let mut s = Schema::new("t");
        s.add("a", ColumnType::Int32).unwrap();
        s.add_column(Column::new("b", ColumnType::Float64)).unwrap();
        assert_eq!(s.column_order(), "ts,a,b");
        assert_eq!(s.columns()[0].name, "ts");
        assert_eq!(s.row_width(), 8 + 4 + 8);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut s = Schema::new("t");
        s.add("a", ColumnType::Int32).unwrap();
        assert_eq!(
            s.add("a", ColumnType::Int64),
            Err(SchemaError::DuplicateColumn("a".into()))
        );
        // ts cannot be re-added or replaced
        let err = Schema::with_columns("t", [("ts", ColumnType::Int64)]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("ts".into()));
    }

    #[test]
    fn names_meta_cannot_hold_are_rejected() {
        let bad = [
            ("", "empty"),
            ("a,b", "separator"),
            ("k=v", "separator"),
            ("dir/x", "path"),
            ("dir\\x", "path"),
            ("line\nbreak", "control"),
            ("cr\r", "control"),
            ("nul\0", "control"),
            (" x", "whitespace"),
            ("x ", "whitespace"),
            ("[x", "header"),
            ("#x", "comment"),
            (";x", "comment"),
        ];
        for (name, class) in bad {
            let mut s = Schema::new("t");
            match s.add(name, ColumnType::Int32) {
                Err(SchemaError::InvalidColumnName { name: got, .. }) => assert_eq!(got, name),
                other => panic!("{class} name {name:?}: {other:?}"),
            }
            assert_eq!(s.len(), 1);
        }
    }

    #[test]
    fn ordinary_names_are_accepted() {
        let s = Schema::with_columns(
            "t",
            [
                ("close_unadjusted", ColumnType::Currency),
                ("x[0]", ColumnType::Int32),
                ("a b", ColumnType::Int32),
                ("v#2", ColumnType::Int32),
            ],
        )
        .unwrap();
        assert_eq!(s.column_order(), "ts,close_unadjusted,x[0],a b,v#2");
    }

    #[test]
    fn display_lists_columns() {
        let mut s = Schema::new("t");
        s.add("sym", ColumnType::Symbol).unwrap();
        assert_eq!(s.to_string(), "t (ts TIMESTAMP, sym SYMBOL)");
    }
}
