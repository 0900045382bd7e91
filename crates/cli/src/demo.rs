use schema::{row_literal, ColumnType, RowLiteral, Schema, SchemaError};

/// Daily aggregates: one row per symbol and day.
pub fn agg1d_schema() -> Result<Schema, SchemaError> {
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
}

pub fn agg1d_rows() -> Vec<RowLiteral> {
    vec![
        //            ts,                  sym,    open,   high, low, close, close2, volume
        row_literal![1073077200000054742, "MSFT", 40.23, 50, 30, 44, 44, 10_445_300u64],
        row_literal![1073077200001234556, "AAPL", 300, 400, 200, 340, 340, 212_312_000u64],
        row_literal![1073077212356789012, "AMZN", 40.234, 50, 30, 44, 44, 30_312_300u64],
        row_literal![1073077212356789012, "BEVD", 1.2345, 50, 30, 44, 44, 161_000_000u64],
        row_literal![1073077212356789012, "BKSH", 256789, 50, 30, 44, 44, 5_194_967_296u64],
    ]
}
