//! Fixed-width little-endian cell encoding.
//!
//! | Column type | Bytes | On disk                    |
//! |-------------|-------|----------------------------|
//! | Timestamp   | 8     | `i64` nanoseconds          |
//! | Currency    | 4     | `f32` amount               |
//! | Symbol      | 4     | `u32` dictionary code      |
//! | Int32       | 4     | `i32`                      |
//! | Uint32      | 4     | `u32`                      |
//! | Int64       | 8     | `i64`                      |
//! | Uint64      | 8     | `u64`                      |
//! | Float32     | 4     | `f32`                      |
//! | Float64     | 8     | `f64`                      |
//!
//! Symbol cells only make sense together with a [`Dictionary`], so the
//! dictionary-free functions reject them with
//! [`TableError::UnsupportedColumnType`].

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use schema::{
    currency_from_micro_cents, micro_cents, Column, ColumnType, SchemaError, Symbol, Value,
};
use symbols::Dictionary;

use crate::error::TableError;

/// Writes one non-symbol cell of `column`.
pub fn encode_fixed<W: Write>(w: &mut W, column: &Column, value: &Value) -> Result<(), TableError> {
    match (column.ty, value) {
        (ColumnType::Symbol, _) => return Err(TableError::UnsupportedColumnType(ColumnType::Symbol)),
        (ColumnType::Timestamp, Value::Timestamp(v)) => w.write_i64::<LittleEndian>(*v)?,
        (ColumnType::Currency, Value::Currency(v)) => w.write_f32::<LittleEndian>(*v)?,
        (ColumnType::Currency, Value::MicroCents(m)) => {
            w.write_f32::<LittleEndian>(currency_from_micro_cents(*m))?
        }
        (ColumnType::Int32, Value::Int32(v)) => w.write_i32::<LittleEndian>(*v)?,
        (ColumnType::Uint32, Value::Uint32(v)) => w.write_u32::<LittleEndian>(*v)?,
        (ColumnType::Int64, Value::Int64(v)) => w.write_i64::<LittleEndian>(*v)?,
        (ColumnType::Uint64, Value::Uint64(v)) => w.write_u64::<LittleEndian>(*v)?,
        (ColumnType::Float32, Value::Float32(v)) => w.write_f32::<LittleEndian>(*v)?,
        (ColumnType::Float64, Value::Float64(v)) => w.write_f64::<LittleEndian>(*v)?,
        (ty, v) => {
            return Err(SchemaError::ColumnTypeMismatch {
                column: column.name.clone(),
                expected: ty,
                found: v.kind_name(),
            }
            .into())
        }
    }
    Ok(())
}

/// Writes a symbol cell as its dictionary code.
pub fn encode_symbol<W: Write>(w: &mut W, code: u32) -> Result<(), TableError> {
    w.write_u32::<LittleEndian>(code)?;
    Ok(())
}

/// Reads one non-symbol cell of type `ty`. Currency comes back as micro-cents.
pub fn decode_fixed<R: Read>(r: &mut R, ty: ColumnType) -> Result<Value, TableError> {
    let value = match ty {
        ColumnType::Symbol => return Err(TableError::UnsupportedColumnType(ty)),
        ColumnType::Timestamp => Value::Timestamp(r.read_i64::<LittleEndian>()?),
        ColumnType::Currency => Value::MicroCents(micro_cents(r.read_f32::<LittleEndian>()?)),
        ColumnType::Int32 => Value::Int32(r.read_i32::<LittleEndian>()?),
        ColumnType::Uint32 => Value::Uint32(r.read_u32::<LittleEndian>()?),
        ColumnType::Int64 => Value::Int64(r.read_i64::<LittleEndian>()?),
        ColumnType::Uint64 => Value::Uint64(r.read_u64::<LittleEndian>()?),
        ColumnType::Float32 => Value::Float32(r.read_f32::<LittleEndian>()?),
        ColumnType::Float64 => Value::Float64(r.read_f64::<LittleEndian>()?),
    };
    Ok(value)
}

/// Reads one cell of type `ty`, resolving symbol codes through `dict`.
///
/// A dictionary string longer than a symbol may be fails with
/// [`SchemaError::SymbolTooLong`].
pub fn decode_cell<R: Read>(
    r: &mut R,
    ty: ColumnType,
    dict: &Dictionary,
) -> Result<Value, TableError> {
    if ty != ColumnType::Symbol {
        return decode_fixed(r, ty);
    }
    let code = r.read_u32::<LittleEndian>()?;
    let text = dict.resolve(code)?;
    Ok(Value::Symbol(Symbol::new(text)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn col(ty: ColumnType) -> Column {
        Column::new("c", ty)
    }

    #[test]
    fn little_endian_layout() {
        let mut buf = Vec::new();
        encode_fixed(&mut buf, &col(ColumnType::Timestamp), &Value::Timestamp(1)).unwrap();
        encode_fixed(&mut buf, &col(ColumnType::Uint32), &Value::Uint32(0x0102_0304)).unwrap();
        assert_eq!(buf, [1, 0, 0, 0, 0, 0, 0, 0, 4, 3, 2, 1]);
    }

    #[test]
    fn every_fixed_type_has_its_width() {
        let cases = [
            (ColumnType::Timestamp, Value::Timestamp(-5)),
            (ColumnType::Currency, Value::Currency(1.5)),
            (ColumnType::Int32, Value::Int32(-7)),
            (ColumnType::Uint32, Value::Uint32(7)),
            (ColumnType::Int64, Value::Int64(i64::MIN)),
            (ColumnType::Uint64, Value::Uint64(u64::MAX)),
            (ColumnType::Float32, Value::Float32(0.25)),
            (ColumnType::Float64, Value::Float64(-2.5)),
        ];
        for (ty, value) in cases {
            let mut buf = Vec::new();
            encode_fixed(&mut buf, &col(ty), &value).unwrap();
            assert_eq!(buf.len(), ty.width(), "{ty}");
        }
    }

    #[test]
    fn currency_reads_back_as_micro_cents() {
        let mut buf = Vec::new();
        encode_fixed(&mut buf, &col(ColumnType::Currency), &Value::Currency(40.23)).unwrap();
        let v = decode_fixed(&mut Cursor::new(buf), ColumnType::Currency).unwrap();
        assert_eq!(v, Value::MicroCents(40_230_000));
    }

    #[test]
    fn micro_cents_are_written_back_as_currency() {
        let mut buf = Vec::new();
        encode_fixed(
            &mut buf,
            &col(ColumnType::Currency),
            &Value::MicroCents(40_230_000),
        )
        .unwrap();
        let v = decode_fixed(&mut Cursor::new(buf), ColumnType::Currency).unwrap();
        assert_eq!(v, Value::MicroCents(40_230_000));
    }

    #[test]
    fn symbol_needs_a_dictionary() {
        let sym = Value::Symbol(Symbol::new("MSFT").unwrap());
        let err = encode_fixed(&mut Vec::new(), &col(ColumnType::Symbol), &sym).unwrap_err();
        assert!(matches!(
            err,
            TableError::UnsupportedColumnType(ColumnType::Symbol)
        ));

        let err = decode_fixed(&mut Cursor::new(vec![0u8; 4]), ColumnType::Symbol).unwrap_err();
        assert!(matches!(
            err,
            TableError::UnsupportedColumnType(ColumnType::Symbol)
        ));
    }

    #[test]
    fn symbol_code_resolves_through_dictionary() {
        let mut dict = Dictionary::new();
        dict.intern("MSFT");
        let code = dict.intern("AAPL");

        let mut buf = Vec::new();
        encode_symbol(&mut buf, code).unwrap();
        assert_eq!(buf, [1, 0, 0, 0]);

        let v = decode_cell(&mut Cursor::new(buf), ColumnType::Symbol, &dict).unwrap();
        assert_eq!(v.as_symbol(), Some("AAPL"));
    }

    #[test]
    fn unknown_code_and_oversized_dictionary_entry() {
        let mut dict = Dictionary::new();
        dict.intern("WAYTOOLONG");

        let err = decode_cell(&mut Cursor::new(vec![9, 0, 0, 0]), ColumnType::Symbol, &dict)
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::Symbol(symbols::SymbolError::UnknownSymbolCode { code: 9, len: 1 })
        ));

        let err = decode_cell(&mut Cursor::new(vec![0, 0, 0, 0]), ColumnType::Symbol, &dict)
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::Schema(SchemaError::SymbolTooLong { .. })
        ));
    }

    #[test]
    fn wrong_variant_is_a_type_mismatch() {
        let err = encode_fixed(&mut Vec::new(), &col(ColumnType::Int64), &Value::Int32(1))
            .unwrap_err();
        match err {
            TableError::Schema(SchemaError::ColumnTypeMismatch {
                column,
                expected,
                found,
            }) => {
                assert_eq!(column, "c");
                assert_eq!(expected, ColumnType::Int64);
                assert_eq!(found, "int32");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn short_read_is_io_error() {
        let err = decode_fixed(&mut Cursor::new(vec![1, 2, 3]), ColumnType::Int64).unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }
}
