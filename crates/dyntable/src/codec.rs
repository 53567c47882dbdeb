//! Binary encoding of a whole table.
//!
//! All integers are little-endian. Layout:
//!
//! ```text
//! u64 column count
//!   per column: u8 type tag, u64 name length, name bytes (UTF-8)
//! u64 row count
//!   per row, per column: u8 presence (0 absent, 1 present), then the value if present
//! ```
//!
//! Fixed-width values use [`ColumnType::fixed_width`] bytes; text is a `u64` length followed by
//! UTF-8 bytes; refs are written as `u64` addresses. Comparators and callbacks are not encoded.

use log::{debug, warn};

use crate::error::TableError;
use crate::options::TableOptions;
use crate::table::Table;
use crate::value::{ColumnType, OpaqueRef, Value};
use crate::Result;

/// Upper bound on rows accepted for a table without columns, whose rows occupy no bytes.
const MAX_EMPTY_ROWS: usize = 1 << 24;

// Smallest encoding of one column: tag plus an empty name.
const MIN_COLUMN_BYTES: usize = 1 + 8;

trait ByteSink {
    fn put(&mut self, bytes: &[u8]);
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Counts bytes without storing them.
struct Counter(usize);

impl ByteSink for Counter {
    fn put(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }
}

/// Writes into a slice already checked to be large enough.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl ByteSink for SliceWriter<'_> {
    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }
}

fn put_len(sink: &mut impl ByteSink, len: usize) {
    sink.put(&(len as u64).to_le_bytes());
}

fn put_str(sink: &mut impl ByteSink, s: &str) {
    put_len(sink, s.len());
    sink.put(s.as_bytes());
}

fn put_value(sink: &mut impl ByteSink, value: &Value) {
    match value {
        Value::Int(v) | Value::Int32(v) => sink.put(&v.to_le_bytes()),
        Value::UInt(v) | Value::UInt32(v) => sink.put(&v.to_le_bytes()),
        Value::Int8(v) | Value::Char(v) => sink.put(&v.to_le_bytes()),
        Value::UInt8(v) | Value::UChar(v) => sink.put(&v.to_le_bytes()),
        Value::Int16(v) | Value::Short(v) => sink.put(&v.to_le_bytes()),
        Value::UInt16(v) | Value::UShort(v) => sink.put(&v.to_le_bytes()),
        Value::Int64(v) | Value::Long(v) | Value::LLong(v) => sink.put(&v.to_le_bytes()),
        Value::UInt64(v) | Value::ULong(v) | Value::ULLong(v) => sink.put(&v.to_le_bytes()),
        Value::Float(v) => sink.put(&v.to_le_bytes()),
        Value::Double(v) | Value::LDouble(v) => sink.put(&v.to_le_bytes()),
        Value::String(s) => put_str(sink, s),
        Value::Bool(v) => sink.put(&[u8::from(*v)]),
        Value::Ptr(p) => sink.put(&(p.addr() as u64).to_le_bytes()),
    }
}

fn write_table(table: &Table, sink: &mut impl ByteSink) {
    put_len(sink, table.column_count());
    for column in table.columns() {
        sink.put(&[column.column_type().tag()]);
        put_str(sink, column.name());
    }
    put_len(sink, table.row_count());
    for row in table.rows() {
        for cell in row.cells() {
            match cell {
                None => sink.put(&[0]),
                Some(value) => {
                    sink.put(&[1]);
                    put_value(sink, value);
                }
            }
        }
    }
}

/// Bounds-checked cursor over encoded input. Every failure reports the offset it happened at.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        let bytes = self
            .data
            .get(self.offset..)
            .and_then(|rest| rest.get(..len))
            .ok_or_else(|| {
                TableError::corrupt(
                    self.offset,
                    format!("unexpected end of input: need {len} bytes, {remaining} left"),
                )
            })?;
        self.offset += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.offset;
        let bytes = self.read_slice(N)?;
        bytes
            .first_chunk::<N>()
            .copied()
            .ok_or_else(|| TableError::corrupt(offset, "short read"))
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    fn read_usize(&mut self) -> Result<usize> {
        let offset = self.offset;
        let raw = self.read_u64()?;
        usize::try_from(raw)
            .map_err(|_| TableError::corrupt(offset, format!("length {raw} does not fit in memory")))
    }

    /// Read an item count, rejecting counts whose items cannot fit in the remaining input.
    fn read_count(&mut self, min_item_bytes: usize) -> Result<usize> {
        let offset = self.offset;
        let count = self.read_usize()?;
        let fits = match min_item_bytes {
            0 => count <= MAX_EMPTY_ROWS,
            n => count
                .checked_mul(n)
                .is_some_and(|needed| needed <= self.remaining()),
        };
        if fits {
            Ok(count)
        } else {
            Err(TableError::corrupt(
                offset,
                format!("count {count} exceeds the remaining input"),
            ))
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let offset = self.offset;
        let len = self.read_usize()?;
        let bytes = self.read_slice(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|err| TableError::corrupt(offset, format!("invalid UTF-8 text: {err}")))
    }

    fn read_value(&mut self, column_type: ColumnType) -> Result<Value> {
        Ok(match column_type {
            ColumnType::Int => Value::Int(i32::from_le_bytes(self.read_array()?)),
            ColumnType::UInt => Value::UInt(u32::from_le_bytes(self.read_array()?)),
            ColumnType::Int8 => Value::Int8(i8::from_le_bytes(self.read_array()?)),
            ColumnType::UInt8 => Value::UInt8(self.read_u8()?),
            ColumnType::Int16 => Value::Int16(i16::from_le_bytes(self.read_array()?)),
            ColumnType::UInt16 => Value::UInt16(u16::from_le_bytes(self.read_array()?)),
            ColumnType::Int32 => Value::Int32(i32::from_le_bytes(self.read_array()?)),
            ColumnType::UInt32 => Value::UInt32(u32::from_le_bytes(self.read_array()?)),
            ColumnType::Int64 => Value::Int64(i64::from_le_bytes(self.read_array()?)),
            ColumnType::UInt64 => Value::UInt64(self.read_u64()?),
            ColumnType::Short => Value::Short(i16::from_le_bytes(self.read_array()?)),
            ColumnType::UShort => Value::UShort(u16::from_le_bytes(self.read_array()?)),
            ColumnType::Long => Value::Long(i64::from_le_bytes(self.read_array()?)),
            ColumnType::ULong => Value::ULong(self.read_u64()?),
            ColumnType::LLong => Value::LLong(i64::from_le_bytes(self.read_array()?)),
            ColumnType::ULLong => Value::ULLong(self.read_u64()?),
            ColumnType::Float => Value::Float(f32::from_le_bytes(self.read_array()?)),
            ColumnType::Double => Value::Double(f64::from_le_bytes(self.read_array()?)),
            ColumnType::LDouble => Value::LDouble(f64::from_le_bytes(self.read_array()?)),
            ColumnType::Char => Value::Char(i8::from_le_bytes(self.read_array()?)),
            ColumnType::UChar => Value::UChar(self.read_u8()?),
            ColumnType::String => Value::String(self.read_string()?),
            ColumnType::Bool => {
                let offset = self.offset;
                match self.read_u8()? {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    other => {
                        return Err(TableError::corrupt(
                            offset,
                            format!("invalid bool byte {other}"),
                        ))
                    }
                }
            }
            ColumnType::Ptr => {
                let addr = self.read_usize()?;
                Value::Ptr(OpaqueRef::from_addr(addr))
            }
        })
    }
}

fn read_table(bytes: &[u8], options: TableOptions) -> Result<Table> {
    let mut reader = Reader::new(bytes);
    let mut table = Table::with_options(options);

    let column_count = reader.read_count(MIN_COLUMN_BYTES)?;
    let mut types = Vec::new();
    types.try_reserve_exact(column_count)?;
    for _ in 0..column_count {
        let offset = reader.offset;
        let tag = reader.read_u8()?;
        let column_type = ColumnType::from_tag(tag).ok_or_else(|| {
            TableError::corrupt(offset, format!("unknown column type tag {tag}"))
        })?;
        let name = reader.read_string()?;
        table.add_column(name, column_type)?;
        types.push(column_type);
    }

    // Each row carries at least one presence byte per column.
    let row_count = reader.read_count(column_count)?;
    for _ in 0..row_count {
        let row = table.add_row()?;
        for (col, column_type) in types.iter().enumerate() {
            let offset = reader.offset;
            match reader.read_u8()? {
                0 => {}
                1 => {
                    let value = reader.read_value(*column_type)?;
                    table.set(row, col, value)?;
                }
                flag => {
                    return Err(TableError::corrupt(
                        offset,
                        format!("invalid presence flag {flag}"),
                    ))
                }
            }
        }
    }

    if reader.remaining() > 0 {
        return Err(TableError::corrupt(
            reader.offset,
            format!("{} trailing bytes", reader.remaining()),
        ));
    }
    Ok(table)
}

impl Table {
    /// Encode the table. Comparators and callbacks are not included.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        write_table(self, &mut out);
        out
    }

    /// Exact length of [`Table::serialize`]'s output.
    pub fn serialized_len(&self) -> usize {
        let mut counter = Counter(0);
        write_table(self, &mut counter);
        counter.0
    }

    /// Encode into `buf`, returning the number of bytes written.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.serialized_len();
        if buf.len() < needed {
            return Err(TableError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        let mut writer = SliceWriter { buf, pos: 0 };
        write_table(self, &mut writer);
        Ok(writer.pos)
    }

    /// Decode a table produced by [`Table::serialize`]. Columns get default comparators.
    pub fn deserialize(bytes: &[u8]) -> Result<Table> {
        Self::deserialize_with_options(bytes, TableOptions::default())
    }

    pub fn deserialize_with_options(bytes: &[u8], options: TableOptions) -> Result<Table> {
        match read_table(bytes, options) {
            Ok(table) => {
                debug!(
                    "deserialized table with {} columns and {} rows",
                    table.column_count(),
                    table.row_count()
                );
                Ok(table)
            }
            Err(err) => {
                warn!("rejected serialized table: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Table {
        let mut table = Table::new();
        table.add_column("id", ColumnType::UInt16).unwrap();
        table.add_column("name", ColumnType::String).unwrap();
        table.add_row().unwrap();
        table.add_row().unwrap();
        table.set_uint16(0, 0, 0x0102).unwrap();
        table.set_string(0, 1, "hi").unwrap();
        table.set_uint16(1, 0, 7).unwrap();
        table
    }

    #[test]
    fn layout_is_little_endian_and_length_prefixed() {
        let bytes = sample().serialize();
        let mut expected = Vec::new();
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.push(ColumnType::UInt16.tag());
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"id");
        expected.push(ColumnType::String.tag());
        expected.extend_from_slice(&4u64.to_le_bytes());
        expected.extend_from_slice(b"name");
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(&[1, 0x02, 0x01]);
        expected.push(1);
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"hi");
        expected.extend_from_slice(&[1, 7, 0]);
        expected.push(0);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn length_matches_output() {
        let table = sample();
        assert_eq!(table.serialized_len(), table.serialize().len());
    }

    #[test]
    fn serialize_into_checks_capacity() {
        let table = sample();
        let needed = table.serialized_len();
        let mut small = vec![0u8; needed - 1];
        assert_eq!(
            table.serialize_into(&mut small),
            Err(TableError::BufferTooSmall {
                needed,
                available: needed - 1,
            })
        );
        let mut exact = vec![0u8; needed + 3];
        assert_eq!(table.serialize_into(&mut exact).unwrap(), needed);
        assert_eq!(&exact[..needed], table.serialize().as_slice());
    }

    #[test]
    fn every_truncation_is_rejected() {
        let bytes = sample().serialize();
        for len in 0..bytes.len() {
            let err = Table::deserialize(&bytes[..len]).unwrap_err();
            assert!(
                matches!(err, TableError::CorruptData { .. }),
                "prefix of {len} bytes gave {err:?}"
            );
        }
    }

    #[test]
    fn unknown_tag_and_bad_flags_are_rejected() {
        let mut bytes = sample().serialize();
        bytes[8] = 200;
        assert_eq!(
            Table::deserialize(&bytes).unwrap_err(),
            TableError::corrupt(8, "unknown column type tag 200")
        );

        let mut bytes = sample().serialize();
        let flag_at = bytes.len() - 1;
        bytes[flag_at] = 2;
        assert_eq!(
            Table::deserialize(&bytes).unwrap_err(),
            TableError::corrupt(flag_at, "invalid presence flag 2")
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = sample().serialize();
        bytes.push(0);
        assert!(matches!(
            Table::deserialize(&bytes),
            Err(TableError::CorruptData { .. })
        ));
    }

    #[test]
    fn huge_counts_do_not_allocate() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            Table::deserialize(&bytes),
            Err(TableError::CorruptData { offset: 0, .. })
        ));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(Table::deserialize(&bytes).is_err());
    }

    #[test]
    fn columnless_rows_survive() {
        let mut table = Table::new();
        table.add_row().unwrap();
        table.add_row().unwrap();
        let back = Table::deserialize(&table.serialize()).unwrap();
        assert_eq!(back.row_count(), 2);
        assert_eq!(back.column_count(), 0);
    }
}
