use std::fmt;
use std::str::FromStr;

use crate::error::TableError;
use crate::table::Table;
use crate::value::{ColumnType, OpaqueRef, Value};
use crate::Result;

/// Human-readable rendering: decimal integers, shortest round-trip floats, `true`/`false`,
/// chars as their Latin-1 character, refs as `0x`-prefixed hex and text verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) | Value::Int32(v) => write!(f, "{v}"),
            Value::UInt(v) | Value::UInt32(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::UInt8(v) => write!(f, "{v}"),
            Value::Int16(v) | Value::Short(v) => write!(f, "{v}"),
            Value::UInt16(v) | Value::UShort(v) => write!(f, "{v}"),
            Value::Int64(v) | Value::Long(v) | Value::LLong(v) => write!(f, "{v}"),
            Value::UInt64(v) | Value::ULong(v) | Value::ULLong(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) | Value::LDouble(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{}", char::from(*v as u8)),
            Value::UChar(v) => write!(f, "{}", char::from(*v)),
            Value::String(s) => f.write_str(s),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Ptr(p) => write!(f, "{p}"),
        }
    }
}

impl Value {
    /// Parse `input` as a value of `column_type`; the inverse of the `Display` rendering.
    ///
    /// Numbers may be surrounded by whitespace. Bools accept `true`/`false`/`1`/`0` in any
    /// case. Refs accept hex with or without a `0x` prefix.
    pub fn parse(column_type: ColumnType, input: &str) -> Result<Value> {
        let fail = || TableError::Parse {
            column_type,
            input: input.to_string(),
        };
        let trimmed = input.trim();
        let value = match column_type {
            ColumnType::Int => Value::Int(number(trimmed).ok_or_else(fail)?),
            ColumnType::UInt => Value::UInt(number(trimmed).ok_or_else(fail)?),
            ColumnType::Int8 => Value::Int8(number(trimmed).ok_or_else(fail)?),
            ColumnType::UInt8 => Value::UInt8(number(trimmed).ok_or_else(fail)?),
            ColumnType::Int16 => Value::Int16(number(trimmed).ok_or_else(fail)?),
            ColumnType::UInt16 => Value::UInt16(number(trimmed).ok_or_else(fail)?),
            ColumnType::Int32 => Value::Int32(number(trimmed).ok_or_else(fail)?),
            ColumnType::UInt32 => Value::UInt32(number(trimmed).ok_or_else(fail)?),
            ColumnType::Int64 => Value::Int64(number(trimmed).ok_or_else(fail)?),
            ColumnType::UInt64 => Value::UInt64(number(trimmed).ok_or_else(fail)?),
            ColumnType::Short => Value::Short(number(trimmed).ok_or_else(fail)?),
            ColumnType::UShort => Value::UShort(number(trimmed).ok_or_else(fail)?),
            ColumnType::Long => Value::Long(number(trimmed).ok_or_else(fail)?),
            ColumnType::ULong => Value::ULong(number(trimmed).ok_or_else(fail)?),
            ColumnType::LLong => Value::LLong(number(trimmed).ok_or_else(fail)?),
            ColumnType::ULLong => Value::ULLong(number(trimmed).ok_or_else(fail)?),
            ColumnType::Float => Value::Float(number(trimmed).ok_or_else(fail)?),
            ColumnType::Double => Value::Double(number(trimmed).ok_or_else(fail)?),
            ColumnType::LDouble => Value::LDouble(number(trimmed).ok_or_else(fail)?),
            ColumnType::Char => Value::Char(latin1(input).ok_or_else(fail)? as i8),
            ColumnType::UChar => Value::UChar(latin1(input).ok_or_else(fail)?),
            ColumnType::String => Value::String(input.to_string()),
            ColumnType::Bool => Value::Bool(boolean(trimmed).ok_or_else(fail)?),
            ColumnType::Ptr => Value::Ptr(opaque_ref(trimmed).ok_or_else(fail)?),
        };
        Ok(value)
    }
}

fn number<T: FromStr>(input: &str) -> Option<T> {
    input.parse().ok()
}

/// Exactly one character in `U+0000..=U+00FF`.
fn latin1(input: &str) -> Option<u8> {
    let mut chars = input.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    u8::try_from(u32::from(c)).ok()
}

fn boolean(input: &str) -> Option<bool> {
    if input.eq_ignore_ascii_case("true") || input == "1" {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") || input == "0" {
        Some(false)
    } else {
        None
    }
}

fn opaque_ref(input: &str) -> Option<OpaqueRef> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    usize::from_str_radix(digits, 16)
        .ok()
        .map(OpaqueRef::from_addr)
}

impl Table {
    /// Render a cell as text. Absent cells render as the empty string.
    pub fn cell_to_text(&self, row: usize, col: usize) -> Result<String> {
        Ok(self
            .get(row, col)?
            .map(Value::to_string)
            .unwrap_or_default())
    }

    /// Parse `input` according to the column's kind and store it.
    pub fn cell_from_text(&mut self, row: usize, col: usize, input: &str) -> Result<()> {
        self.check_cell(row, col)?;
        let value = Value::parse(self.column_type(col)?, input)?;
        self.set(row, col, value)
    }
}
