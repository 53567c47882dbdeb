//! JSON import and export for [`dyntable::Table`].
//!
//! Document shape:
//!
//! ```json
//! {
//!   "columns": [{ "name": "id", "data_type": 0 }, { "name": "label", "data_type": 21 }],
//!   "rows": [[1, "a"], [2, null]]
//! }
//! ```
//!
//! `data_type` is the column's numeric type tag. `null` is an absent cell. Numeric kinds are
//! written as JSON numbers (non-finite floats as strings), `bool` as a JSON boolean, and text,
//! chars and refs as strings. On import every scalar is converted to text and parsed according
//! to its column's kind.

#![forbid(unsafe_code)]

use dyntable::{ColumnType, Table, TableError, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("unknown column type tag {0}")]
    UnknownTypeTag(u8),
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({row}, {column}) must be a scalar or null")]
    UnsupportedCell { row: usize, column: usize },
}

pub type Result<T, E = JsonError> = std::result::Result<T, E>;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    columns: Vec<ColumnDoc>,
    #[serde(default)]
    rows: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnDoc {
    name: String,
    data_type: u8,
}

fn cell_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Float(v) => float_to_json(f64::from(*v)),
        Value::Double(v) | Value::LDouble(v) => float_to_json(*v),
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::String(_) | Value::Char(_) | Value::UChar(_) | Value::Ptr(_) => {
            JsonValue::String(value.to_string())
        }
        other => match other.as_i128() {
            Some(n) => integer_to_json(n),
            None => JsonValue::String(other.to_string()),
        },
    }
}

fn integer_to_json(n: i128) -> JsonValue {
    if let Ok(v) = i64::try_from(n) {
        JsonValue::from(v)
    } else if let Ok(v) = u64::try_from(n) {
        JsonValue::from(v)
    } else {
        JsonValue::String(n.to_string())
    }
}

fn float_to_json(v: f64) -> JsonValue {
    Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

/// Export `table` as a JSON document.
pub fn table_to_json(table: &Table) -> Result<JsonValue> {
    let document = Document {
        columns: table
            .columns()
            .map(|column| ColumnDoc {
                name: column.name().to_string(),
                data_type: column.column_type().tag(),
            })
            .collect(),
        rows: table
            .rows()
            .iter()
            .map(|row| {
                row.cells()
                    .iter()
                    .map(|cell| cell.as_ref().map_or(JsonValue::Null, cell_to_json))
                    .collect()
            })
            .collect(),
    };
    Ok(serde_json::to_value(document)?)
}

pub fn table_to_json_string(table: &Table) -> Result<String> {
    Ok(serde_json::to_string(&table_to_json(table)?)?)
}

/// Build a table from a JSON document. Columns get their default comparators.
pub fn table_from_json(json: &JsonValue) -> Result<Table> {
    let document = Document::deserialize(json)?;
    let mut table = Table::new();
    for column in &document.columns {
        let column_type = ColumnType::from_tag(column.data_type)
            .ok_or(JsonError::UnknownTypeTag(column.data_type))?;
        table.add_column(column.name.as_str(), column_type)?;
    }

    let width = table.column_count();
    for (index, cells) in document.rows.iter().enumerate() {
        if cells.len() != width {
            return Err(JsonError::RowWidth {
                row: index,
                expected: width,
                found: cells.len(),
            });
        }
        let row = table.add_row()?;
        for (col, cell) in cells.iter().enumerate() {
            let text = match cell {
                JsonValue::Null => continue,
                JsonValue::Bool(b) => b.to_string(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::String(s) => s.clone(),
                JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(JsonError::UnsupportedCell { row, column: col })
                }
            };
            table.cell_from_text(row, col, &text)?;
        }
    }
    log::debug!(
        "imported table with {} columns and {} rows from JSON",
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

pub fn table_from_json_str(json: &str) -> Result<Table> {
    let value: JsonValue = serde_json::from_str(json)?;
    table_from_json(&value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn exports_scalars_by_family() {
        assert_eq!(cell_to_json(&Value::UInt64(u64::MAX)), json!(u64::MAX));
        assert_eq!(cell_to_json(&Value::Int8(-3)), json!(-3));
        assert_eq!(cell_to_json(&Value::Bool(true)), json!(true));
        assert_eq!(cell_to_json(&Value::UChar(b'z')), json!("z"));
        assert_eq!(cell_to_json(&Value::Double(0.5)), json!(0.5));
        assert_eq!(cell_to_json(&Value::Double(f64::INFINITY)), json!("inf"));
    }

    #[test]
    fn rows_default_to_empty() {
        let table = table_from_json(&json!({ "columns": [] })).unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }
}
