//! Kind-specific wrappers around [`Table::set`], [`Table::get`], [`Table::find`] and
//! [`Table::sorted_find`].

use crate::search::{Order, Position};
use crate::table::Table;
use crate::value::{for_each_fixed_kind, ColumnType, OpaqueRef, Value};
use crate::Result;

macro_rules! fixed_kind_accessors {
    ($($variant:ident => $ty:ty { $set:ident, $get:ident, $find:ident, $sorted_find:ident };)*) => {
        impl Table {
            $(
                pub fn $set(&mut self, row: usize, col: usize, value: $ty) -> Result<()> {
                    self.set(row, col, Value::$variant(value))
                }

                pub fn $get(&self, row: usize, col: usize) -> Result<Option<$ty>> {
                    self.check_cell(row, col)?;
                    self.check_type(col, ColumnType::$variant)?;
                    Ok(match self.rows[row].get(col) {
                        Some(Value::$variant(value)) => Some(*value),
                        _ => None,
                    })
                }

                pub fn $find(&self, col: usize, value: $ty, order: Order) -> Result<Option<usize>> {
                    self.find(col, &Value::$variant(value), order, None)
                }

                pub fn $sorted_find(
                    &self,
                    col: usize,
                    value: $ty,
                    position: Position,
                ) -> Result<Option<usize>> {
                    self.sorted_find(col, &Value::$variant(value), position, None)
                }
            )*
        }
    };
}

for_each_fixed_kind!(fixed_kind_accessors);

impl Table {
    pub fn set_string(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        self.set(row, col, Value::String(value.into()))
    }

    pub fn get_string(&self, row: usize, col: usize) -> Result<Option<&str>> {
        self.check_cell(row, col)?;
        self.check_type(col, ColumnType::String)?;
        Ok(self.rows[row].get(col).and_then(Value::as_str))
    }

    pub fn find_string(&self, col: usize, value: &str, order: Order) -> Result<Option<usize>> {
        self.find(col, &Value::from(value), order, None)
    }

    pub fn sorted_find_string(
        &self,
        col: usize,
        value: &str,
        position: Position,
    ) -> Result<Option<usize>> {
        self.sorted_find(col, &Value::from(value), position, None)
    }
}
