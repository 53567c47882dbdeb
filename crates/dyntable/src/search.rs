use std::cmp::Ordering;
use std::ops::RangeInclusive;

use crate::compare::Comparator;
use crate::error::TableError;
use crate::table::Table;
use crate::value::Value;
use crate::Result;

/// Direction of a linear scan, or of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

/// Which end of a run of equal values [`Table::sorted_find`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    First,
    Last,
}

/// A validated, non-empty closed row window.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: usize,
    end: usize,
}

impl Table {
    /// Linear search for the first row, in scan order, whose cell in `col` compares equal to
    /// `value` under the column's comparator.
    ///
    /// `rows` restricts the scan to a closed window; `None` scans the whole table.
    pub fn find(
        &self,
        col: usize,
        value: &Value,
        order: Order,
        rows: Option<RangeInclusive<usize>>,
    ) -> Result<Option<usize>> {
        self.check_type(col, value.column_type())?;
        let Some(window) = self.window(rows)? else {
            return Ok(None);
        };
        let comparator = self.columns[col].comparator();
        let matches = |row: &usize| {
            comparator.compare(Some(value), self.rows[*row].get(col)) == Ordering::Equal
        };
        let mut range = window.start..=window.end;
        Ok(match order {
            Order::Ascending => range.find(matches),
            Order::Descending => range.rev().find(matches),
        })
    }

    /// Binary search over a window of `col` that is sorted ascending under the column's
    /// comparator. On a hit, returns the first or last row of the run of equal values,
    /// without leaving the window.
    pub fn sorted_find(
        &self,
        col: usize,
        value: &Value,
        position: Position,
        rows: Option<RangeInclusive<usize>>,
    ) -> Result<Option<usize>> {
        self.check_type(col, value.column_type())?;
        let Some(window) = self.window(rows)? else {
            return Ok(None);
        };
        let search = Bisect {
            table: self,
            col,
            value,
            comparator: self.columns[col].comparator(),
            window,
        };
        Ok(search.run(window.start, window.end, position))
    }

    fn window(&self, rows: Option<RangeInclusive<usize>>) -> Result<Option<Window>> {
        let len = self.rows.len();
        let (start, end) = match rows {
            Some(range) => (*range.start(), *range.end()),
            None if len == 0 => return Ok(None),
            None => (0, len - 1),
        };
        if end >= len {
            return Err(TableError::row(end, len));
        }
        if start > end {
            return Ok(None);
        }
        Ok(Some(Window { start, end }))
    }
}

struct Bisect<'a> {
    table: &'a Table,
    col: usize,
    value: &'a Value,
    comparator: &'a Comparator,
    window: Window,
}

impl Bisect<'_> {
    fn probe(&self, row: usize) -> Ordering {
        self.comparator
            .compare(Some(self.value), self.table.rows[row].get(self.col))
    }

    fn run(&self, min: usize, max: usize, position: Position) -> Option<usize> {
        if min > max {
            return None;
        }
        let middle = min + (max - min) / 2;
        match self.probe(middle) {
            Ordering::Equal => Some(self.run_boundary(middle, position)),
            Ordering::Greater => self.run(middle + 1, max, position),
            Ordering::Less if middle == min => None,
            Ordering::Less => self.run(min, middle - 1, position),
        }
    }

    fn run_boundary(&self, mut row: usize, position: Position) -> usize {
        match position {
            Position::First => {
                while row > self.window.start && self.probe(row - 1) == Ordering::Equal {
                    row -= 1;
                }
            }
            Position::Last => {
                while row < self.window.end && self.probe(row + 1) == Ordering::Equal {
                    row += 1;
                }
            }
        }
        row
    }
}
