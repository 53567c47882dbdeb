use std::cmp::Ordering;

use log::debug;

use crate::compare::Comparator;
use crate::event::{EventKind, TableEvent};
use crate::row::Row;
use crate::search::Order;
use crate::table::Table;
use crate::Result;

/// One level of a multi-key sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub column: usize,
    pub order: Order,
}

impl SortKey {
    pub fn ascending(column: usize) -> Self {
        Self {
            column,
            order: Order::Ascending,
        }
    }

    pub fn descending(column: usize) -> Self {
        Self {
            column,
            order: Order::Descending,
        }
    }
}

/// A sort key bound to the comparator of its column.
struct Key {
    column: usize,
    order: Order,
    comparator: Comparator,
}

impl Key {
    fn compare(&self, left: &Row, right: &Row) -> Ordering {
        self.comparator
            .compare(left.get(self.column), right.get(self.column))
    }

    /// Whether a merge should take `right` before `left`. Ties keep `left` first.
    fn takes_right(&self, left: &Row, right: &Row) -> bool {
        match self.order {
            Order::Ascending => self.compare(left, right) == Ordering::Greater,
            Order::Descending => self.compare(left, right) == Ordering::Less,
        }
    }
}

impl Table {
    /// Stable multi-key sort of all rows.
    ///
    /// Rows are ordered by the first key; each later key only reorders runs of adjacent rows
    /// that are equal on every earlier key. All key columns are validated before any row
    /// moves. Emits a single `Sorted` event, also for an empty key list.
    pub fn sort(&mut self, keys: &[SortKey]) -> Result<()> {
        for key in keys {
            self.check_column(key.column)?;
        }
        let keys: Vec<Key> = keys
            .iter()
            .map(|key| Key {
                column: key.column,
                order: key.order,
                comparator: self.columns[key.column].comparator().clone(),
            })
            .collect();

        let rows = self.rows.as_mut_slice();
        let mut scratch = Vec::new();
        scratch.try_reserve_exact(rows.len())?;

        if let Some((first, rest)) = keys.split_first() {
            merge_sort(rows, &mut scratch, first);
            for (depth, key) in rest.iter().enumerate() {
                let prefix = &keys[..=depth];
                let mut start = 0;
                for end in 1..=rows.len() {
                    if end < rows.len() && equal_on(prefix, &rows[end - 1], &rows[end]) {
                        continue;
                    }
                    if end - start > 1 {
                        merge_sort(&mut rows[start..end], &mut scratch, key);
                    }
                    start = end;
                }
            }
        }

        debug!("sorted {} rows by {} keys", self.rows.len(), keys.len());
        self.notify(TableEvent::table(EventKind::Sorted));
        Ok(())
    }
}

/// Equal under every key of `prefix`, checked from the innermost key outward.
fn equal_on(prefix: &[Key], a: &Row, b: &Row) -> bool {
    prefix
        .iter()
        .rev()
        .all(|key| key.compare(a, b) == Ordering::Equal)
}

fn merge_sort(rows: &mut [Row], scratch: &mut Vec<Row>, key: &Key) {
    if rows.len() < 2 {
        return;
    }
    let middle = rows.len() / 2;
    merge_sort(&mut rows[..middle], scratch, key);
    merge_sort(&mut rows[middle..], scratch, key);
    merge(rows, middle, scratch, key);
}

/// Merge the sorted halves `rows[..middle]` and `rows[middle..]` through `scratch`.
fn merge(rows: &mut [Row], middle: usize, scratch: &mut Vec<Row>, key: &Key) {
    scratch.clear();
    let (mut left, mut right) = (0, middle);
    while left < middle && right < rows.len() {
        if key.takes_right(&rows[left], &rows[right]) {
            scratch.push(std::mem::take(&mut rows[right]));
            right += 1;
        } else {
            scratch.push(std::mem::take(&mut rows[left]));
            left += 1;
        }
    }
    scratch.extend(rows[left..middle].iter_mut().map(std::mem::take));
    scratch.extend(rows[right..].iter_mut().map(std::mem::take));
    for (slot, row) in rows.iter_mut().zip(scratch.drain(..)) {
        *slot = row;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::TableError;
    use crate::value::ColumnType;

    fn pairs(table: &Table) -> Vec<(Option<i32>, Option<String>)> {
        (0..table.row_count())
            .map(|row| {
                (
                    table.get_int(row, 0).unwrap(),
                    table.get_string(row, 1).unwrap().map(str::to_string),
                )
            })
            .collect()
    }

    fn table_of(rows: &[(i32, &str)]) -> Table {
        let mut table = Table::new();
        table.add_column("id", ColumnType::Int).unwrap();
        table.add_column("name", ColumnType::String).unwrap();
        for (id, name) in rows {
            let row = table.add_row().unwrap();
            table.set_int(row, 0, *id).unwrap();
            table.set_string(row, 1, *name).unwrap();
        }
        table
    }

    #[test]
    fn later_keys_only_break_ties() {
        let mut table = table_of(&[(1, "b"), (3, "a"), (2, "a")]);
        table
            .sort(&[SortKey::ascending(1), SortKey::ascending(0)])
            .unwrap();
        assert_eq!(
            pairs(&table),
            vec![
                (Some(2), Some("a".to_string())),
                (Some(3), Some("a".to_string())),
                (Some(1), Some("b".to_string())),
            ]
        );
    }

    #[test]
    fn descending_is_stable() {
        let mut table = table_of(&[(1, "x"), (2, "y"), (1, "z"), (2, "w")]);
        table.sort(&[SortKey::descending(0)]).unwrap();
        let names: Vec<_> = pairs(&table).into_iter().map(|(_, n)| n.unwrap()).collect();
        assert_eq!(names, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn absent_cells_sort_first_ascending() {
        let mut table = table_of(&[(3, "c"), (1, "a")]);
        table.add_row().unwrap();
        table.sort(&[SortKey::ascending(0)]).unwrap();
        assert_eq!(table.get_int(0, 0).unwrap(), None);
        assert_eq!(table.get_int(1, 0).unwrap(), Some(1));
    }

    #[test]
    fn invalid_key_leaves_rows_untouched() {
        let mut table = table_of(&[(2, "b"), (1, "a")]);
        let err = table
            .sort(&[SortKey::ascending(0), SortKey::ascending(5)])
            .unwrap_err();
        assert_eq!(err, TableError::column(5, 2));
        assert_eq!(table.get_int(0, 0).unwrap(), Some(2));
    }

    #[test]
    fn custom_comparator_drives_the_order() {
        let mut table = table_of(&[(1, "ccc"), (2, "a"), (3, "bb")]);
        table
            .set_column_comparator(
                1,
                Comparator::from_values(|a, b| {
                    let a = a.as_str().map_or(0, str::len);
                    let b = b.as_str().map_or(0, str::len);
                    a.cmp(&b)
                }),
            )
            .unwrap();
        table.sort(&[SortKey::ascending(1)]).unwrap();
        let ids: Vec<_> = pairs(&table).into_iter().map(|(id, _)| id.unwrap()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
