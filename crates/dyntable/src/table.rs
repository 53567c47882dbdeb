use std::fmt;

use log::{debug, warn};

use crate::column::Column;
use crate::compare::Comparator;
use crate::error::TableError;
use crate::event::{Callback, Callbacks, Context, EventKind, EventMask, TableEvent};
use crate::growth::BlockVec;
use crate::options::TableOptions;
use crate::row::Row;
use crate::value::{ColumnType, Value};
use crate::Result;

/// An in-memory grid of typed columns and rows of optional cells.
///
/// The grid is always rectangular: every row holds exactly one cell per column. Every
/// successful mutation is reported to the registered callbacks after it has been applied.
pub struct Table {
    pub(crate) columns: BlockVec<Column>,
    pub(crate) rows: BlockVec<Row>,
    callbacks: Callbacks,
    options: TableOptions,
}

impl Table {
    pub fn new() -> Self {
        Self::with_options(TableOptions::default())
    }

    pub fn with_options(options: TableOptions) -> Self {
        let options = options.normalized();
        Self {
            columns: BlockVec::new(options.column_block),
            rows: BlockVec::new(options.row_block),
            callbacks: Callbacks::new(options.callback_block),
            options,
        }
    }

    pub fn options(&self) -> TableOptions {
        self.options
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn allocated_columns(&self) -> usize {
        self.columns.allocated()
    }

    pub fn allocated_rows(&self) -> usize {
        self.rows.allocated()
    }

    pub fn allocated_callbacks(&self) -> usize {
        self.callbacks.allocated()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    // Columns

    pub fn columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter()
    }

    pub fn column(&self, col: usize) -> Result<&Column> {
        self.columns
            .get(col)
            .ok_or_else(|| TableError::column(col, self.columns.len()))
    }

    pub fn column_name(&self, col: usize) -> Result<&str> {
        self.column(col).map(Column::name)
    }

    pub fn column_type(&self, col: usize) -> Result<ColumnType> {
        self.column(col).map(Column::column_type)
    }

    /// Index of the first column named exactly `name`.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.position(|column| column.name() == name)
    }

    pub fn column_comparator(&self, col: usize) -> Result<&Comparator> {
        self.column(col).map(Column::comparator)
    }

    pub fn set_column_comparator(&mut self, col: usize, comparator: Comparator) -> Result<()> {
        let len = self.columns.len();
        let column = self
            .columns
            .get_mut(col)
            .ok_or_else(|| TableError::column(col, len))?;
        column.set_comparator(comparator);
        Ok(())
    }

    /// Append a column and an absent cell for it in every row. Returns the new column's index.
    pub fn add_column(&mut self, name: impl Into<String>, column_type: ColumnType) -> Result<usize> {
        let index = self.columns.len();
        if self.columns.reserve_for_push()? {
            let allocated = self.columns.allocated();
            for row in self.rows.iter_mut() {
                row.reserve_to(allocated)?;
            }
        }
        let column = Column::new(name, column_type);
        debug!("adding column {index} {:?} ({column_type})", column.name());
        self.columns.push(column)?;
        for row in self.rows.iter_mut() {
            row.push_absent();
        }
        self.notify(TableEvent::column(EventKind::ColumnAdded, index));
        Ok(index)
    }

    /// Remove a column and its cell from every row. Later columns shift left.
    pub fn remove_column(&mut self, col: usize) -> Result<()> {
        self.check_column(col)?;
        let (column, released) = self.columns.remove(col);
        debug!("removed column {col} {:?}", column.name());
        let allocated = self.columns.allocated();
        for row in self.rows.iter_mut() {
            row.remove(col);
            if released {
                row.shrink_to(allocated);
            }
        }
        self.notify(TableEvent::column(EventKind::ColumnRemoved, col));
        Ok(())
    }

    // Rows

    pub fn rows(&self) -> &[Row] {
        self.rows.as_slice()
    }

    pub fn row(&self, row: usize) -> Result<&Row> {
        self.rows
            .get(row)
            .ok_or_else(|| TableError::row(row, self.rows.len()))
    }

    /// Append a row with every cell absent. Returns the new row's index.
    pub fn add_row(&mut self) -> Result<usize> {
        let index = self.rows.len();
        let row = Row::with_capacity(self.columns.allocated(), self.columns.len())?;
        self.rows.push(row)?;
        debug!("added row {index}");
        self.notify(TableEvent::row(EventKind::RowAdded, index));
        Ok(index)
    }

    /// Remove a row, dropping its values. Later rows shift up.
    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        self.rows.remove(row);
        debug!("removed row {row}");
        self.notify(TableEvent::row(EventKind::RowRemoved, row));
        Ok(())
    }

    // Validation

    pub fn column_is_valid(&self, col: usize) -> bool {
        col < self.columns.len()
    }

    pub fn row_is_valid(&self, row: usize) -> bool {
        row < self.rows.len()
    }

    pub fn cell_is_valid(&self, row: usize, col: usize) -> bool {
        self.row_is_valid(row) && self.column_is_valid(col)
    }

    /// `true` when the cell exists and holds a value.
    pub fn has_value(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|cells| cells.get(col).is_some())
    }

    pub(crate) fn check_column(&self, col: usize) -> Result<()> {
        if self.column_is_valid(col) {
            Ok(())
        } else {
            Err(TableError::column(col, self.columns.len()))
        }
    }

    pub(crate) fn check_row(&self, row: usize) -> Result<()> {
        if self.row_is_valid(row) {
            Ok(())
        } else {
            Err(TableError::row(row, self.rows.len()))
        }
    }

    pub(crate) fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        self.check_row(row)?;
        self.check_column(col)
    }

    /// Fail with `TypeMismatch` unless column `col` holds `requested`.
    pub(crate) fn check_type(&self, col: usize, requested: ColumnType) -> Result<()> {
        let expected = self.column_type(col)?;
        if expected == requested {
            Ok(())
        } else {
            Err(TableError::TypeMismatch {
                column: col,
                expected,
                actual: requested,
            })
        }
    }

    // Cells

    /// Store `value` in a cell. The value's kind must match the column's.
    pub fn set(&mut self, row: usize, col: usize, value: Value) -> Result<()> {
        self.check_cell(row, col)?;
        if let Err(err) = self.check_type(col, value.column_type()) {
            warn!("rejected set at ({row}, {col}): {err}");
            return Err(err);
        }
        self.store(row, col, Some(value));
        Ok(())
    }

    /// The cell's value, `None` when absent.
    pub fn get(&self, row: usize, col: usize) -> Result<Option<&Value>> {
        self.check_cell(row, col)?;
        Ok(self.rows[row].get(col))
    }

    /// Clear a cell back to absent.
    pub fn nullify(&mut self, row: usize, col: usize) -> Result<()> {
        self.check_cell(row, col)?;
        self.store(row, col, None);
        Ok(())
    }

    fn store(&mut self, row: usize, col: usize, value: Option<Value>) {
        if let Some(slot) = self.rows[row].slot_mut(col) {
            *slot = value;
        }
        self.notify(TableEvent::cell(EventKind::DataModified, row, col));
    }

    // Callbacks

    /// Subscribe `callback` with `context` to the events in `mask`. Registering the same pair
    /// again widens the existing subscription instead of adding a second one.
    pub fn register_callback(
        &mut self,
        callback: Callback,
        context: Context,
        mask: EventMask,
    ) -> Result<()> {
        self.callbacks.register(callback, context, mask)
    }

    /// Remove the registration for exactly this pair. Returns whether one existed.
    pub fn unregister_callback(&mut self, callback: &Callback, context: &Context) -> bool {
        self.callbacks.unregister(callback, context)
    }

    pub(crate) fn notify(&self, event: TableEvent) {
        self.callbacks.dispatch(self, &event);
    }

    /// A deep copy of the columns, comparators and cells. Callbacks are not carried over.
    pub fn duplicate(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            callbacks: Callbacks::new(self.options.callback_block),
            options: self.options,
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Table {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        self.notify(TableEvent::table(EventKind::Destroyed));
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns.as_slice())
            .field("rows", &self.rows.as_slice())
            .field("callbacks", &self.callbacks)
            .field("options", &self.options)
            .finish()
    }
}
