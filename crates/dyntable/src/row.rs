use crate::value::Value;

/// One record: a cell per column, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Option<Value>>,
}

impl Row {
    /// A row of `columns` absent cells with room for `capacity` without reallocating.
    pub(crate) fn with_capacity(
        capacity: usize,
        columns: usize,
    ) -> Result<Self, std::collections::TryReserveError> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(capacity.max(columns))?;
        cells.resize(columns, None);
        Ok(Self { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }

    /// The value at `column`, or `None` when it is absent or out of range.
    pub fn get(&self, column: usize) -> Option<&Value> {
        self.cells.get(column).and_then(Option::as_ref)
    }

    pub(crate) fn slot_mut(&mut self, column: usize) -> Option<&mut Option<Value>> {
        self.cells.get_mut(column)
    }

    /// Keep spare capacity for `allocated` cells in total.
    pub(crate) fn reserve_to(
        &mut self,
        allocated: usize,
    ) -> Result<(), std::collections::TryReserveError> {
        let additional = allocated.saturating_sub(self.cells.len());
        self.cells.try_reserve_exact(additional)
    }

    pub(crate) fn shrink_to(&mut self, allocated: usize) {
        self.cells.shrink_to(allocated);
    }

    pub(crate) fn push_absent(&mut self) {
        self.cells.push(None);
    }

    pub(crate) fn remove(&mut self, column: usize) -> Option<Value> {
        self.cells.remove(column)
    }
}
