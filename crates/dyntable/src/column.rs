use crate::compare::Comparator;
use crate::value::ColumnType;

/// A named, typed column and the comparator used to order its cells.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    comparator: Comparator,
}

impl Column {
    pub(crate) fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            comparator: Comparator::default_for(column_type),
        }
    }

    /// Column names are not required to be unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    pub(crate) fn set_comparator(&mut self, comparator: Comparator) {
        self.comparator = comparator;
    }
}
