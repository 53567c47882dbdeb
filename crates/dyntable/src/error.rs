use std::fmt;

use thiserror::Error;

use crate::value::ColumnType;

/// Which dimension of the grid an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// Errors returned by table operations.
///
/// Every failure is local to the call that produced it; the table is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },
    #[error("type mismatch in column {column}: column holds {expected}, got {actual}")]
    TypeMismatch {
        column: usize,
        expected: ColumnType,
        actual: ColumnType,
    },
    #[error("allocation failed while growing table storage")]
    AllocationFailed,
    #[error("corrupt table data at byte {offset}: {reason}")]
    CorruptData { offset: usize, reason: String },
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("cannot parse {input:?} as {column_type}")]
    Parse {
        column_type: ColumnType,
        input: String,
    },
}

impl TableError {
    pub(crate) fn row(index: usize, len: usize) -> Self {
        TableError::IndexOutOfRange {
            axis: Axis::Row,
            index,
            len,
        }
    }

    pub(crate) fn column(index: usize, len: usize) -> Self {
        TableError::IndexOutOfRange {
            axis: Axis::Column,
            index,
            len,
        }
    }

    pub(crate) fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        TableError::CorruptData {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<std::collections::TryReserveError> for TableError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TableError::AllocationFailed
    }
}
