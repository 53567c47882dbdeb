//! `dyntable` is an in-memory, dynamically-typed table.
//!
//! The crate focuses on:
//! - Named, typed columns addressed by position, with a per-column comparator.
//! - Row-oriented storage of heterogeneous cells that always stays rectangular.
//! - Linear and binary search, and a stable multi-key merge sort.
//! - Change notification through registered callbacks.
//! - A little-endian, length-prefixed binary encoding of the whole table.
//!
//! Storage for columns, rows and callbacks grows and shrinks in fixed-size blocks (see
//! [`TableOptions`]).

#![forbid(unsafe_code)]

mod access;
mod codec;
mod column;
mod compare;
mod error;
mod event;
mod growth;
mod options;
mod row;
mod search;
mod sort;
mod table;
mod text;
mod value;

pub use crate::column::Column;
pub use crate::compare::Comparator;
pub use crate::error::{Axis, TableError};
pub use crate::event::{callback, context, Callback, Context, EventKind, EventMask, TableEvent};
pub use crate::options::TableOptions;
pub use crate::row::Row;
pub use crate::search::{Order, Position};
pub use crate::sort::SortKey;
pub use crate::table::Table;
pub use crate::value::{ColumnType, OpaqueRef, Value};

pub type Result<T, E = TableError> = std::result::Result<T, E>;
