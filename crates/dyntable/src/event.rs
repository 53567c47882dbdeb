use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::TableError;
use crate::growth::BlockVec;
use crate::table::Table;

/// Caller-owned data handed back to a callback on every dispatch.
pub type Context = Arc<dyn Any + Send + Sync>;

/// A change listener. Identity is the `Arc` allocation, so clone the same `Arc` to refer to a
/// registration later.
pub type Callback = Arc<dyn Fn(&Table, &TableEvent, &(dyn Any + Send + Sync)) + Send + Sync>;

/// Wrap a closure as a [`Callback`].
pub fn callback<F>(func: F) -> Callback
where
    F: Fn(&Table, &TableEvent, &(dyn Any + Send + Sync)) + Send + Sync + 'static,
{
    Arc::new(func)
}

/// Wrap any value as a [`Context`].
pub fn context<T: Any + Send + Sync>(value: T) -> Context {
    Arc::new(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DataModified,
    RowAdded,
    RowRemoved,
    ColumnAdded,
    ColumnRemoved,
    Sorted,
    Destroyed,
}

impl EventKind {
    pub fn mask(self) -> EventMask {
        match self {
            EventKind::DataModified => EventMask::DATA_MODIFIED,
            EventKind::RowAdded => EventMask::ROW_ADDED,
            EventKind::RowRemoved => EventMask::ROW_REMOVED,
            EventKind::ColumnAdded => EventMask::COLUMN_ADDED,
            EventKind::ColumnRemoved => EventMask::COLUMN_REMOVED,
            EventKind::Sorted => EventMask::SORTED,
            EventKind::Destroyed => EventMask::DESTROYED,
        }
    }
}

bitflags::bitflags! {
    /// Set of [`EventKind`]s a callback subscribes to.
    ///
    /// Combine with bitwise OR: `EventMask::ROW_ADDED | EventMask::ROW_REMOVED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u32 {
        const DATA_MODIFIED = 1 << 0;
        const ROW_ADDED = 1 << 1;
        const ROW_REMOVED = 1 << 2;
        const COLUMN_ADDED = 1 << 3;
        const COLUMN_REMOVED = 1 << 4;
        const SORTED = 1 << 5;
        const DESTROYED = 1 << 6;
    }
}

impl From<EventKind> for EventMask {
    fn from(kind: EventKind) -> Self {
        kind.mask()
    }
}

/// What changed. `row`/`column` are `None` when the event is not about a single row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEvent {
    pub kind: EventKind,
    pub row: Option<usize>,
    pub column: Option<usize>,
}

impl TableEvent {
    pub(crate) fn table(kind: EventKind) -> Self {
        Self {
            kind,
            row: None,
            column: None,
        }
    }

    pub(crate) fn row(kind: EventKind, row: usize) -> Self {
        Self {
            kind,
            row: Some(row),
            column: None,
        }
    }

    pub(crate) fn column(kind: EventKind, column: usize) -> Self {
        Self {
            kind,
            row: None,
            column: Some(column),
        }
    }

    pub(crate) fn cell(kind: EventKind, row: usize, column: usize) -> Self {
        Self {
            kind,
            row: Some(row),
            column: Some(column),
        }
    }
}

struct Registration {
    callback: Callback,
    context: Context,
    mask: EventMask,
}

impl Registration {
    fn matches(&self, callback: &Callback, context: &Context) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(callback))
            && std::ptr::addr_eq(Arc::as_ptr(&self.context), Arc::as_ptr(context))
    }
}

/// Registered callbacks in registration order, unique per `(callback, context)` pair.
pub(crate) struct Callbacks {
    entries: BlockVec<Registration>,
}

impl Callbacks {
    pub fn new(block: usize) -> Self {
        Self {
            entries: BlockVec::new(block),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn allocated(&self) -> usize {
        self.entries.allocated()
    }

    pub fn register(
        &mut self,
        callback: Callback,
        context: Context,
        mask: EventMask,
    ) -> Result<(), TableError> {
        if let Some(index) = self
            .entries
            .position(|entry| entry.matches(&callback, &context))
        {
            let entry = &mut self.entries[index];
            entry.mask |= mask;
            log::trace!("merged callback {index} mask to {:?}", entry.mask);
            return Ok(());
        }
        self.entries.push(Registration {
            callback,
            context,
            mask,
        })?;
        Ok(())
    }

    pub fn unregister(&mut self, callback: &Callback, context: &Context) -> bool {
        match self
            .entries
            .position(|entry| entry.matches(callback, context))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn dispatch(&self, table: &Table, event: &TableEvent) {
        let wanted = event.kind.mask();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.mask.contains(wanted) {
                log::trace!("dispatching {:?} to callback {index}", event.kind);
                (entry.callback)(table, event, entry.context.as_ref());
            }
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.mask))
            .finish()
    }
}
