use std::collections::TryReserveError;

/// A vector whose capacity moves in whole blocks.
///
/// Capacity is reserved one block at a time when a push lands on a block boundary, and
/// released one block at a time when a removal leaves the length on a block boundary, so the
/// tracked allocation is always `ceil(len / block) * block`.
#[derive(Debug, Clone)]
pub(crate) struct BlockVec<T> {
    items: Vec<T>,
    block: usize,
    allocated: usize,
}

impl<T> BlockVec<T> {
    pub fn new(block: usize) -> Self {
        Self {
            items: Vec::new(),
            block: block.max(1),
            allocated: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of slots reserved under the block policy.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// `true` when the next push has to reserve a new block first.
    pub fn at_block_boundary(&self) -> bool {
        self.items.len() % self.block == 0 && self.items.len() == self.allocated
    }

    /// Reserve the next block if the next push needs it. Returns whether a block was added.
    pub fn reserve_for_push(&mut self) -> Result<bool, TryReserveError> {
        if !self.at_block_boundary() {
            return Ok(false);
        }
        let target = self.allocated + self.block;
        self.items.try_reserve_exact(target - self.items.len())?;
        self.allocated = target;
        log::trace!("grew block storage to {} slots", self.allocated);
        Ok(true)
    }

    pub fn push(&mut self, item: T) -> Result<(), TryReserveError> {
        self.reserve_for_push()?;
        self.items.push(item);
        Ok(())
    }

    /// Remove `index`, shifting later items down. Returns the item and whether a block was
    /// released.
    pub fn remove(&mut self, index: usize) -> (T, bool) {
        let item = self.items.remove(index);
        let released = self.items.len() % self.block == 0 && self.allocated >= self.block;
        if released {
            self.allocated -= self.block;
            self.items.shrink_to(self.allocated);
            log::trace!("released block storage down to {} slots", self.allocated);
        }
        (item, released)
    }

    pub fn position(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(|item| predicate(item))
    }
}

impl<T> std::ops::Index<usize> for BlockVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> std::ops::IndexMut<usize> for BlockVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a BlockVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
