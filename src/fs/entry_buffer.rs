use crate::DirError;
use crate::fs::{DirEntry, GROWTH_FACTOR, INITIAL_CAPACITY, Result};
use core::cmp::Ordering;

/**
 A growable array of [`DirEntry`] with an explicit growth policy.

 Starts with room for [`INITIAL_CAPACITY`] entries and multiplies its capacity
 by [`GROWTH_FACTOR`] whenever the next push would overflow. Every allocation
 goes through `try_reserve_exact`, so running out of memory surfaces as
 [`DirError::OutOfMemory`] rather than an abort. Entries are moved in and out,
 never copied.
*/
#[derive(Debug, Default)]
pub struct EntryBuffer {
    entries: Vec<DirEntry>,
}

impl EntryBuffer {
    /// Allocates an empty buffer with the initial capacity.
    ///
    /// # Errors
    /// [`DirError::OutOfMemory`] if the initial block cannot be allocated.
    pub fn new() -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(INITIAL_CAPACITY)?;
        Ok(Self { entries })
    }

    /// Appends an entry, growing by [`GROWTH_FACTOR`] first if the buffer is full.
    ///
    /// # Errors
    /// [`DirError::OutOfMemory`] if growing fails. The buffer is left as it was
    /// and `entry` is dropped.
    pub fn push(&mut self, entry: DirEntry) -> Result<()> {
        if self.entries.len() == self.entries.capacity() {
            self.grow()?;
        }
        self.entries.push(entry);
        Ok(())
    }

    fn grow(&mut self) -> Result<()> {
        let current = self.entries.capacity().max(1);
        let target = current
            .checked_mul(GROWTH_FACTOR)
            .ok_or(DirError::OutOfMemory)?;
        let additional = target - self.entries.len();
        self.entries.try_reserve_exact(additional)?;
        tracing::trace!(from = current, to = target, "grew entry buffer");
        Ok(())
    }

    /// Sorts once, in place, with the supplied comparator.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&DirEntry, &DirEntry) -> Ordering,
    {
        self.entries.sort_by(compare);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Hands the entries over, no copying.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<DirEntry> {
        self.entries
    }
}
