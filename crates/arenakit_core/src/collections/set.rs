//! # Dense Set
//!
//! A pool arena paired with an order array. The order array maps each logical
//! position `0..len` to the pool slot holding that element, so:
//! - Removal is O(1): the last position is swapped into the hole and no
//!   element bytes move
//! - Iteration walks a contiguous `u32` array
//! - Element storage never relocates while the element is live

use std::iter::FusedIterator;

use bytemuck::Pod;

use crate::error::{ArenaError, ArenaResult};
use crate::memory::{Backing, BumpArena, PoolArena};

/// Fixed-capacity unordered collection with O(1) add, index and remove.
///
/// Enumeration order is insertion order until the first removal; `remove(i)`
/// moves the element that was last into position `i`.
///
/// # Example
///
/// ```rust
/// use arenakit_core::DenseSet;
///
/// let mut set: DenseSet<'_, u32> = DenseSet::new(8);
/// set.add(10).unwrap();
/// set.add(20).unwrap();
/// set.add(30).unwrap();
///
/// assert_eq!(set.remove(0).unwrap(), 10);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![30, 20]);
/// ```
pub struct DenseSet<'a, T: Pod> {
    /// Element storage.
    slots: PoolArena<'a, T>,
    /// Slot index per logical position; only `..len` is meaningful.
    order: Backing<'a, u32>,
    /// Number of elements.
    len: u32,
}

impl<T: Pod> DenseSet<'static, T> {
    /// Creates a set that owns its storage on the heap.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of elements
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: PoolArena::new(capacity),
            order: Backing::owned(capacity as usize),
            len: 0,
        }
    }
}

impl<'a, T: Pod> DenseSet<'a, T> {
    /// Carves a set out of `bump`: the order array, then the pool.
    ///
    /// # Errors
    ///
    /// [`ArenaError::OutOfCapacity`] if `bump` cannot fit the set.
    pub fn carve(bump: &'a BumpArena<'_>, capacity: u32) -> ArenaResult<Self> {
        let order = Backing::carve(bump, capacity as usize)?;
        let slots = PoolArena::carve(bump, capacity)?;
        Ok(Self {
            slots,
            order,
            len: 0,
        })
    }

    /// Worst-case bump bytes [`carve`](Self::carve) needs for `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityOverflow`] if the byte count overflows `usize`.
    pub fn footprint(capacity: u32) -> ArenaResult<usize> {
        Backing::<u32>::footprint(capacity as usize)?
            .checked_add(PoolArena::<T>::footprint(capacity)?)
            .ok_or(ArenaError::CapacityOverflow(capacity as usize))
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Checks if empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Checks if full.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len >= self.slots.capacity()
    }

    /// Copies `value` into the set and returns its position.
    ///
    /// # Errors
    ///
    /// [`ArenaError::SetFull`] if the set holds `capacity` elements. The set
    /// is left unchanged.
    pub fn add(&mut self, value: T) -> ArenaResult<usize> {
        if self.is_full() {
            tracing::debug!(capacity = self.capacity(), "set full");
            return Err(ArenaError::SetFull {
                capacity: self.capacity(),
            });
        }

        let slot = self.slots.allocate_index(value)?;
        let position = self.len as usize;
        self.order[position] = slot;
        self.len += 1;
        Ok(position)
    }

    /// Returns the element at `position` in enumeration order.
    #[inline]
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&T> {
        let slot = *self.order[..self.len()].get(position)?;
        Some(self.slots.slot(slot))
    }

    /// Returns the element at `position` mutably.
    #[inline]
    pub fn at_mut(&mut self, position: usize) -> Option<&mut T> {
        let len = self.len();
        let slot = *self.order[..len].get(position)?;
        Some(self.slots.slot_mut(slot))
    }

    /// Removes and returns the element at `position`.
    ///
    /// The last element moves into `position`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidIndex`] if `position >= len`.
    pub fn remove(&mut self, position: usize) -> ArenaResult<T> {
        let len = self.len();
        if position >= len {
            return Err(ArenaError::InvalidIndex {
                index: position,
                len,
            });
        }

        let slot = self.order[position];
        self.order[position] = self.order[len - 1];
        self.len -= 1;
        Ok(self.slots.free_index(slot))
    }

    /// Removes every element at once.
    pub fn clear(&mut self) {
        self.slots.empty();
        self.len = 0;
    }

    /// Iterates over the elements in enumeration order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, 'a, T> {
        Iter {
            order: self.order[..self.len()].iter(),
            slots: &self.slots,
        }
    }

    /// Calls `f` with each position and a mutable reference to its element.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut T),
    {
        let Self { slots, order, len } = self;
        for (position, &slot) in order[..*len as usize].iter().enumerate() {
            f(position, slots.slot_mut(slot));
        }
    }
}

/// Iterator over a [`DenseSet`] in enumeration order.
pub struct Iter<'s, 'a, T: Pod> {
    order: std::slice::Iter<'s, u32>,
    slots: &'s PoolArena<'a, T>,
}

impl<'s, T: Pod> Iterator for Iter<'s, '_, T> {
    type Item = &'s T;

    #[inline]
    fn next(&mut self) -> Option<&'s T> {
        let slot = *self.order.next()?;
        Some(self.slots.slot(slot))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<T: Pod> ExactSizeIterator for Iter<'_, '_, T> {}

impl<T: Pod> FusedIterator for Iter<'_, '_, T> {}

impl<'s, 'a, T: Pod> IntoIterator for &'s DenseSet<'a, T> {
    type Item = &'s T;
    type IntoIter = Iter<'s, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
