//! # Fixed Array
//!
//! A length-tracked array of fixed capacity, carved out of a bump arena once
//! and filled with `push`. It never grows.

use std::ops::{Deref, DerefMut};

use bytemuck::Pod;

use super::backing::Backing;
use super::bump::BumpArena;
use crate::error::{ArenaError, ArenaResult};

/// A fixed-capacity array of `T` with `len <= capacity`.
///
/// Only `..len` holds pushed values; the rest of the storage is spare.
///
/// # Example
///
/// ```rust
/// use arenakit_core::{BumpArena, FixedArray};
///
/// let mut buffer = vec![0u8; 256];
/// let bump = BumpArena::new(&mut buffer);
///
/// let mut offsets: FixedArray<'_, u32> = FixedArray::carve(&bump, 4).unwrap();
/// offsets.push(10).unwrap();
/// offsets.push(20).unwrap();
///
/// assert_eq!(offsets.as_slice(), &[10, 20]);
/// assert_eq!(offsets.pop(), Some(20));
/// ```
pub struct FixedArray<'a, T: Pod> {
    /// Element storage, `capacity` elements.
    data: Backing<'a, T>,
    /// Number of pushed elements.
    len: u32,
    /// Element capacity.
    capacity: u32,
}

impl<T: Pod> FixedArray<'static, T> {
    /// Creates an array that owns its storage on the heap.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            data: Backing::owned(capacity as usize),
            len: 0,
            capacity,
        }
    }
}

impl<'a, T: Pod> FixedArray<'a, T> {
    /// Carves an empty array of `capacity` elements out of `bump`.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::OutOfCapacity`] if `bump` cannot fit the storage.
    /// - [`ArenaError::LayoutMismatch`] if `T` is zero-sized.
    pub fn carve(bump: &'a BumpArena<'_>, capacity: u32) -> ArenaResult<Self> {
        let data = Backing::carve(bump, capacity as usize)?;
        tracing::debug!(capacity, bump_used = bump.used(), "fixed array carved");
        Ok(Self {
            data,
            len: 0,
            capacity,
        })
    }

    /// Worst-case bump bytes [`carve`](Self::carve) needs.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityOverflow`] if the byte count overflows `usize`.
    pub fn footprint(capacity: u32) -> ArenaResult<usize> {
        Backing::<T>::footprint(capacity as usize)
    }

    /// Returns the number of pushed elements.
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
        self.capacity
    }

    /// Checks if full.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Appends `value` and returns its index.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ArenaFull`] if `len == capacity`. The array is unchanged.
    pub fn push(&mut self, value: T) -> ArenaResult<usize> {
        if self.is_full() {
            tracing::debug!(capacity = self.capacity, "fixed array full");
            return Err(ArenaError::ArenaFull {
                capacity: self.capacity,
            });
        }
        let index = self.len();
        self.data[index] = value;
        self.len += 1;
        Ok(index)
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        let index = self.len.checked_sub(1)?;
        self.len = index;
        Some(self.data[index as usize])
    }

    /// Drops every element. The storage is kept.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The pushed elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len()]
    }

    /// The pushed elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        &mut self.data[..len]
    }
}

impl<T: Pod> Deref for FixedArray<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Pod> DerefMut for FixedArray<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}
