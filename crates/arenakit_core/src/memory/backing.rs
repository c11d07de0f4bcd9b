//! Slot-array storage shared by the pool arena and the containers built on it.

use std::mem::{align_of, size_of};
use std::ops::{Deref, DerefMut};

use bytemuck::Pod;

use super::bump::BumpArena;
use crate::error::{ArenaError, ArenaResult};

/// A fixed-length array that is either carved out of a [`BumpArena`] or owned
/// on the heap. The length never changes after construction.
pub(crate) enum Backing<'a, T> {
    /// Borrowed from a bump arena for `'a`.
    Carved(&'a mut [T]),
    /// Heap storage owned by the structure itself.
    Owned(Box<[T]>),
}

impl<'a, T: Pod> Backing<'a, T> {
    /// Carves `len` elements out of `bump`.
    pub(crate) fn carve(bump: &'a BumpArena<'_>, len: usize) -> ArenaResult<Self> {
        bump.alloc_slice(len).map(Self::Carved)
    }

    /// Worst-case bump bytes needed by [`Backing::carve`], alignment slack included.
    pub(crate) fn footprint(len: usize) -> ArenaResult<usize> {
        size_of::<T>()
            .checked_mul(len)
            .and_then(|bytes| bytes.checked_add(align_of::<T>() - 1))
            .ok_or(ArenaError::CapacityOverflow(len))
    }
}

impl<T: Pod> Backing<'static, T> {
    /// Allocates `len` zeroed elements on the heap.
    pub(crate) fn owned(len: usize) -> Self {
        Self::Owned(vec![T::zeroed(); len].into_boxed_slice())
    }
}

impl<T> Deref for Backing<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        match self {
            Self::Carved(slots) => slots,
            Self::Owned(slots) => slots,
        }
    }
}

impl<T> DerefMut for Backing<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        match self {
            Self::Carved(slots) => slots,
            Self::Owned(slots) => slots,
        }
    }
}
