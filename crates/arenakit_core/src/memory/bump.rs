//! # Bump Arena
//!
//! A pointer-bump allocator over a buffer the caller owns. Every other arena
//! in this crate can be carved out of one of these.
//!
//! Allocation borrows the arena immutably and [`BumpArena::reset`] borrows it
//! mutably, so the borrow checker rejects any use of a region after a reset.

#![allow(unsafe_code)]

use std::cell::Cell;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

use bytemuck::Pod;

use crate::error::{ArenaError, ArenaResult};

/// A bump-pointer arena over a borrowed byte buffer.
///
/// Allocations are O(1): the start address is rounded up to the requested
/// alignment and the offset advances. There is no per-allocation metadata and
/// no individual deallocation. [`reset`](Self::reset) releases everything at once.
///
/// Memory is never zeroed. A region handed out after a reset may still hold
/// bytes written during the previous epoch.
///
/// # Thread Safety
///
/// This arena is NOT thread-safe. Use one arena per thread.
///
/// # Example
///
/// ```rust
/// use arenakit_core::BumpArena;
///
/// let mut buffer = vec![0u8; 1024];
/// let mut arena = BumpArena::new(&mut buffer);
///
/// let header = arena.alloc(0xABCD_u32).unwrap();
/// let body = arena.alloc_slice::<u64>(16).unwrap();
/// assert_eq!(*header, 0xABCD);
/// assert_eq!(body.len(), 16);
///
/// arena.reset();
/// assert_eq!(arena.used(), 0);
/// ```
#[derive(Debug)]
pub struct BumpArena<'buf> {
    /// Start of the caller's buffer. Not assumed to be aligned.
    base: NonNull<u8>,
    /// Length of the caller's buffer in bytes.
    capacity: usize,
    /// Bytes consumed since the last reset, padding included.
    used: Cell<usize>,
    /// Holds the exclusive borrow of the caller's buffer.
    _buffer: PhantomData<&'buf mut [u8]>,
}

impl<'buf> BumpArena<'buf> {
    /// Creates an arena that allocates out of `buffer`.
    ///
    /// The arena never frees the buffer; it is returned to the caller when
    /// the arena is dropped.
    #[must_use]
    pub fn new(buffer: &'buf mut [u8]) -> Self {
        let capacity = buffer.len();
        Self {
            base: NonNull::from(buffer).cast::<u8>(),
            capacity,
            used: Cell::new(0),
            _buffer: PhantomData,
        }
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the bytes consumed so far, alignment padding included.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Returns the bytes left before the arena is exhausted.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used.get()
    }

    /// Allocates `size` bytes whose start address is a multiple of `align`.
    ///
    /// A zero-byte request is legal: it returns an empty region at the aligned
    /// bump position and consumes only the padding.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidAlignment`] if `align` is not a power of two.
    /// - [`ArenaError::OutOfCapacity`] if the aligned region does not fit.
    ///   `used` is left unchanged.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_bytes(&self, size: usize, align: usize) -> ArenaResult<&mut [u8]> {
        let offset = self.reserve(size, align)?;
        // SAFETY: `reserve` guarantees `offset + size <= capacity`, so the range
        // lies inside the buffer borrowed for 'buf. The range starts at or past
        // every region handed out since the last reset. Those regions borrow
        // `self`, and `reset` needs `&mut self`, so none of them overlap this one.
        Ok(unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(offset), size) })
    }

    /// Allocates and initializes a single value.
    ///
    /// # Errors
    ///
    /// [`ArenaError::OutOfCapacity`] if the value does not fit.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T: Pod>(&self, value: T) -> ArenaResult<&mut T> {
        let bytes = self.alloc_bytes(size_of::<T>(), align_of::<T>())?;
        let slot = bytemuck::try_from_bytes_mut::<T>(bytes)
            .map_err(|_| ArenaError::LayoutMismatch("value does not fit its carved region"))?;
        *slot = value;
        Ok(slot)
    }

    /// Allocates a slice of `len` elements.
    ///
    /// The contents are whatever the buffer held, which is always a valid
    /// `T` because `T` is [`Pod`].
    ///
    /// # Errors
    ///
    /// - [`ArenaError::LayoutMismatch`] if `T` is zero-sized.
    /// - [`ArenaError::CapacityOverflow`] if the byte size overflows `usize`.
    /// - [`ArenaError::OutOfCapacity`] if the slice does not fit.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice<T: Pod>(&self, len: usize) -> ArenaResult<&mut [T]> {
        if size_of::<T>() == 0 {
            return Err(ArenaError::LayoutMismatch("zero-sized element type"));
        }
        let size = size_of::<T>()
            .checked_mul(len)
            .ok_or(ArenaError::CapacityOverflow(len))?;
        let bytes = self.alloc_bytes(size, align_of::<T>())?;
        bytemuck::try_cast_slice_mut(bytes)
            .map_err(|_| ArenaError::LayoutMismatch("slice does not fit its carved region"))
    }

    /// Allocates a copy of `src`.
    ///
    /// # Errors
    ///
    /// Same as [`alloc_slice`](Self::alloc_slice).
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Pod>(&self, src: &[T]) -> ArenaResult<&mut [T]> {
        let dst = self.alloc_slice::<T>(src.len())?;
        dst.copy_from_slice(src);
        Ok(dst)
    }

    /// Resets the arena, releasing every allocation at once.
    ///
    /// Memory is not zeroed. The next allocation starts at the same address
    /// as the first allocation of the previous epoch.
    #[inline]
    pub fn reset(&mut self) {
        tracing::trace!(used = self.used.get(), "bump arena reset");
        self.used.set(0);
    }

    /// Advances the bump offset and returns the aligned start offset.
    fn reserve(&self, size: usize, align: usize) -> ArenaResult<usize> {
        if !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment { align });
        }

        // The buffer itself may be misaligned, so round the absolute address.
        let used = self.used.get();
        let base = self.base.as_ptr() as usize;
        let end = align_up(base + used, align)
            .map(|address| address - base)
            .and_then(|start| Some((start, start.checked_add(size)?)));

        match end {
            Some((start, end)) if end <= self.capacity => {
                self.used.set(end);
                Ok(start)
            }
            _ => {
                tracing::debug!(
                    requested = size,
                    align,
                    remaining = self.capacity - used,
                    "bump arena out of capacity"
                );
                Err(ArenaError::OutOfCapacity {
                    requested: size,
                    align,
                    remaining: self.capacity - used,
                    capacity: self.capacity,
                })
            }
        }
    }
}

/// Smallest multiple of `align` that is `>= address`. `align` must be a power of two.
#[inline]
const fn align_up(address: usize, align: usize) -> Option<usize> {
    match address.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}
