//! # Fragmented String Store
//!
//! Strings of any length stored as chains of fixed 64-byte segments in a
//! pool arena. No contiguous allocation is ever needed to store a string; it
//! is reassembled only when read.

use bytemuck::{Pod, Zeroable};

use crate::error::{ArenaError, ArenaResult};
use crate::memory::{ArenaId, BumpArena, PoolArena, SlotHandle};

/// Size of one segment in bytes, link included.
pub const SEGMENT_SIZE: usize = 64;

/// Payload bytes per segment.
pub const FRAGMENT_CAPACITY: usize = SEGMENT_SIZE - std::mem::size_of::<u32>();

/// End-of-chain marker.
const NO_SEGMENT: u32 = u32::MAX;

/// One link of a string chain.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct Segment {
    /// Slot index of the next segment, or `NO_SEGMENT`.
    next: u32,
    /// Payload; only the first `min(remaining, FRAGMENT_CAPACITY)` bytes count.
    fragment: [u8; FRAGMENT_CAPACITY],
}

/// Caller-visible reference to a stored string.
///
/// The handle references but does not own its segments; only the store that
/// minted it may free them. It is plain data, so it can itself be stored in a
/// [`PoolArena`] or [`DenseSet`](crate::DenseSet) record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
#[must_use]
pub struct StringHandle {
    arena: u32,
    epoch: u32,
    first: u32,
    len: u32,
}

impl StringHandle {
    /// Length of the stored string in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Checks if the stored string is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of segments the string occupies.
    #[inline]
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        StringStore::segments_for(self.len())
    }

    fn first_segment(self) -> SlotHandle<Segment> {
        SlotHandle::new(ArenaId::from_raw(self.arena), self.epoch, self.first)
    }
}

/// Pool of string segments.
///
/// # Example
///
/// ```rust
/// use arenakit_core::StringStore;
///
/// let mut store = StringStore::new(16);
/// let path = store.store(b"./target/debug/build").unwrap();
///
/// assert_eq!(store.load_vec(path).unwrap(), b"./target/debug/build");
/// store.free(path).unwrap();
/// assert_eq!(store.segments_in_use(), 0);
/// ```
pub struct StringStore<'a> {
    segments: PoolArena<'a, Segment>,
}

impl StringStore<'static> {
    /// Creates a store that owns `segment_count` segments on the heap.
    #[must_use]
    pub fn new(segment_count: u32) -> Self {
        Self {
            segments: PoolArena::new(segment_count),
        }
    }
}

impl<'a> StringStore<'a> {
    /// Carves a store of `segment_count` segments out of `bump`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::OutOfCapacity`] if `bump` cannot fit the segments.
    pub fn carve(bump: &'a BumpArena<'_>, segment_count: u32) -> ArenaResult<Self> {
        Ok(Self {
            segments: PoolArena::carve(bump, segment_count)?,
        })
    }

    /// Worst-case bump bytes [`carve`](Self::carve) needs.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityOverflow`] if the byte count overflows `usize`.
    pub fn footprint(segment_count: u32) -> ArenaResult<usize> {
        PoolArena::<Segment>::footprint(segment_count)
    }

    /// Segments needed to store `len` bytes. Never less than one.
    #[inline]
    #[must_use]
    pub const fn segments_for(len: usize) -> usize {
        if len == 0 {
            1
        } else {
            len.div_ceil(FRAGMENT_CAPACITY)
        }
    }

    /// Total segment capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.segments.capacity()
    }

    /// Segments held by live strings.
    #[inline]
    #[must_use]
    pub const fn segments_in_use(&self) -> u32 {
        self.segments.live_count()
    }

    /// Segments still free.
    #[inline]
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.segments.available()
    }

    /// Copies `bytes` into a fresh segment chain.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::CapacityOverflow`] if `bytes` is longer than `u32::MAX`.
    /// - [`ArenaError::ArenaFull`] if the chain does not fit. Nothing is
    ///   allocated in that case.
    pub fn store(&mut self, bytes: &[u8]) -> ArenaResult<StringHandle> {
        let len = u32::try_from(bytes.len()).map_err(|_| ArenaError::CapacityOverflow(bytes.len()))?;

        let needed = Self::segments_for(bytes.len());
        if needed > self.available() as usize {
            tracing::debug!(needed, available = self.available(), "string store full");
            return Err(ArenaError::ArenaFull {
                capacity: self.capacity(),
            });
        }

        let mut chunks = bytes.chunks(FRAGMENT_CAPACITY);
        let first = self.push_segment(chunks.next().unwrap_or_default())?;
        let mut previous = first;
        for chunk in chunks {
            let index = self.push_segment(chunk)?;
            self.segments.slot_mut(previous).next = index;
            previous = index;
        }

        Ok(StringHandle {
            arena: self.segments.id().get(),
            epoch: self.segments.epoch(),
            first,
            len,
        })
    }

    /// Reassembles the string into a fresh region of `out`.
    ///
    /// # Errors
    ///
    /// - Handle errors as for [`PoolArena::free`].
    /// - [`ArenaError::OutOfCapacity`] if `out` cannot fit the string.
    #[allow(clippy::mut_from_ref)]
    pub fn load<'b>(&self, handle: StringHandle, out: &'b BumpArena<'_>) -> ArenaResult<&'b mut [u8]> {
        let fragments = self.fragments(handle)?;
        let dst = out.alloc_bytes(handle.len(), 1)?;

        let mut copied = 0;
        for fragment in fragments {
            dst[copied..copied + fragment.len()].copy_from_slice(fragment);
            copied += fragment.len();
        }
        Self::check_complete(copied, handle)?;
        Ok(dst)
    }

    /// Reassembles the string into an owned buffer.
    ///
    /// # Errors
    ///
    /// Handle errors as for [`PoolArena::free`].
    pub fn load_vec(&self, handle: StringHandle) -> ArenaResult<Vec<u8>> {
        let mut dst = Vec::with_capacity(handle.len());
        for fragment in self.fragments(handle)? {
            dst.extend_from_slice(fragment);
        }
        Self::check_complete(dst.len(), handle)?;
        Ok(dst)
    }

    /// Compares the stored string with `bytes` without reassembling it.
    ///
    /// # Errors
    ///
    /// Handle errors as for [`PoolArena::free`].
    pub fn matches(&self, handle: StringHandle, bytes: &[u8]) -> ArenaResult<bool> {
        let fragments = self.fragments(handle)?;
        if handle.len() != bytes.len() {
            return Ok(false);
        }

        let mut offset = 0;
        for fragment in fragments {
            if bytes[offset..offset + fragment.len()] != *fragment {
                return Ok(false);
            }
            offset += fragment.len();
        }
        Ok(offset == bytes.len())
    }

    /// Returns every segment of the string to the pool, consuming the handle.
    ///
    /// # Errors
    ///
    /// Handle errors as for [`PoolArena::free`]. Nothing is freed on error.
    pub fn free(&mut self, handle: StringHandle) -> ArenaResult<()> {
        self.segments.validate(handle.first_segment())?;

        let mut next = handle.first;
        for _ in 0..handle.segment_count() {
            if next == NO_SEGMENT {
                break;
            }
            let following = self.segments.slot(next).next;
            self.segments.free_index(next);
            next = following;
        }
        Ok(())
    }

    /// Frees every string at once. Outstanding handles become stale.
    pub fn empty(&mut self) {
        self.segments.empty();
    }

    fn push_segment(&mut self, chunk: &[u8]) -> ArenaResult<u32> {
        let mut segment = Segment::zeroed();
        segment.next = NO_SEGMENT;
        segment.fragment[..chunk.len()].copy_from_slice(chunk);
        self.segments.allocate_index(segment)
    }

    fn fragments(&self, handle: StringHandle) -> ArenaResult<Fragments<'_, 'a>> {
        self.segments.validate(handle.first_segment())?;
        Ok(Fragments {
            segments: &self.segments,
            next: handle.first,
            remaining: handle.len(),
        })
    }

    fn check_complete(copied: usize, handle: StringHandle) -> ArenaResult<()> {
        if copied == handle.len() {
            Ok(())
        } else {
            Err(ArenaError::InvalidIndex {
                index: copied,
                len: handle.len(),
            })
        }
    }
}

/// Walks a chain, yielding each fragment's used bytes.
struct Fragments<'s, 'a> {
    segments: &'s PoolArena<'a, Segment>,
    next: u32,
    remaining: usize,
}

impl<'s> Iterator for Fragments<'s, '_> {
    type Item = &'s [u8];

    fn next(&mut self) -> Option<&'s [u8]> {
        if self.remaining == 0 || self.next == NO_SEGMENT {
            return None;
        }
        let segment = self.segments.slot(self.next);
        // The last fragment may be partial: count only what is copied.
        let take = self.remaining.min(FRAGMENT_CAPACITY);
        self.remaining -= take;
        self.next = segment.next;
        Some(&segment.fragment[..take])
    }
}
