//! # Slot Handles
//!
//! A handle names one slot of one pool arena. It records which arena minted
//! it and the arena's epoch at the time, so a handle passed to the wrong
//! arena, or kept across [`PoolArena::empty`](super::PoolArena::empty), is
//! rejected instead of silently aliasing another slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global arena ID counter.
static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a pool arena instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ArenaId(u32);

impl ArenaId {
    /// Mints an ID no other arena in this process holds.
    pub(crate) fn next() -> Self {
        Self(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds an ID from its raw value.
    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw ID value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arena#{}", self.0)
    }
}

/// Typed reference to a live slot in a [`PoolArena`](super::PoolArena).
///
/// Handles are `Copy`. Freeing a slot does not invalidate copies of its
/// handle, so callers must not use a handle after passing it to `free`.
#[must_use]
pub struct SlotHandle<T> {
    arena: ArenaId,
    epoch: u32,
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SlotHandle<T> {
    #[inline]
    pub(crate) const fn new(arena: ArenaId, epoch: u32, index: u32) -> Self {
        Self {
            arena,
            epoch,
            index,
            _marker: PhantomData,
        }
    }

    /// The arena that minted this handle.
    #[inline]
    #[must_use]
    pub const fn arena(self) -> ArenaId {
        self.arena
    }

    /// The arena epoch this handle was minted in.
    #[inline]
    #[must_use]
    pub const fn epoch(self) -> u32 {
        self.epoch
    }

    /// Slot index inside the arena.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

// Manual impls: derives would wrongly require `T: Clone` etc.
impl<T> Clone for SlotHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotHandle<T> {}

impl<T> PartialEq for SlotHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.arena == other.arena && self.epoch == other.epoch && self.index == other.index
    }
}

impl<T> Eq for SlotHandle<T> {}

impl<T> Hash for SlotHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arena.hash(state);
        self.epoch.hash(state);
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for SlotHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotHandle")
            .field("arena", &self.arena)
            .field("epoch", &self.epoch)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_ids_are_unique() {
        let a = ArenaId::next();
        let b = ArenaId::next();
        assert_ne!(a, b);
        assert_eq!(ArenaId::from_raw(a.get()), a);
    }

    #[test]
    fn test_handle_equality_covers_all_parts() {
        let arena = ArenaId::from_raw(7);
        let h = SlotHandle::<u64>::new(arena, 0, 3);
        assert_eq!(h, SlotHandle::new(arena, 0, 3));
        assert_ne!(h, SlotHandle::new(arena, 1, 3));
        assert_ne!(h, SlotHandle::new(ArenaId::from_raw(8), 0, 3));
        assert_eq!(h.index(), 3);
        assert_eq!(format!("{}", h.arena()), "arena#7");
    }
}
