//! # Pool Arena
//!
//! Fixed-size slot allocator for objects that are frequently allocated and freed.

use std::mem::size_of;

use bytemuck::Pod;

use super::backing::Backing;
use super::bump::BumpArena;
use super::handle::{ArenaId, SlotHandle};
use crate::error::{ArenaError, ArenaResult};

/// A pool of `capacity` fixed-size slots with O(1) allocate and free.
///
/// Slots are handed out from a LIFO free list first, then bumped from the
/// high-water mark `count`. Freeing the slot at `count - 1` lowers `count`
/// instead of growing the free list, so push/pop usage never touches it.
///
/// Storage is either carved out of a [`BumpArena`] ([`PoolArena::carve`]) or
/// owned on the heap ([`PoolArena::new`]).
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap in a mutex.
///
/// # Example
///
/// ```rust
/// use arenakit_core::PoolArena;
///
/// let mut pool: PoolArena<'_, [f32; 3]> = PoolArena::new(1024);
///
/// let handle = pool.allocate([0.0, 1.0, 2.0]).unwrap();
/// assert_eq!(pool.get(handle), Some(&[0.0, 1.0, 2.0]));
///
/// let freed = pool.free(handle).unwrap();
/// assert_eq!(freed[2], 2.0);
/// ```
pub struct PoolArena<'a, T: Pod> {
    /// Identity stamped into every handle.
    id: ArenaId,
    /// Bumped by `empty`, invalidating every outstanding handle.
    epoch: u32,
    /// Slot storage, `capacity` elements.
    data: Backing<'a, T>,
    /// Stack of freed slot indices; only `..free_list_count` is meaningful.
    free_list: Backing<'a, u32>,
    /// Total slot count.
    capacity: u32,
    /// High-water mark of bumped slots.
    count: u32,
    /// Entries on the free list.
    free_list_count: u32,
}

impl<T: Pod> PoolArena<'static, T> {
    /// Creates a pool that owns its storage on the heap.
    ///
    /// All memory is allocated upfront; the pool never grows. The slots and
    /// the free list are two separate heap blocks, not one combined block.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of live objects
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self::from_parts(
            Backing::owned(capacity as usize),
            Backing::owned(capacity as usize),
            capacity,
        )
    }
}

impl<'a, T: Pod> PoolArena<'a, T> {
    /// Carves a pool out of `bump`: the free list first, then the slot data.
    ///
    /// If the second carve fails the bytes taken by the first stay consumed
    /// until `bump` is reset.
    ///
    /// # Errors
    ///
    /// [`ArenaError::OutOfCapacity`] if `bump` cannot fit the pool, or
    /// [`ArenaError::LayoutMismatch`] if `T` is zero-sized.
    pub fn carve(bump: &'a BumpArena<'_>, capacity: u32) -> ArenaResult<Self> {
        let free_list = Backing::carve(bump, capacity as usize)?;
        let data = Backing::carve(bump, capacity as usize)?;
        tracing::debug!(
            capacity,
            object_size = size_of::<T>(),
            bump_used = bump.used(),
            "pool arena carved"
        );
        Ok(Self::from_parts(data, free_list, capacity))
    }

    /// Worst-case bump bytes [`carve`](Self::carve) needs for `capacity` slots.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityOverflow`] if the byte count overflows `usize`.
    pub fn footprint(capacity: u32) -> ArenaResult<usize> {
        let capacity = capacity as usize;
        Backing::<u32>::footprint(capacity)?
            .checked_add(Backing::<T>::footprint(capacity)?)
            .ok_or(ArenaError::CapacityOverflow(capacity))
    }

    fn from_parts(data: Backing<'a, T>, free_list: Backing<'a, u32>, capacity: u32) -> Self {
        Self {
            id: ArenaId::next(),
            epoch: 0,
            data,
            free_list,
            capacity,
            count: 0,
            free_list_count: 0,
        }
    }

    /// Returns this pool's identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ArenaId {
        self.id
    }

    /// Returns the current epoch. It advances every time the pool is emptied.
    #[inline]
    #[must_use]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Returns the total slot capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the high-water mark: slots ever bumped and not shrunk away.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns the number of freed slots waiting for reuse.
    #[inline]
    #[must_use]
    pub const fn free_list_len(&self) -> u32 {
        self.free_list_count
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> u32 {
        self.count - self.free_list_count
    }

    /// Returns how many more objects can be allocated.
    #[inline]
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.capacity - self.live_count()
    }

    /// Returns `true` if no slot is available.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.available() == 0
    }

    /// Allocates a slot and stores the object.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ArenaFull`] if every slot is live.
    pub fn allocate(&mut self, value: T) -> ArenaResult<SlotHandle<T>> {
        let index = self.allocate_index(value)?;
        Ok(SlotHandle::new(self.id, self.epoch, index))
    }

    /// Frees an allocated object and returns it.
    ///
    /// This is a **O(1)** operation with **zero heap deallocations**.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ForeignHandle`] if `handle` came from another pool.
    /// - [`ArenaError::StaleHandle`] if the pool was emptied since.
    /// - [`ArenaError::InvalidIndex`] if the slot is beyond the high-water mark.
    ///
    /// Freeing the same handle twice is a caller bug; debug builds assert on it.
    pub fn free(&mut self, handle: SlotHandle<T>) -> ArenaResult<T> {
        self.validate(handle)?;
        Ok(self.free_index(handle.index()))
    }

    /// Gets a reference to the object in `handle`'s slot.
    ///
    /// Foreign, stale and out-of-range handles give `None`. A slot freed
    /// since the handle was minted is NOT detected: the old or reused value
    /// is returned. Use [`is_live`](Self::is_live) when that matters.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlotHandle<T>) -> Option<&T> {
        self.validate(handle).ok()?;
        Some(self.slot(handle.index()))
    }

    /// Gets a mutable reference to the object in `handle`'s slot.
    ///
    /// Freed slots are not detected, as for [`get`](Self::get).
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle<T>) -> Option<&mut T> {
        self.validate(handle).ok()?;
        Some(self.slot_mut(handle.index()))
    }

    /// Returns `true` if `handle` names a live slot of this pool.
    ///
    /// Unlike [`get`](Self::get) this also scans the free list, so it is
    /// O(freed slots).
    #[must_use]
    pub fn is_live(&self, handle: SlotHandle<T>) -> bool {
        self.validate(handle).is_ok() && !self.is_freed(handle.index())
    }

    /// Frees every slot at once without visiting them.
    ///
    /// Outstanding handles become stale.
    pub fn empty(&mut self) {
        tracing::trace!(id = self.id.get(), live = self.live_count(), "pool arena emptied");
        self.count = 0;
        self.free_list_count = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Checks that `handle` was minted by this pool in the current epoch and
    /// points below the high-water mark.
    pub(crate) fn validate(&self, handle: SlotHandle<T>) -> ArenaResult<()> {
        if handle.arena() != self.id {
            return Err(ArenaError::ForeignHandle {
                handle_arena: handle.arena().get(),
                arena: self.id.get(),
            });
        }
        if handle.epoch() != self.epoch {
            return Err(ArenaError::StaleHandle {
                handle_epoch: handle.epoch(),
                arena_epoch: self.epoch,
            });
        }
        if handle.index() >= self.count {
            return Err(ArenaError::InvalidIndex {
                index: handle.index() as usize,
                len: self.count as usize,
            });
        }
        Ok(())
    }

    /// Takes a slot, most recently freed first, and stores `value` in it.
    pub(crate) fn allocate_index(&mut self, value: T) -> ArenaResult<u32> {
        let index = if self.free_list_count > 0 {
            self.free_list_count -= 1;
            self.free_list[self.free_list_count as usize]
        } else if self.count < self.capacity {
            self.count += 1;
            self.count - 1
        } else {
            tracing::debug!(id = self.id.get(), capacity = self.capacity, "pool arena full");
            return Err(ArenaError::ArenaFull {
                capacity: self.capacity,
            });
        };

        self.data[index as usize] = value;
        Ok(index)
    }

    /// Returns slot `index` to the pool. The slot must be live.
    pub(crate) fn free_index(&mut self, index: u32) -> T {
        debug_assert!(index < self.count, "slot {index} is beyond count {}", self.count);
        debug_assert!(!self.is_freed(index), "slot {index} freed twice");

        let value = self.data[index as usize];
        if index + 1 == self.count {
            self.count -= 1;
        } else {
            self.free_list[self.free_list_count as usize] = index;
            self.free_list_count += 1;
        }
        value
    }

    #[inline]
    pub(crate) fn slot(&self, index: u32) -> &T {
        &self.data[index as usize]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, index: u32) -> &mut T {
        &mut self.data[index as usize]
    }

    fn is_freed(&self, index: u32) -> bool {
        self.free_list[..self.free_list_count as usize].contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocate_free() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(10);

        let h1 = pool.allocate(42).unwrap();
        assert_eq!(*pool.get(h1).unwrap(), 42);
        assert_eq!(pool.live_count(), 1);

        let freed = pool.free(h1).unwrap();
        assert_eq!(freed, 42);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_pool_full() {
        let mut pool: PoolArena<'_, u8> = PoolArena::new(2);

        let _ = pool.allocate(1).unwrap();
        let _ = pool.allocate(2).unwrap();
        assert_eq!(
            pool.allocate(3).unwrap_err(),
            ArenaError::ArenaFull { capacity: 2 }
        );
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(4);

        let _keep = pool.allocate(0).unwrap();
        let h1 = pool.allocate(1).unwrap();
        let _tail = pool.allocate(2).unwrap();
        pool.free(h1).unwrap();

        let h2 = pool.allocate(3).unwrap();
        assert_eq!(h1.index(), h2.index()); // Same slot reused
        assert_eq!(*pool.get(h2).unwrap(), 3);
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(8);

        let handles: Vec<_> = (0..5).map(|v| pool.allocate(v).unwrap()).collect();
        pool.free(handles[1]).unwrap();
        pool.free(handles[3]).unwrap();

        assert_eq!(pool.allocate(10).unwrap().index(), 3);
        assert_eq!(pool.allocate(11).unwrap().index(), 1);
        assert_eq!(pool.allocate(12).unwrap().index(), 5);
    }

    #[test]
    fn test_last_slot_free_shrinks_count() {
        let mut pool: PoolArena<'_, u64> = PoolArena::new(8);

        let handles: Vec<_> = (0..4).map(|v| pool.allocate(v).unwrap()).collect();
        for (freed, handle) in handles.iter().rev().enumerate() {
            pool.free(*handle).unwrap();
            assert_eq!(pool.count() as usize, 3 - freed);
            assert_eq!(pool.free_list_len(), 0);
        }
    }

    #[test]
    fn test_empty_invalidates_handles() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(4);

        let h = pool.allocate(5).unwrap();
        pool.empty();
        assert_eq!(pool.count(), 0);
        assert!(pool.get(h).is_none());
        assert_eq!(
            pool.free(h).unwrap_err(),
            ArenaError::StaleHandle {
                handle_epoch: 0,
                arena_epoch: 1
            }
        );

        let fresh = pool.allocate(6).unwrap();
        assert_eq!(fresh.index(), 0);
        assert_eq!(pool.get(fresh), Some(&6));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut a: PoolArena<'_, u32> = PoolArena::new(4);
        let mut b: PoolArena<'_, u32> = PoolArena::new(4);

        let h = a.allocate(1).unwrap();
        let _ = b.allocate(2).unwrap();
        assert!(b.get(h).is_none());
        assert!(matches!(b.free(h), Err(ArenaError::ForeignHandle { .. })));
        assert_eq!(b.live_count(), 1);
    }

    #[test]
    fn test_is_live_tracks_free_list() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(4);

        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(2).unwrap();
        pool.free(a).unwrap();
        assert!(!pool.is_live(a));
        assert!(pool.is_live(b));
    }

    #[test]
    fn test_get_on_freed_slot_needs_is_live() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(4);

        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(2).unwrap();
        let _ = pool.allocate(3).unwrap();
        pool.free(b).unwrap();

        // The freed slot still validates, so only `is_live` tells them apart.
        assert_eq!(pool.get(b), Some(&2));
        assert!(!pool.is_live(b));
        assert!(pool.is_live(a));

        // Reuse hands the slot to a new value behind the old handle.
        let c = pool.allocate(9).unwrap();
        assert_eq!(c, b);
        assert_eq!(pool.get(b), Some(&9));
    }

    #[test]
    fn test_carved_pool() {
        let mut buffer = vec![0u8; PoolArena::<u64>::footprint(16).unwrap()];
        let bump = BumpArena::new(&mut buffer);

        let mut pool = PoolArena::<u64>::carve(&bump, 16).unwrap();
        for v in 0..16 {
            let _ = pool.allocate(v).unwrap();
        }
        assert!(pool.is_full());
        assert!(bump.used() <= bump.capacity());
    }

    #[test]
    fn test_carve_out_of_capacity() {
        let mut buffer = [0u8; 32];
        let bump = BumpArena::new(&mut buffer);

        assert!(matches!(
            PoolArena::<u64>::carve(&bump, 16),
            Err(ArenaError::OutOfCapacity { .. })
        ));
    }

    #[test]
    fn test_zero_capacity_pool_is_always_full() {
        let mut pool: PoolArena<'_, u32> = PoolArena::new(0);
        assert!(pool.is_full());
        assert!(pool.allocate(1).is_err());
    }
}
