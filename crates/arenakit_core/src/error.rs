//! # Arena Error Types
//!
//! All recoverable conditions raised by the arenas. Exhaustion is never a
//! panic: every allocating call returns an [`ArenaResult`] the caller must check.

use thiserror::Error;

/// Errors that can occur in the arena subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The bump arena cannot fit the aligned request.
    #[error("bump arena out of capacity: requested {requested} bytes (align {align}), {remaining} of {capacity} remaining")]
    OutOfCapacity {
        /// Bytes requested.
        requested: usize,
        /// Alignment requested.
        align: usize,
        /// Bytes left before the request.
        remaining: usize,
        /// Total capacity of the arena.
        capacity: usize,
    },

    /// A pool arena or fixed array has no slot left.
    #[error("arena full: all {capacity} slots are in use")]
    ArenaFull {
        /// Slot capacity.
        capacity: u32,
    },

    /// The dense set already holds `capacity` elements.
    #[error("set full: capacity {capacity}")]
    SetFull {
        /// Element capacity of the set.
        capacity: u32,
    },

    /// An index or slot outside the live range.
    #[error("invalid index {index}: live range is 0..{len}")]
    InvalidIndex {
        /// The rejected index.
        index: usize,
        /// Exclusive upper bound of the live range.
        len: usize,
    },

    /// Alignment is not a power of two.
    #[error("invalid alignment {align}: must be a power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },

    /// A handle minted by a different arena instance.
    #[error("handle belongs to arena {handle_arena}, not arena {arena}")]
    ForeignHandle {
        /// Arena that minted the handle.
        handle_arena: u32,
        /// Arena the handle was passed to.
        arena: u32,
    },

    /// A handle minted before the arena was last emptied.
    #[error("stale handle: epoch {handle_epoch}, arena is at epoch {arena_epoch}")]
    StaleHandle {
        /// Epoch stored in the handle.
        handle_epoch: u32,
        /// Current epoch of the arena.
        arena_epoch: u32,
    },

    /// Capacity exceeds the `u32` slot index space, or its byte size overflows.
    #[error("capacity overflow: {0}")]
    CapacityOverflow(usize),

    /// Carved bytes could not be viewed as the requested element type.
    #[error("layout mismatch: {0}")]
    LayoutMismatch(&'static str),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;
