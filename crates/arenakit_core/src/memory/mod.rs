//! # Memory Management
//!
//! Fixed-capacity allocators. All memory is granted once at startup:
//! one [`BumpArena`] over a caller-owned block, with [`PoolArena`]s carved
//! out of it (or given their own heap storage).
//!
//! ## Design Philosophy
//!
//! - No growth after construction
//! - O(1) allocation and release
//! - Exhaustion is an error value, never a panic

mod array;
mod backing;
mod bump;
mod handle;
mod pool;

pub use array::FixedArray;
pub(crate) use backing::Backing;
pub use bump::BumpArena;
pub use handle::{ArenaId, SlotHandle};
pub use pool::PoolArena;
