//! # ARENAKIT Core
//!
//! Fixed-capacity allocators and the containers built directly on them:
//! - [`BumpArena`]: pointer-bump allocation over a caller-owned buffer
//! - [`FixedArray`]: a length-tracked array carved once, filled with push
//! - [`PoolArena`]: fixed-size slots with O(1) allocate/free via a LIFO free list
//! - [`DenseSet`]: compact iterable storage with O(1) swap-removal
//! - [`StringStore`]: strings of any length in fixed 64-byte segments
//!
//! ## Architecture Rules
//!
//! 1. **One memory grant** - a single buffer backs everything, carved at startup
//! 2. **No growth** - capacities are fixed at construction
//! 3. **Exhaustion is a value** - every allocating call returns [`ArenaResult`]
//!
//! ## Example
//!
//! ```rust
//! use arenakit_core::{ArenaConfig, BumpArena, DenseSet, StringStore};
//!
//! let config = ArenaConfig::default();
//! let mut backing = config.allocate_backing();
//! let bump = BumpArena::new(&mut backing);
//!
//! let mut names = StringStore::carve(&bump, config.string_segments).unwrap();
//! let mut ids: DenseSet<'_, u64> = DenseSet::carve(&bump, config.set_capacity).unwrap();
//!
//! let name = names.store(b"config.toml").unwrap();
//! ids.add(42).unwrap();
//!
//! assert!(names.matches(name, b"config.toml").unwrap());
//! assert_eq!(ids.at(0), Some(&42));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collections;
pub mod config;
pub mod error;
pub mod memory;
pub mod text;

pub use collections::DenseSet;
pub use config::ArenaConfig;
pub use error::{ArenaError, ArenaResult};
pub use memory::{ArenaId, BumpArena, FixedArray, PoolArena, SlotHandle};
pub use text::{StringHandle, StringStore, FRAGMENT_CAPACITY};
