//! # Arena Configuration
//!
//! Sizes for the root bump arena and the structures carved out of it. Loaded
//! once at startup, typically from a TOML file:
//!
//! ```toml
//! bump_capacity = 16000
//! pool_capacity = 32
//! set_capacity = 32
//! string_segments = 64
//! ```

use std::path::Path;

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::collections::DenseSet;
use crate::error::{ArenaError, ArenaResult};
use crate::memory::PoolArena;
use crate::text::StringStore;

/// Capacities for one arena layout. All values are fixed after startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Size of the root bump arena in bytes.
    pub bump_capacity: usize,
    /// Slots in the general-purpose pool arena.
    pub pool_capacity: u32,
    /// Elements in the dense set.
    pub set_capacity: u32,
    /// Segments in the string store.
    pub string_segments: u32,
}

impl ArenaConfig {
    /// Default root arena size in bytes.
    pub const DEFAULT_BUMP_CAPACITY: usize = 16_000;

    /// Default pool slot count.
    pub const DEFAULT_POOL_CAPACITY: u32 = 32;

    /// Default set capacity.
    pub const DEFAULT_SET_CAPACITY: u32 = 32;

    /// Default string segment count.
    pub const DEFAULT_STRING_SEGMENTS: u32 = 64;

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidConfig`] on a parse or validation failure.
    pub fn from_toml_str(source: &str) -> ArenaResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ArenaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "arena config loaded");
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidConfig`] if the file cannot be read, parsed or validated.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ArenaResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ArenaError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidConfig`] if the root arena has zero capacity.
    pub fn validate(&self) -> ArenaResult<()> {
        if self.bump_capacity == 0 {
            return Err(ArenaError::InvalidConfig(
                "bump_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Worst-case bytes to carve one pool of `T`, one set of `T` and one
    /// string store with these capacities, alignment slack included.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityOverflow`] if the total overflows `usize`.
    pub fn required_bytes<T: Pod>(&self) -> ArenaResult<usize> {
        [
            (self.pool_capacity, PoolArena::<T>::footprint(self.pool_capacity)?),
            (self.set_capacity, DenseSet::<T>::footprint(self.set_capacity)?),
            (self.string_segments, StringStore::footprint(self.string_segments)?),
        ]
        .into_iter()
        .try_fold(0usize, |total, (capacity, bytes)| {
            total
                .checked_add(bytes)
                .ok_or(ArenaError::CapacityOverflow(capacity as usize))
        })
    }

    /// Checks that [`required_bytes`](Self::required_bytes) fits in `bump_capacity`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidConfig`] if the layout does not fit.
    pub fn check_budget<T: Pod>(&self) -> ArenaResult<()> {
        let required = self.required_bytes::<T>()?;
        if required > self.bump_capacity {
            return Err(ArenaError::InvalidConfig(format!(
                "layout needs up to {required} bytes, bump_capacity is {}",
                self.bump_capacity
            )));
        }
        Ok(())
    }

    /// Allocates the zeroed heap block the root bump arena is built over.
    #[must_use]
    pub fn allocate_backing(&self) -> Box<[u8]> {
        vec![0u8; self.bump_capacity].into_boxed_slice()
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bump_capacity: Self::DEFAULT_BUMP_CAPACITY,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
            set_capacity: Self::DEFAULT_SET_CAPACITY,
            string_segments: Self::DEFAULT_STRING_SEGMENTS,
        }
    }
}
