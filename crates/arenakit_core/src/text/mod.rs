//! # Text Storage
//!
//! Byte strings kept in arena memory:
//! - [`StringStore`]: unbounded-length strings in fixed 64-byte segments
//! - [`concat_in`] / [`concat_str_in`]: one-shot contiguous building in a bump arena

mod builder;
mod fragmented;

pub use builder::{concat_in, concat_str_in};
pub use fragmented::{StringHandle, StringStore, FRAGMENT_CAPACITY, SEGMENT_SIZE};
