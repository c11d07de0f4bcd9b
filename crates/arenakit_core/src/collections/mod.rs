//! # Collections
//!
//! Containers layered directly on the pool arena.

mod set;

pub use set::{DenseSet, Iter};
