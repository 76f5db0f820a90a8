//! The text rope: a balanced, byte-addressable UTF-8 buffer with O(log N)
//! positional edits and line indexing.
//!
//! This crate owns exactly one data structure — [`Rope`] — plus the UTF-8
//! codec it's built on. Segmentation, search, locators and parsing live in
//! their own crates and consume `Rope` only through this public surface.

pub mod codec;
mod error;
mod rope;

pub use error::Error;
pub use rope::{Cursor, Direction, Rope};
