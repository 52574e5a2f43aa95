//! Type-erasure transformer.
//!
//! Walks a parsed module once, asks the classifier what to do with each
//! recognised node, and records byte-range deletions that are applied to
//! the original text in one batch. Untouched regions of the input survive
//! byte-for-byte, comments and whitespace included.

pub mod classify;
mod erase;

pub use erase::erase_source;
