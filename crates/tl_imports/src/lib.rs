//! Identifier liveness analysis and unused-import pruning.
//!
//! Runs on erased text: erasure can make a previously-used name dead
//! (a name mentioned only inside a deleted type annotation), so liveness
//! is always computed on the final code, never the pre-erasure tree.

mod prune;
mod usage;

pub use prune::{prune_unused_imports, PruneConfig};
pub use usage::{collect_usage, UsageSets};
