//! Checkout and merge for idiota
//!
//! This crate provides:
//! - `read-tree` and `checkout` (attached or detached HEAD)
//! - Three-way merge with fast-forward detection
//! - Diff3-style conflict markers
//! - Pending merge state

pub mod checkout;
pub mod conflicts;
pub mod merge;

// Re-exports
pub use self::checkout::{apply_entries, checkout, read_tree, CheckoutOutcome};
pub use conflicts::{conflict_markers, count_conflicts, has_conflict_markers};
pub use merge::{merge, merge_trees, MergeOutcome, MergeState, TreeMerge};
