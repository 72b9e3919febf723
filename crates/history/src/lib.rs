//! Commit history for idiota
//!
//! This crate provides:
//! - Commit objects and the `commit` operation
//! - Commit graph walks, merge base and ancestry
//! - Branches, tags and reset
//! - Garbage collection of unreachable objects

pub mod branch;
pub mod commit;
pub mod gc;
pub mod graph;

// Re-exports
pub use branch::{
    create_branch, create_tag, delete_branch, get_branch_name, is_branch, iter_branch_names,
    iter_tag_names, reset,
};
pub use commit::{commit, get_commit, Commit};
pub use gc::{gc, GcReport};
pub use graph::{
    get_merge_base, is_ancestor, iter_commits_and_parents, iter_objects_in_commits, CommitWalk,
};
pub use idiota_core::Result;
