//! Idiota Core - Content-addressed storage primitives for the idiota VCS
//!
//! This crate provides the foundational storage layer:
//! - SHA-1 object ids
//! - Zlib-compressed object store
//! - References with symbolic indirection
//! - The JSON staging index
//! - Tree objects and tree diffing
//! - Repository layout and layered configuration

pub mod config;
pub mod diff;
pub mod error;
pub mod hash;
pub mod index;
pub mod object;
pub mod refs;
pub mod store;
pub mod tree;

// Re-export main types for convenience
pub use config::{IgnoreConfig, RepoConfig};
pub use diff::ChangeKind;
pub use error::{Error, Result};
pub use hash::Oid;
pub use index::Index;
pub use object::{ObjectKind, ObjectStore};
pub use refs::{RefStore, RefValue};
pub use store::Repository;
pub use tree::{EntryKind, Tree, TreeEntry};
