//! Working directory access for idiota
//!
//! This crate provides:
//! - Ignore rules (built-in, .idiotaignore, .gitignore, config patterns)
//! - Working tree scanning and staging
//! - Materializing a tree into the working directory

pub mod ignore;
pub mod materialize;
pub mod scan;

// Re-exports
pub use self::ignore::IgnoreRules;
pub use materialize::{materialize, MaterializeStats};
pub use scan::{add_paths, list_files, working_tree};
