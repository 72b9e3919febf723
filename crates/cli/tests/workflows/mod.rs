//! Workflow integration tests
//!
//! Each test drives several commands against one repository and checks
//! the combined behavior.

pub mod branching;
pub mod errors;
pub mod history;
pub mod merging;
