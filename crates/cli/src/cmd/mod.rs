//! CLI command implementations

pub mod add;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod diff;
pub mod gc;
pub mod init;
pub mod k;
pub mod log;
pub mod merge;
pub mod objects;
pub mod refs;
pub mod show;
pub mod status;
