//! Error taxonomy shared by every idiota library crate

use crate::hash::Oid;
use crate::object::ObjectKind;
use std::path::PathBuf;

/// Errors raised by the object, reference, and commit layers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("object {0} not found")]
    ObjectNotFound(Oid),

    #[error("object {oid} is a {actual}, expected a {expected}")]
    UnexpectedObjectKind {
        oid: Oid,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("object {oid} is malformed: {reason}")]
    MalformedObject { oid: Oid, reason: String },

    #[error("invalid object id '{0}'")]
    InvalidOid(String),

    #[error("unknown reference '{0}'")]
    UnknownReference(String),

    #[error("ambiguous reference '{name}' matches {} objects", candidates.len())]
    AmbiguousReference { name: String, candidates: Vec<Oid> },

    #[error("commit {oid} is malformed: {reason}")]
    MalformedCommit { oid: Oid, reason: String },

    #[error("tree {oid} is malformed: {reason}")]
    MalformedTree { oid: Oid, reason: String },

    #[error("symbolic reference loop at '{0}'")]
    SymbolicRefLoop(String),

    #[error("invalid reference name '{0}'")]
    InvalidRefName(String),

    #[error("invalid path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },

    #[error("not an idiota repository (no .idiota directory found from {})", .0.display())]
    NotARepository(PathBuf),

    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("merge would place both a file and a directory at '{0}'")]
    PathCollision(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid ignore pattern: {0}")]
    IgnorePattern(String),

    #[error("malformed metadata file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed_object(oid: Oid, reason: impl Into<String>) -> Self {
        Self::MalformedObject {
            oid,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the idiota crates
pub type Result<T> = std::result::Result<T, Error>;
