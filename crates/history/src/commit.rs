//! Commit objects
//!
//! Payload format:
//! ```text
//! tree <oid>
//! parent <oid>        (zero, one or two lines)
//!
//! <message>
//! ```

use idiota_core::refs::{RefValue, HEAD, MERGE_HEAD};
use idiota_core::store::MERGE_STATE_FILE;
use idiota_core::{Error, ObjectKind, Oid, Repository, Result};
use std::io::ErrorKind;
use tracing::info;

/// Maximum number of parents a commit may record
pub const MAX_PARENTS: usize = 2;

/// A snapshot plus its position in history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Root tree
    pub tree: Oid,
    /// First parent is the previous HEAD; a second one is the merged commit
    pub parents: Vec<Oid>,
    pub message: String,
}

impl Commit {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = format!("tree {}\n", self.tree);
        for parent in &self.parents {
            out.push_str(&format!("parent {}\n", parent));
        }
        out.push('\n');
        out.push_str(&self.message);
        if !self.message.ends_with('\n') {
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Parse the payload of commit `oid`
    pub fn parse(oid: Oid, bytes: &[u8]) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedCommit { oid, reason };
        let text = std::str::from_utf8(bytes).map_err(|_| malformed("not utf-8".into()))?;

        let (headers, message) = match text.find("\n\n") {
            Some(pos) => (&text[..pos], &text[pos + 2..]),
            None => (text.trim_end_matches('\n'), ""),
        };

        let mut tree = None;
        let mut parents = Vec::new();
        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| malformed(format!("bad header line '{}'", line)))?;
            let value_oid = || {
                Oid::from_hex(value).map_err(|_| malformed(format!("bad {} id '{}'", key, value)))
            };
            match key {
                "tree" if tree.is_none() => tree = Some(value_oid()?),
                "tree" => return Err(malformed("duplicate tree header".into())),
                "parent" => {
                    if parents.len() == MAX_PARENTS {
                        return Err(malformed(format!("more than {} parents", MAX_PARENTS)));
                    }
                    parents.push(value_oid()?);
                }
                other => return Err(malformed(format!("unknown header '{}'", other))),
            }
        }

        Ok(Self {
            tree: tree.ok_or_else(|| malformed("missing tree header".into()))?,
            parents,
            message: message.strip_suffix('\n').unwrap_or(message).to_string(),
        })
    }
}

/// Load and parse commit `oid`
pub fn get_commit(repo: &Repository, oid: Oid) -> Result<Commit> {
    let bytes = repo.objects().get_object(oid, Some(ObjectKind::Commit))?;
    Commit::parse(oid, &bytes)
}

/// Record the index as a new commit on top of HEAD
///
/// A pending MERGE_HEAD becomes the second parent and the merge is
/// concluded.
pub fn commit(repo: &Repository, message: &str) -> Result<Oid> {
    let tree = repo.write_tree()?;
    let refs = repo.refs();

    let mut parents = Vec::new();
    if let Some(head) = refs.get_ref(HEAD, true)?.oid()? {
        parents.push(head);
    }
    if let Some(merge_head) = refs.get_ref(MERGE_HEAD, true)?.oid()? {
        parents.push(merge_head);
    }

    let commit = Commit {
        tree,
        parents,
        message: message.to_string(),
    };
    let oid = repo
        .objects()
        .hash_object(&commit.serialize(), ObjectKind::Commit)?;

    refs.update_ref(HEAD, &RefValue::direct(oid), true)?;
    refs.delete_ref(MERGE_HEAD, false)?;
    match std::fs::remove_file(repo.meta_dir().join(MERGE_STATE_FILE)) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    info!(%oid, %tree, parents = commit.parents.len(), "created commit");
    Ok(oid)
}
