//! Three-way merge of commits
//!
//! This module handles:
//! - Choosing between up-to-date, fast-forward and a true merge
//! - Per-path 3-way merge against the merge base
//! - Conflict markers for paths changed on both sides
//! - Persisting the pending merge (MERGE_HEAD plus merge state)

use crate::checkout::{apply_entries, read_tree};
use crate::conflicts::conflict_markers;
use history::{get_commit, get_merge_base, is_ancestor};
use idiota_core::diff::compare_trees;
use idiota_core::refs::{RefValue, HEAD, MERGE_HEAD};
use idiota_core::store::{atomic_write, MERGE_STATE_FILE};
use idiota_core::{Error, ObjectKind, Oid, Repository, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};
use worktree::IgnoreRules;

/// Label used for our side of conflict markers
pub const OURS_LABEL: &str = "HEAD";

/// What `merge` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The other commit is already contained in HEAD
    UpToDate,
    /// HEAD moved forward to the other commit
    FastForward { from: Option<Oid>, to: Oid },
    /// The merged tree is staged and MERGE_HEAD set; a commit concludes it
    Merged {
        base: Option<Oid>,
        conflicts: Vec<String>,
    },
}

/// Pending merge persisted to `<meta>/state/merge.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeState {
    /// HEAD when the merge started
    pub ours: Oid,
    /// Commit being merged in
    pub theirs: Oid,
    /// Name the merged commit was given on the command line
    pub theirs_label: String,
    pub base: Option<Oid>,
    /// Paths written with conflict markers
    pub conflicts: Vec<String>,
}

impl MergeState {
    /// Load merge state; `None` when no merge is pending
    pub fn load(meta_dir: &Path) -> Result<Option<MergeState>> {
        let content = match std::fs::read(meta_dir.join(MERGE_STATE_FILE)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&content)?))
    }

    pub fn save(&self, meta_dir: &Path) -> Result<()> {
        let path = meta_dir.join(MERGE_STATE_FILE);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec_pretty(self)?;
        atomic_write(&meta_dir.join("tmp"), &path, &content)
    }

    /// Clear merge state (after a commit or abort)
    pub fn clear(meta_dir: &Path) -> Result<()> {
        match std::fs::remove_file(meta_dir.join(MERGE_STATE_FILE)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Result of merging three flat trees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeMerge {
    pub entries: BTreeMap<String, Oid>,
    pub conflicts: Vec<String>,
}

/// Merge `ours` and `theirs` against `base`, path by path
///
/// A path changed identically on both sides, or on one side only, takes
/// that change. A path changed differently on both sides gets a blob with
/// conflict markers. A merge that would leave a file where the other side
/// needs a directory fails with `PathCollision`.
pub fn merge_trees(
    repo: &Repository,
    base: &BTreeMap<String, Oid>,
    ours: &BTreeMap<String, Oid>,
    theirs: &BTreeMap<String, Oid>,
    theirs_label: &str,
) -> Result<TreeMerge> {
    let mut merged = TreeMerge::default();

    for (path, our_oid, their_oid) in compare_trees(ours, theirs) {
        let base_oid = base.get(path).copied();
        let resolved = if our_oid == their_oid || their_oid == base_oid {
            our_oid
        } else if our_oid == base_oid {
            their_oid
        } else {
            let load = |oid: Option<Oid>| -> Result<Option<Vec<u8>>> {
                oid.map(|oid| repo.objects().get_object(oid, Some(ObjectKind::Blob)))
                    .transpose()
            };
            let content = conflict_markers(
                load(base_oid)?.as_deref(),
                load(our_oid)?.as_deref(),
                load(their_oid)?.as_deref(),
                OURS_LABEL,
                theirs_label,
            );
            debug!(path, "conflict");
            merged.conflicts.push(path.to_string());
            Some(repo.objects().hash_object(&content, ObjectKind::Blob)?)
        };

        if let Some(oid) = resolved {
            merged.entries.insert(path.to_string(), oid);
        }
    }

    if let Some(path) = find_path_collision(&merged.entries) {
        return Err(Error::PathCollision(path));
    }
    Ok(merged)
}

/// First file path that is also the parent directory of another path
fn find_path_collision(entries: &BTreeMap<String, Oid>) -> Option<String> {
    entries.keys().find_map(|path| {
        let prefix = format!("{}/", path);
        entries
            .range(prefix.clone()..)
            .next()
            .filter(|(next, _)| next.starts_with(&prefix))
            .map(|_| path.clone())
    })
}

/// Merge commit `other` into HEAD
///
/// `label` names the other side in conflict markers.
pub fn merge(
    repo: &Repository,
    rules: &IgnoreRules,
    other: Oid,
    label: &str,
) -> Result<MergeOutcome> {
    let other_commit = get_commit(repo, other)?;
    let head = repo.refs().get_ref(HEAD, true)?.oid()?;

    let Some(head) = head else {
        // Nothing committed yet: adopt the other history wholesale
        return fast_forward(repo, rules, None, other, other_commit.tree);
    };

    if is_ancestor(repo, other, head)? {
        info!(%head, %other, "already up to date");
        return Ok(MergeOutcome::UpToDate);
    }
    if is_ancestor(repo, head, other)? {
        return fast_forward(repo, rules, Some(head), other, other_commit.tree);
    }

    let base = get_merge_base(repo, head, other)?;
    let base_tree = match base {
        Some(base) => repo.get_tree(get_commit(repo, base)?.tree)?,
        None => BTreeMap::new(),
    };
    let ours_tree = repo.get_tree(get_commit(repo, head)?.tree)?;
    let theirs_tree = repo.get_tree(other_commit.tree)?;

    let merged = merge_trees(repo, &base_tree, &ours_tree, &theirs_tree, label)?;

    // The pending merge is recorded only once the result is in place
    apply_entries(repo, rules, merged.entries)?;
    repo.refs()
        .update_ref(MERGE_HEAD, &RefValue::direct(other), false)?;
    MergeState {
        ours: head,
        theirs: other,
        theirs_label: label.to_string(),
        base,
        conflicts: merged.conflicts.clone(),
    }
    .save(repo.meta_dir())?;

    info!(%head, %other, base = ?base, conflicts = merged.conflicts.len(), "merged");
    Ok(MergeOutcome::Merged {
        base,
        conflicts: merged.conflicts,
    })
}

fn fast_forward(
    repo: &Repository,
    rules: &IgnoreRules,
    from: Option<Oid>,
    to: Oid,
    tree: Oid,
) -> Result<MergeOutcome> {
    read_tree(repo, rules, tree)?;
    repo.refs().update_ref(HEAD, &RefValue::direct(to), true)?;
    info!(from = ?from, %to, "fast-forward");
    Ok(MergeOutcome::FastForward { from, to })
}
