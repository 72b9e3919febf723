//! Moving the working directory and index between snapshots

use history::{get_commit, is_branch};
use idiota_core::refs::{RefValue, HEAD, HEADS_PREFIX};
use idiota_core::{Oid, Repository, Result};
use std::collections::BTreeMap;
use tracing::info;
use worktree::{materialize, IgnoreRules, MaterializeStats};

/// Where HEAD ended up after a checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub oid: Oid,
    /// `Some` when HEAD is attached to a branch
    pub branch: Option<String>,
    pub stats: MaterializeStats,
}

/// Make the index and working directory match `entries`
pub fn apply_entries(
    repo: &Repository,
    rules: &IgnoreRules,
    entries: BTreeMap<String, Oid>,
) -> Result<MaterializeStats> {
    let stats = materialize(repo, rules, &entries)?;
    let mut index = repo.load_index()?;
    index.replace(entries);
    repo.save_index(&index)?;
    Ok(stats)
}

/// Replace the index with tree `tree` and write it into the working directory
pub fn read_tree(repo: &Repository, rules: &IgnoreRules, tree: Oid) -> Result<MaterializeStats> {
    let entries = repo.get_tree(tree)?;
    apply_entries(repo, rules, entries)
}

/// Switch to `name`: a branch attaches HEAD, anything else detaches it
pub fn checkout(repo: &Repository, rules: &IgnoreRules, name: &str) -> Result<CheckoutOutcome> {
    let oid = repo.get_oid(name)?;
    let commit = get_commit(repo, oid)?;
    let stats = read_tree(repo, rules, commit.tree)?;

    let branch = if is_branch(repo, name)? {
        let target = format!("{}{}", HEADS_PREFIX, name);
        repo.refs()
            .update_ref(HEAD, &RefValue::symbolic(target), false)?;
        Some(name.to_string())
    } else {
        repo.refs().update_ref(HEAD, &RefValue::direct(oid), false)?;
        None
    };

    info!(%oid, branch = ?branch, "checked out");
    Ok(CheckoutOutcome { oid, branch, stats })
}
