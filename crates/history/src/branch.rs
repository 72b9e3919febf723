//! Branches, tags and moving HEAD

use idiota_core::refs::{validate_ref_name, RefValue, HEAD, HEADS_PREFIX, TAGS_PREFIX};
use idiota_core::{Error, Oid, Repository, Result};
use tracing::info;

pub fn create_branch(repo: &Repository, name: &str, oid: Oid) -> Result<()> {
    validate_ref_name(name)?;
    repo.refs()
        .update_ref(&format!("{}{}", HEADS_PREFIX, name), &RefValue::direct(oid), true)?;
    info!(branch = name, %oid, "created branch");
    Ok(())
}

pub fn create_tag(repo: &Repository, name: &str, oid: Oid) -> Result<()> {
    validate_ref_name(name)?;
    repo.refs()
        .update_ref(&format!("{}{}", TAGS_PREFIX, name), &RefValue::direct(oid), true)?;
    info!(tag = name, %oid, "created tag");
    Ok(())
}

/// Delete branch `name`, returning the commit it pointed at
pub fn delete_branch(repo: &Repository, name: &str) -> Result<Oid> {
    let ref_name = format!("{}{}", HEADS_PREFIX, name);
    let oid = repo
        .refs()
        .get_ref(&ref_name, false)?
        .oid()?
        .ok_or_else(|| Error::UnknownReference(name.to_string()))?;
    repo.refs().delete_ref(&ref_name, false)?;
    info!(branch = name, %oid, "deleted branch");
    Ok(oid)
}

/// Whether `name` is an existing branch
pub fn is_branch(repo: &Repository, name: &str) -> Result<bool> {
    if validate_ref_name(name).is_err() {
        return Ok(false);
    }
    let value = repo.refs().get_ref(&format!("{}{}", HEADS_PREFIX, name), true)?;
    Ok(value.value.is_some())
}

/// Branch names (without `refs/heads/`), sorted
pub fn iter_branch_names(repo: &Repository) -> Result<Vec<String>> {
    names_under(repo, HEADS_PREFIX)
}

/// Tag names (without `refs/tags/`), sorted
pub fn iter_tag_names(repo: &Repository) -> Result<Vec<String>> {
    names_under(repo, TAGS_PREFIX)
}

fn names_under(repo: &Repository, prefix: &str) -> Result<Vec<String>> {
    Ok(repo
        .refs()
        .iter_refs(prefix, false)?
        .into_iter()
        .filter_map(|(name, _)| name.strip_prefix(prefix).map(String::from))
        .collect())
}

/// The branch HEAD points at, or `None` when HEAD is detached
pub fn get_branch_name(repo: &Repository) -> Result<Option<String>> {
    let head = repo.refs().get_ref(HEAD, false)?;
    if !head.symbolic {
        return Ok(None);
    }
    Ok(head
        .value
        .as_deref()
        .and_then(|target| target.strip_prefix(HEADS_PREFIX))
        .map(String::from))
}

/// Move HEAD (the current branch when attached) to `oid`
pub fn reset(repo: &Repository, oid: Oid) -> Result<()> {
    repo.refs().update_ref(HEAD, &RefValue::direct(oid), true)?;
    info!(%oid, "reset HEAD");
    Ok(())
}
