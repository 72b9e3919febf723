//! Show a commit and the changes it introduced

use crate::diff_utils::colorize_diff;
use crate::util;
use anyhow::Result;
use history::get_commit;
use idiota_core::diff::diff_trees;
use std::collections::BTreeMap;

pub fn run(name: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let oid = util::resolve(&repo, name)?;
    let commit = get_commit(&repo, oid)?;
    let refs = util::ref_names_by_oid(&repo)?;

    // Diff against the first parent; a root commit shows everything as new
    let parent_tree = match commit.parents.first() {
        Some(&parent) => util::commit_tree(&repo, parent)?,
        None => BTreeMap::new(),
    };
    let tree = repo.get_tree(commit.tree)?;

    util::print_commit(oid, &commit, &refs);
    let diff = diff_trees(
        repo.objects(),
        &parent_tree,
        &tree,
        repo.config().diff.context_lines,
    )?;
    print!("{}", colorize_diff(&String::from_utf8_lossy(&diff)));
    Ok(())
}
