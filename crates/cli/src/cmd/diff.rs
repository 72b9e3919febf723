//! Show changes between a commit, the index and the working tree

use crate::diff_utils::colorize_diff;
use crate::util;
use anyhow::{Context, Result};
use idiota_core::diff::diff_trees;

pub fn run(cached: bool, commit: Option<&str>) -> Result<()> {
    let repo = util::open_repo()?;

    let from = match commit {
        Some(name) => {
            let oid = util::resolve(&repo, name)?;
            Some(util::commit_tree(&repo, oid)?)
        }
        None => None,
    };

    let (from, to) = if cached {
        let from = match from {
            Some(tree) => tree,
            None => util::head_tree(&repo)?,
        };
        (from, repo.get_index_tree()?)
    } else {
        let from = match from {
            Some(tree) => tree,
            None => repo.get_index_tree()?,
        };
        let rules = util::load_rules(&repo)?;
        let to = worktree::working_tree(&repo, &rules)
            .context("Failed to scan working tree")?;
        (from, to)
    };

    let diff = diff_trees(
        repo.objects(),
        &from,
        &to,
        repo.config().diff.context_lines,
    )?;
    print!("{}", colorize_diff(&String::from_utf8_lossy(&diff)));
    Ok(())
}
