//! Show the branch, pending merge and changed paths

use crate::util;
use anyhow::{Context, Result};
use ::checkout::{count_conflicts, has_conflict_markers, MergeState};
use history::get_branch_name;
use idiota_core::diff::{iter_changed_files, ChangeKind};
use idiota_core::refs::{HEAD, MERGE_HEAD};
use idiota_core::Oid;
use std::collections::BTreeMap;

pub fn run() -> Result<()> {
    let repo = util::open_repo()?;
    let rules = util::load_rules(&repo)?;

    // 1. Where HEAD is
    match get_branch_name(&repo)? {
        Some(branch) => println!("On branch {}", util::green(branch)),
        None => {
            let head = repo.refs().get_ref(HEAD, true)?.oid()?;
            let short = head.map(|oid| oid.short()).unwrap_or_default();
            println!("HEAD detached at {}", util::yellow(short));
        }
    }

    // 2. Pending merge
    if let Some(merge_head) = repo.refs().get_ref(MERGE_HEAD, true)?.oid()? {
        println!("Merging with {}", util::yellow(merge_head.short()));

        let state = MergeState::load(repo.meta_dir()).context("Failed to read merge state")?;
        let mut unmerged = Vec::new();
        for path in state.map(|s| s.conflicts).unwrap_or_default() {
            let file = repo.root().join(&path);
            if has_conflict_markers(&file)? {
                let content = std::fs::read(&file)?;
                unmerged.push((path, count_conflicts(&String::from_utf8_lossy(&content))));
            }
        }
        if !unmerged.is_empty() {
            println!();
            println!("Unmerged paths:");
            for (path, regions) in unmerged {
                println!(
                    "{:>12}: {} ({} conflicts)",
                    "both changed",
                    util::red(path),
                    regions
                );
            }
        }
    }

    // 3. Staged and unstaged changes
    let head_tree = util::head_tree(&repo)?;
    let index_tree = repo.get_index_tree()?;
    let working = worktree::working_tree(&repo, &rules).context("Failed to scan working tree")?;

    print_changes("Changes to be committed:", &head_tree, &index_tree, |s| util::green(s));
    print_changes("Changes not staged for commit:", &index_tree, &working, |s| util::red(s));
    Ok(())
}

fn print_changes(
    title: &str,
    from: &BTreeMap<String, Oid>,
    to: &BTreeMap<String, Oid>,
    paint: fn(String) -> String,
) {
    let changes: Vec<(&str, ChangeKind)> = iter_changed_files(from, to).collect();
    if changes.is_empty() {
        return;
    }
    println!();
    println!("{}", title);
    for (path, kind) in changes {
        println!("{}", paint(format!("{:>12}: {}", kind.as_str(), path)));
    }
}
