//! Switch the working tree to another snapshot

use crate::util;
use anyhow::{Context, Result};

pub fn read_tree(tree: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let rules = util::load_rules(&repo)?;
    let oid = util::resolve(&repo, tree)?;

    let stats = ::checkout::read_tree(&repo, &rules, oid)
        .with_context(|| format!("Failed to read tree {}", oid.short()))?;
    println!("Updated {} files, removed {}", stats.written, stats.removed);
    Ok(())
}

pub fn run(name: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let rules = util::load_rules(&repo)?;

    let outcome = ::checkout::checkout(&repo, &rules, name)
        .with_context(|| format!("Cannot check out '{}'", name))?;

    match outcome.branch {
        Some(branch) => println!("Switched to branch {}", util::green(branch)),
        None => println!("HEAD is now at {}", util::yellow(outcome.oid.short())),
    }
    Ok(())
}
