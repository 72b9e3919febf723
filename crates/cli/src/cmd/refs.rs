//! Branch, tag and reset commands

use crate::util;
use anyhow::{bail, Context, Result};
use history::{create_branch, create_tag, get_branch_name, iter_branch_names, iter_tag_names};

pub fn tag(name: Option<&str>, target: &str) -> Result<()> {
    let repo = util::open_repo()?;

    let Some(name) = name else {
        for tag in iter_tag_names(&repo)? {
            println!("{}", tag);
        }
        return Ok(());
    };

    let oid = util::resolve(&repo, target)?;
    create_tag(&repo, name, oid).with_context(|| format!("Failed to create tag '{}'", name))?;
    Ok(())
}

pub fn branch(name: Option<&str>, start_point: &str) -> Result<()> {
    let repo = util::open_repo()?;

    let Some(name) = name else {
        let current = get_branch_name(&repo)?;
        for branch in iter_branch_names(&repo)? {
            if current.as_deref() == Some(branch.as_str()) {
                println!("* {}", util::green(&branch));
            } else {
                println!("  {}", branch);
            }
        }
        return Ok(());
    };

    let oid = util::resolve(&repo, start_point)?;
    create_branch(&repo, name, oid)
        .with_context(|| format!("Failed to create branch '{}'", name))?;
    println!("Branch {} created at {}", name, util::yellow(oid.short()));
    Ok(())
}

pub fn delete_branch(name: &str) -> Result<()> {
    let repo = util::open_repo()?;

    if get_branch_name(&repo)?.as_deref() == Some(name) {
        bail!("Cannot delete branch '{}': HEAD points at it", name);
    }

    let oid = history::delete_branch(&repo, name)
        .with_context(|| format!("Failed to delete branch '{}'", name))?;
    println!("Deleted branch {} (was {})", name, util::yellow(oid.short()));
    Ok(())
}

pub fn reset(target: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let oid = util::resolve(&repo, target)?;
    history::reset(&repo, oid).context("Failed to reset HEAD")?;
    println!("HEAD is now at {}", util::yellow(oid.short()));
    Ok(())
}
