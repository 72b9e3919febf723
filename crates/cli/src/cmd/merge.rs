//! Merge a commit into HEAD

use crate::util;
use anyhow::{bail, Context, Result};
use ::checkout::MergeOutcome;
use history::get_merge_base;
use idiota_core::refs::MERGE_HEAD;

pub fn run(name: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let rules = util::load_rules(&repo)?;

    if let Some(pending) = repo.refs().get_ref(MERGE_HEAD, true)?.oid()? {
        bail!(
            "A merge with {} is in progress; commit the result first",
            pending.short()
        );
    }

    let other = util::resolve(&repo, name)?;
    let outcome = ::checkout::merge(&repo, &rules, other, name)
        .with_context(|| format!("Failed to merge '{}'", name))?;

    match outcome {
        MergeOutcome::UpToDate => println!("Already up to date."),
        MergeOutcome::FastForward { from, to } => {
            let from = from.map(|oid| oid.short()).unwrap_or_else(|| "(unborn)".to_string());
            println!("Updating {}..{}", from, to.short());
            println!("Fast-forward");
        }
        MergeOutcome::Merged { conflicts, .. } => {
            if conflicts.is_empty() {
                println!("Merged in working tree. Please commit");
            } else {
                for path in &conflicts {
                    println!(
                        "{}",
                        util::red(format!("CONFLICT (content): Merge conflict in {}", path))
                    );
                }
                println!("Automatic merge failed; fix conflicts and then commit the result.");
            }
        }
    }
    Ok(())
}

pub fn merge_base(first: &str, second: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let a = util::resolve(&repo, first)?;
    let b = util::resolve(&repo, second)?;

    match get_merge_base(&repo, a, b)? {
        Some(base) => println!("{}", base),
        None => bail!("No common ancestor between '{}' and '{}'", first, second),
    }
    Ok(())
}
