//! Stage files in the index

use crate::util;
use anyhow::{Context, Result};
use std::path::PathBuf;
use worktree::add_paths;

pub fn run(files: &[PathBuf]) -> Result<()> {
    let repo = util::open_repo()?;
    let rules = util::load_rules(&repo)?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let paths = files
        .iter()
        .map(|file| {
            repo.relative_path(&cwd, file)
                .with_context(|| format!("Cannot add {}", file.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut index = repo.load_index()?;
    let staged = add_paths(&repo, &rules, &mut index, &paths)?;
    repo.save_index(&index).context("Failed to save index")?;

    tracing::debug!(count = staged.len(), "staged paths");
    Ok(())
}
