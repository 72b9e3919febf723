//! Initialize an idiota repository

use anyhow::{Context, Result};
use idiota_core::Repository;
use std::env;

pub fn run() -> Result<()> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;

    let repo = Repository::init(&current_dir)
        .with_context(|| format!("Failed to initialize repository at {}", current_dir.display()))?;

    println!(
        "Initialized empty idiota repository in {}",
        repo.meta_dir().display()
    );
    Ok(())
}
