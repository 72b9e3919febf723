//! View and edit configuration

use crate::util;
use anyhow::{Context, Result};
use idiota_core::config::KEYS;
use idiota_core::RepoConfig;

pub fn run_list() -> Result<()> {
    let repo = util::open_repo()?;
    let config = repo.config();
    for key in KEYS {
        println!("{}={}", key, config.get(key)?);
    }
    Ok(())
}

pub fn run_get(key: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let value = repo.config().get(key)?;
    println!("{}", value);
    Ok(())
}

pub fn run_set(key: &str, value: &str) -> Result<()> {
    let repo = util::open_repo()?;
    RepoConfig::set_repo_value(repo.meta_dir(), key, value)
        .with_context(|| format!("Failed to set {}", key))?;
    println!("{} = {}", key, value);
    Ok(())
}
