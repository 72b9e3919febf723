//! Record the index as a commit

use crate::util;
use anyhow::{Context, Result};

pub fn run(message: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let oid = history::commit(&repo, message).context("Failed to create commit")?;
    println!("{}", oid);
    Ok(())
}
