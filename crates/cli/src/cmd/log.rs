//! Show commit history

use crate::util;
use anyhow::Result;
use history::{get_commit, iter_commits_and_parents};

pub fn run(start: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let oid = util::resolve(&repo, start)?;
    let refs = util::ref_names_by_oid(&repo)?;

    for oid in iter_commits_and_parents(&repo, [oid]) {
        let oid = oid?;
        let commit = get_commit(&repo, oid)?;
        util::print_commit(oid, &commit, &refs);
    }
    Ok(())
}
