//! Low-level object commands: hash-object, cat-file, write-tree

use crate::util;
use anyhow::{Context, Result};
use idiota_core::ObjectKind;
use std::io::Write;
use std::path::Path;

pub fn hash_object(file: &Path) -> Result<()> {
    let repo = util::open_repo()?;
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let oid = repo.objects().hash_object(&data, ObjectKind::Blob)?;
    println!("{}", oid);
    Ok(())
}

pub fn cat_file(object: &str) -> Result<()> {
    let repo = util::open_repo()?;
    let oid = util::resolve(&repo, object)?;
    let (_, payload) = repo
        .objects()
        .read_object(oid)
        .with_context(|| format!("Failed to read object {}", oid))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&payload)?;
    stdout.flush()?;
    Ok(())
}

pub fn write_tree() -> Result<()> {
    let repo = util::open_repo()?;
    let oid = repo.write_tree().context("Failed to write tree")?;
    println!("{}", oid);
    Ok(())
}
