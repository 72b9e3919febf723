//! Working directory scanning
//!
//! Walks the repository root with `walkdir`, skipping ignored entries, and
//! turns files into repo-relative paths and stored blobs.

use crate::ignore::IgnoreRules;
use idiota_core::store::normalize_path;
use idiota_core::{Error, Index, ObjectKind, Oid, Repository, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Every non-ignored regular file under `dir`, as (repo-relative path, absolute path)
///
/// `dir` must be inside the repository root. Results are sorted by path.
pub fn list_files(
    repo_root: &Path,
    rules: &IgnoreRules,
    dir: &Path,
) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match e.path().strip_prefix(repo_root) {
            Ok(rel) => rel.as_os_str().is_empty() || !rules.should_ignore(rel),
            Err(_) => false,
        });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;

        // Only regular files; symlinks and directories are not tracked
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(repo_root)
            .map_err(|_| Error::InvalidPath {
                path: entry.path().to_path_buf(),
                reason: "outside repository",
            })?;
        files.push((normalize_path(rel)?, entry.path().to_path_buf()));
    }

    Ok(files)
}

/// Hash and store every working file, returning path -> blob id
pub fn working_tree(repo: &Repository, rules: &IgnoreRules) -> Result<BTreeMap<String, Oid>> {
    let mut tree = BTreeMap::new();
    for (path, abs) in list_files(repo.root(), rules, repo.root())? {
        let content = std::fs::read(&abs)?;
        let oid = repo.objects().hash_object(&content, ObjectKind::Blob)?;
        tree.insert(path, oid);
    }
    debug!(files = tree.len(), "scanned working tree");
    Ok(tree)
}

/// Stage repo-relative `paths` into `index`; directories are walked
///
/// A path that no longer exists but is tracked is unstaged. Returns the
/// staged paths.
pub fn add_paths(
    repo: &Repository,
    rules: &IgnoreRules,
    index: &mut Index,
    paths: &[String],
) -> Result<Vec<String>> {
    let mut staged = Vec::new();
    for path in paths {
        let abs = if path.is_empty() {
            repo.root().to_path_buf()
        } else {
            repo.root().join(path)
        };

        if abs.is_dir() {
            let files = list_files(repo.root(), rules, &abs)?;
            unstage_missing(repo, index, path);
            for (rel, file) in files {
                stage_file(repo, index, &rel, &file)?;
                staged.push(rel);
            }
        } else if abs.is_file() {
            stage_file(repo, index, path, &abs)?;
            staged.push(path.clone());
        } else if index.get(path).is_some() {
            index.remove(path);
            debug!(path = %path, "unstaged deleted file");
        } else if index.iter().any(|(p, _)| p.starts_with(&format!("{}/", path))) {
            index.remove_dir(path);
            debug!(path = %path, "unstaged deleted directory");
        } else {
            return Err(Error::InvalidPath {
                path: PathBuf::from(path),
                reason: "did not match any files",
            });
        }
    }
    Ok(staged)
}

/// Drop tracked entries under `dir` whose file is gone from disk
fn unstage_missing(repo: &Repository, index: &mut Index, dir: &str) {
    let prefix = if dir.is_empty() { String::new() } else { format!("{}/", dir) };
    let missing: Vec<String> = index
        .iter()
        .filter(|(p, _)| p.starts_with(&prefix) && !repo.root().join(p.as_str()).is_file())
        .map(|(p, _)| p.clone())
        .collect();
    for path in missing {
        debug!(path = %path, "unstaged deleted file");
        index.remove(&path);
    }
}

fn stage_file(repo: &Repository, index: &mut Index, rel: &str, abs: &Path) -> Result<()> {
    let content = std::fs::read(abs)?;
    let oid = repo.objects().hash_object(&content, ObjectKind::Blob)?;
    // A file replacing a tracked directory (or the reverse) drops the old entries
    index.remove_dir(rel);
    let mut end = 0;
    while let Some(pos) = rel[end..].find('/') {
        end += pos;
        index.remove(&rel[..end]);
        end += 1;
    }
    index.insert(rel, oid);
    Ok(())
}
