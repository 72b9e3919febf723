//! Write a flat path -> blob map into the working directory
//!
//! Files not in the target are removed (ignored paths and the metadata
//! directory are never touched), target files are written, and directories
//! left empty are pruned.

use crate::ignore::IgnoreRules;
use crate::scan::list_files;
use idiota_core::object::hash_object_bytes;
use idiota_core::{ObjectKind, Oid, Repository, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// What a materialization changed on disk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeStats {
    pub written: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Make the working directory match `target`
pub fn materialize(
    repo: &Repository,
    rules: &IgnoreRules,
    target: &BTreeMap<String, Oid>,
) -> Result<MaterializeStats> {
    let root = repo.root();
    let mut stats = MaterializeStats::default();

    for (path, abs) in list_files(root, rules, root)? {
        if !target.contains_key(&path) {
            fs::remove_file(&abs)?;
            stats.removed += 1;
        }
    }

    for (path, oid) in target {
        let file_path = root.join(path);

        // Current content already matches
        if file_path.is_file() {
            let current = fs::read(&file_path)?;
            if hash_object_bytes(&current, ObjectKind::Blob) == *oid {
                stats.unchanged += 1;
                continue;
            }
        } else if file_path.is_dir() {
            fs::remove_dir_all(&file_path)?;
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = repo.objects().get_object(*oid, Some(ObjectKind::Blob))?;
        fs::write(&file_path, content)?;
        stats.written += 1;
    }

    prune_empty_dirs(root, rules)?;
    debug!(
        written = stats.written,
        unchanged = stats.unchanged,
        removed = stats.removed,
        "materialized tree"
    );
    Ok(stats)
}

/// Remove non-ignored directories that contain nothing, deepest first
fn prune_empty_dirs(root: &Path, rules: &IgnoreRules) -> Result<()> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| match e.path().strip_prefix(root) {
            Ok(rel) => !rules.should_ignore(rel),
            Err(_) => false,
        });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if fs::read_dir(entry.path())?.next().is_none() {
            fs::remove_dir(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::working_tree;
    use idiota_core::IgnoreConfig;

    /// Repository whose user config layer points at a missing file
    fn init_repo(root: &std::path::Path) -> Result<Repository> {
        std::env::set_var(idiota_core::config::CONFIG_ENV, root.join("no-user-config.toml"));
        Repository::init(root)
    }

    fn setup() -> (tempfile::TempDir, Repository, IgnoreRules) {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path()).unwrap();
        let rules = IgnoreRules::load(repo.root(), IgnoreConfig::default()).unwrap();
        (dir, repo, rules)
    }

    fn blob(repo: &Repository, content: &str) -> Oid {
        repo.objects()
            .hash_object(content.as_bytes(), ObjectKind::Blob)
            .unwrap()
    }

    #[test]
    fn test_materialize_creates_files() -> Result<()> {
        let (_dir, repo, rules) = setup();
        let mut target = BTreeMap::new();
        target.insert("file1.txt".to_string(), blob(&repo, "content1"));
        target.insert("dir/file2.txt".to_string(), blob(&repo, "content2"));

        let stats = materialize(&repo, &rules, &target)?;
        assert_eq!(stats.written, 2);
        assert_eq!(fs::read_to_string(repo.root().join("file1.txt"))?, "content1");
        assert_eq!(fs::read_to_string(repo.root().join("dir/file2.txt"))?, "content2");
        assert_eq!(working_tree(&repo, &rules)?, target);
        Ok(())
    }

    #[test]
    fn test_materialize_removes_stale_and_prunes() -> Result<()> {
        let (_dir, repo, rules) = setup();
        let root = repo.root();
        fs::create_dir_all(root.join("old/deep"))?;
        fs::write(root.join("old/deep/stale.txt"), b"stale")?;
        fs::write(root.join("keep.txt"), b"keep")?;

        let mut target = BTreeMap::new();
        target.insert("keep.txt".to_string(), blob(&repo, "keep"));

        let stats = materialize(&repo, &rules, &target)?;
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.unchanged, 1);
        assert!(!root.join("old").exists());
        assert!(root.join(".idiota/HEAD").exists());
        Ok(())
    }

    #[test]
    fn test_materialize_leaves_ignored_files() -> Result<()> {
        let (_dir, repo, _) = setup();
        let root = repo.root();
        fs::write(root.join(".gitignore"), b"*.log\n")?;
        fs::write(root.join("build.log"), b"log")?;
        let rules = IgnoreRules::load(root, IgnoreConfig::default())?;

        materialize(&repo, &rules, &BTreeMap::new())?;
        assert!(root.join("build.log").exists());
        assert!(!root.join(".gitignore").exists());
        Ok(())
    }

    #[test]
    fn test_materialize_file_replaces_directory() -> Result<()> {
        let (_dir, repo, rules) = setup();
        let root = repo.root();
        fs::create_dir_all(root.join("node"))?;
        fs::write(root.join("node/child.txt"), b"x")?;

        let mut target = BTreeMap::new();
        target.insert("node".to_string(), blob(&repo, "file now"));
        materialize(&repo, &rules, &target)?;
        assert_eq!(fs::read_to_string(root.join("node"))?, "file now");
        Ok(())
    }
}
