//! Commit graph traversal and ancestry queries

use crate::commit::get_commit;
use idiota_core::tree::{EntryKind, Tree};
use idiota_core::{ObjectKind, Oid, Repository, Result};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Iterator over every commit reachable from a set of starting commits
///
/// Each commit is yielded once. After a commit is yielded its first parent
/// is visited next and any other parents are queued behind the existing
/// work, so a linear history comes out newest first.
pub struct CommitWalk<'r> {
    repo: &'r Repository,
    queue: VecDeque<Oid>,
    visited: HashSet<Oid>,
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<Oid>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(oid) = self.queue.pop_front() {
            if !self.visited.insert(oid) {
                continue;
            }
            let commit = match get_commit(self.repo, oid) {
                Ok(commit) => commit,
                Err(e) => {
                    self.queue.clear();
                    return Some(Err(e));
                }
            };
            let mut parents = commit.parents.into_iter();
            if let Some(first) = parents.next() {
                self.queue.push_front(first);
            }
            self.queue.extend(parents);
            return Some(Ok(oid));
        }
        None
    }
}

/// Walk the commits reachable from `oids`, the starting commits included
pub fn iter_commits_and_parents(
    repo: &Repository,
    oids: impl IntoIterator<Item = Oid>,
) -> CommitWalk<'_> {
    CommitWalk {
        repo,
        queue: oids.into_iter().collect(),
        visited: HashSet::new(),
    }
}

/// Every commit, tree and blob reachable from `oids`, each listed once
pub fn iter_objects_in_commits(
    repo: &Repository,
    oids: impl IntoIterator<Item = Oid>,
) -> Result<Vec<Oid>> {
    let mut visited = HashSet::new();
    let mut objects = Vec::new();
    for commit_oid in iter_commits_and_parents(repo, oids) {
        let commit_oid = commit_oid?;
        objects.push(commit_oid);
        visited.insert(commit_oid);
        let tree = get_commit(repo, commit_oid)?.tree;
        collect_tree_objects(repo, tree, &mut visited, &mut objects)?;
    }
    Ok(objects)
}

/// Push `tree` and everything below it that is not yet in `visited`
pub fn collect_tree_objects(
    repo: &Repository,
    tree: Oid,
    visited: &mut HashSet<Oid>,
    objects: &mut Vec<Oid>,
) -> Result<()> {
    let mut pending = vec![tree];
    while let Some(oid) = pending.pop() {
        if !visited.insert(oid) {
            continue;
        }
        objects.push(oid);
        for entry in Tree::read(repo.objects(), oid)?.entries() {
            match entry.kind {
                EntryKind::Tree => pending.push(entry.oid),
                EntryKind::Blob => {
                    if visited.insert(entry.oid) {
                        objects.push(entry.oid);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Lowest common ancestor of two commits
///
/// Among the commits reachable from both, the ones that are not an
/// ancestor of another common commit are candidates; the first candidate
/// in `b`'s walk order wins. `None` when the histories share nothing.
pub fn get_merge_base(repo: &Repository, a: Oid, b: Oid) -> Result<Option<Oid>> {
    let ancestors_of_a: HashSet<Oid> =
        iter_commits_and_parents(repo, [a]).collect::<Result<_>>()?;

    let mut common = Vec::new();
    for oid in iter_commits_and_parents(repo, [b]) {
        let oid = oid?;
        if ancestors_of_a.contains(&oid) {
            common.push(oid);
        }
    }

    // Strict ancestors of a common ancestor are never the lowest one
    let mut dominated = HashSet::new();
    for &oid in &common {
        if dominated.contains(&oid) {
            continue;
        }
        let parents = get_commit(repo, oid)?.parents;
        for ancestor in iter_commits_and_parents(repo, parents) {
            dominated.insert(ancestor?);
        }
    }

    let base = common.into_iter().find(|oid| !dominated.contains(oid));
    debug!(%a, %b, base = ?base, "computed merge base");
    Ok(base)
}

/// True when `ancestor` is reachable from `descendant` (a commit is its own ancestor)
pub fn is_ancestor(repo: &Repository, ancestor: Oid, descendant: Oid) -> Result<bool> {
    for oid in iter_commits_and_parents(repo, [descendant]) {
        if oid? == ancestor {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True when `oid` names a commit object
pub fn is_commit(repo: &Repository, oid: Oid) -> Result<bool> {
    Ok(repo.objects().object_kind(oid)? == ObjectKind::Commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Commit;

    /// Repository whose user config layer points at a missing file
    fn init_repo(root: &std::path::Path) -> Result<Repository> {
        std::env::set_var(idiota_core::config::CONFIG_ENV, root.join("no-user-config.toml"));
        Repository::init(root)
    }

    /// Store a commit with an empty tree and the given parents
    fn make(repo: &Repository, message: &str, parents: &[Oid]) -> Oid {
        let tree = repo.write_tree().unwrap();
        let commit = Commit {
            tree,
            parents: parents.to_vec(),
            message: message.to_string(),
        };
        repo.objects()
            .hash_object(&commit.serialize(), ObjectKind::Commit)
            .unwrap()
    }

    fn setup() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_linear_walk_newest_first() -> Result<()> {
        let (_dir, repo) = setup();
        let c1 = make(&repo, "1", &[]);
        let c2 = make(&repo, "2", &[c1]);
        let c3 = make(&repo, "3", &[c2]);

        let order: Vec<Oid> = iter_commits_and_parents(&repo, [c3]).collect::<Result<_>>()?;
        assert_eq!(order, vec![c3, c2, c1]);
        Ok(())
    }

    #[test]
    fn test_merge_walk_visits_each_once() -> Result<()> {
        let (_dir, repo) = setup();
        let root = make(&repo, "root", &[]);
        let left = make(&repo, "left", &[root]);
        let right = make(&repo, "right", &[root]);
        let merge = make(&repo, "merge", &[left, right]);

        let order: Vec<Oid> = iter_commits_and_parents(&repo, [merge]).collect::<Result<_>>()?;
        // First-parent chain first, the second parent afterwards
        assert_eq!(order, vec![merge, left, root, right]);
        Ok(())
    }

    #[test]
    fn test_walk_from_several_starts() -> Result<()> {
        let (_dir, repo) = setup();
        let c1 = make(&repo, "1", &[]);
        let c2 = make(&repo, "2", &[c1]);
        let order: Vec<Oid> =
            iter_commits_and_parents(&repo, [c2, c1, c2]).collect::<Result<_>>()?;
        assert_eq!(order, vec![c2, c1]);
        Ok(())
    }

    #[test]
    fn test_walk_reports_missing_commit() {
        let (_dir, repo) = setup();
        let bogus = idiota_core::object::hash_object_bytes(b"nope", ObjectKind::Commit);
        let results: Vec<_> = iter_commits_and_parents(&repo, [bogus]).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_merge_base_after_divergence() -> Result<()> {
        let (_dir, repo) = setup();
        let h1 = make(&repo, "h1", &[]);
        let h2 = make(&repo, "h2", &[h1]);
        let h3 = make(&repo, "h3", &[h1]);

        assert_eq!(get_merge_base(&repo, h2, h3)?, Some(h1));
        assert_eq!(get_merge_base(&repo, h3, h2)?, Some(h1));
        assert_eq!(get_merge_base(&repo, h2, h1)?, Some(h1));
        assert_eq!(get_merge_base(&repo, h2, h2)?, Some(h2));
        Ok(())
    }

    #[test]
    fn test_merge_base_skips_dominated_ancestors() -> Result<()> {
        let (_dir, repo) = setup();
        // root - x - a
        //        \
        //         y - b   (b also merges x)
        let root = make(&repo, "root", &[]);
        let x = make(&repo, "x", &[root]);
        let a = make(&repo, "a", &[x]);
        let y = make(&repo, "y", &[root]);
        let b = make(&repo, "b", &[y, x]);

        // b's walk meets root before x; x is still the lowest common ancestor
        assert_eq!(get_merge_base(&repo, a, b)?, Some(x));
        Ok(())
    }

    #[test]
    fn test_merge_base_unrelated() -> Result<()> {
        let (_dir, repo) = setup();
        let a = make(&repo, "a", &[]);
        let b = make(&repo, "b", &[]);
        assert_eq!(get_merge_base(&repo, a, b)?, None);
        Ok(())
    }

    #[test]
    fn test_is_ancestor() -> Result<()> {
        let (_dir, repo) = setup();
        let c1 = make(&repo, "1", &[]);
        let c2 = make(&repo, "2", &[c1]);
        assert!(is_ancestor(&repo, c1, c2)?);
        assert!(is_ancestor(&repo, c2, c2)?);
        assert!(!is_ancestor(&repo, c2, c1)?);
        Ok(())
    }

    #[test]
    fn test_objects_in_commits() -> Result<()> {
        let (_dir, repo) = setup();
        let blob = repo.objects().hash_object(b"content", ObjectKind::Blob)?;
        let mut index = repo.load_index()?;
        index.insert("dir/file.txt", blob);
        repo.save_index(&index)?;
        let c1 = make(&repo, "1", &[]);
        let c2 = make(&repo, "2", &[c1]);

        let objects = iter_objects_in_commits(&repo, [c2])?;
        // two commits, root tree, dir tree, one blob
        assert_eq!(objects.len(), 5);
        assert_eq!(objects[0], c2);
        assert!(objects.contains(&blob));
        assert!(is_commit(&repo, c1)?);
        assert!(!is_commit(&repo, blob)?);
        Ok(())
    }
}
