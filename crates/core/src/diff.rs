//! Structural and textual differences between two path -> blob maps

use crate::error::Result;
use crate::hash::Oid;
use crate::object::{ObjectKind, ObjectStore};
use similar::TextDiff;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How a path differs between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    NewFile,
    Deleted,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::NewFile => "new file",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every path present in either map, sorted, paired with its previous and next id
pub fn compare_trees<'a>(
    from: &'a BTreeMap<String, Oid>,
    to: &'a BTreeMap<String, Oid>,
) -> impl Iterator<Item = (&'a str, Option<Oid>, Option<Oid>)> + 'a {
    let paths: BTreeSet<&'a String> = from.keys().chain(to.keys()).collect();
    paths
        .into_iter()
        .map(move |path| (path.as_str(), from.get(path).copied(), to.get(path).copied()))
}

/// Changed paths between two snapshots; unchanged paths are skipped
///
/// Hash equality stands in for content equality.
pub fn iter_changed_files<'a>(
    from: &'a BTreeMap<String, Oid>,
    to: &'a BTreeMap<String, Oid>,
) -> impl Iterator<Item = (&'a str, ChangeKind)> + 'a {
    compare_trees(from, to).filter_map(|(path, old, new)| match (old, new) {
        (None, Some(_)) => Some((path, ChangeKind::NewFile)),
        (Some(_), None) => Some((path, ChangeKind::Deleted)),
        (Some(a), Some(b)) if a != b => Some((path, ChangeKind::Modified)),
        _ => None,
    })
}

/// Check if content is binary (contains null bytes in first 8KB)
pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

/// Render one path's change as a unified diff block
pub fn diff_blobs(
    store: &ObjectStore,
    from: Option<Oid>,
    to: Option<Oid>,
    path: &str,
    context_lines: usize,
) -> Result<String> {
    let load = |oid: Option<Oid>| -> Result<Vec<u8>> {
        match oid {
            Some(oid) => store.get_object(oid, Some(ObjectKind::Blob)),
            None => Ok(Vec::new()),
        }
    };
    let old_content = load(from)?;
    let new_content = load(to)?;

    let old_header = if from.is_some() { format!("a/{}", path) } else { "/dev/null".to_string() };
    let new_header = if to.is_some() { format!("b/{}", path) } else { "/dev/null".to_string() };

    let mut output = format!("diff --idiota a/{} b/{}\n", path, path);
    if is_binary(&old_content) || is_binary(&new_content) {
        output.push_str(&format!("Binary files {} and {} differ\n", old_header, new_header));
        return Ok(output);
    }

    let old_text = String::from_utf8_lossy(&old_content);
    let new_text = String::from_utf8_lossy(&new_content);
    let diff = TextDiff::from_lines(&old_text, &new_text);
    let unified = diff
        .unified_diff()
        .context_radius(context_lines)
        .header(&old_header, &new_header)
        .to_string();
    output.push_str(&unified);
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

/// Unified diff of every changed path between two snapshots
pub fn diff_trees(
    store: &ObjectStore,
    from: &BTreeMap<String, Oid>,
    to: &BTreeMap<String, Oid>,
    context_lines: usize,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    for (path, old, new) in compare_trees(from, to) {
        if old == new {
            continue;
        }
        let block = diff_blobs(store, old, new, path, context_lines)?;
        output.extend_from_slice(block.as_bytes());
    }
    Ok(output)
}
