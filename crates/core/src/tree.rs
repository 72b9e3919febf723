//! Tree objects: directory snapshots built from flat path -> blob maps

use crate::error::{Error, Result};
use crate::hash::Oid;
use crate::object::{ObjectKind, ObjectStore};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// Type of tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// File content
    Blob,
    /// Subdirectory
    Tree,
}

impl EntryKind {
    fn object_kind(self) -> ObjectKind {
        match self {
            EntryKind::Blob => ObjectKind::Blob,
            EntryKind::Tree => ObjectKind::Tree,
        }
    }
}

/// Entry in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: EntryKind,
    pub oid: Oid,
    pub name: String,
}

/// A single directory level
///
/// Format, one line per entry sorted by name:
/// `<blob|tree> <40 hex oid> <name>\n`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any entry with the same name
    pub fn insert(&mut self, entry: TreeEntry) {
        match self.entries.binary_search_by(|e| e.name.cmp(&entry.name)) {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(entry.kind.object_kind().as_str().as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.oid.to_hex().as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Parse the payload of tree `oid`
    pub fn deserialize(oid: Oid, bytes: &[u8]) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedTree { oid, reason };
        let text = std::str::from_utf8(bytes).map_err(|_| malformed("not utf-8".into()))?;

        let mut tree = Tree::new();
        for line in text.lines() {
            let mut parts = line.splitn(3, ' ');
            let (kind, hex, name) = match (parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(h), Some(n)) => (k, h, n),
                _ => return Err(malformed(format!("bad entry line '{}'", line))),
            };
            let kind = match kind {
                "blob" => EntryKind::Blob,
                "tree" => EntryKind::Tree,
                other => return Err(malformed(format!("bad entry type '{}'", other))),
            };
            let entry_oid =
                Oid::from_hex(hex).map_err(|_| malformed(format!("bad oid '{}'", hex)))?;
            if name.is_empty() || name.contains('/') || name == "." || name == ".." {
                return Err(malformed(format!("bad entry name '{}'", name)));
            }
            tree.insert(TreeEntry {
                kind,
                oid: entry_oid,
                name: name.to_string(),
            });
        }
        Ok(tree)
    }

    /// Load and parse a tree from the store
    pub fn read(store: &ObjectStore, oid: Oid) -> Result<Self> {
        let bytes = store.get_object(oid, Some(ObjectKind::Tree))?;
        Self::deserialize(oid, &bytes)
    }
}

/// Directory node used while grouping flat paths by directory
#[derive(Default)]
struct DirNode {
    files: BTreeMap<String, Oid>,
    dirs: BTreeMap<String, DirNode>,
}

/// Build the nested tree objects for `entries` and return the root tree id
///
/// Identical maps always produce identical ids; an empty map produces the
/// empty tree.
pub fn write_tree_from(store: &ObjectStore, entries: &BTreeMap<String, Oid>) -> Result<Oid> {
    let mut root = DirNode::default();
    for (path, oid) in entries {
        let components: Vec<&str> = path.split('/').collect();
        if components.iter().any(|c| c.is_empty() || *c == "." || *c == "..") {
            return Err(Error::InvalidPath {
                path: PathBuf::from(path),
                reason: "not a normalized relative path",
            });
        }
        let (file_name, dirs) = components
            .split_last()
            .ok_or_else(|| Error::InvalidPath {
                path: PathBuf::from(path),
                reason: "empty path",
            })?;
        let mut node = &mut root;
        for dir in dirs {
            if node.files.contains_key(*dir) {
                return Err(Error::InvalidPath {
                    path: PathBuf::from(path),
                    reason: "a parent directory is tracked as a file",
                });
            }
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        if node.dirs.contains_key(*file_name) {
            return Err(Error::InvalidPath {
                path: PathBuf::from(path),
                reason: "path is tracked as a directory",
            });
        }
        node.files.insert(file_name.to_string(), *oid);
    }

    let oid = write_node(store, &root)?;
    debug!(%oid, files = entries.len(), "wrote tree");
    Ok(oid)
}

fn write_node(store: &ObjectStore, node: &DirNode) -> Result<Oid> {
    let mut tree = Tree::new();
    for (name, child) in &node.dirs {
        tree.insert(TreeEntry {
            kind: EntryKind::Tree,
            oid: write_node(store, child)?,
            name: name.clone(),
        });
    }
    for (name, oid) in &node.files {
        tree.insert(TreeEntry {
            kind: EntryKind::Blob,
            oid: *oid,
            name: name.clone(),
        });
    }
    store.hash_object(&tree.serialize(), ObjectKind::Tree)
}

/// Flatten tree `oid` into full path -> blob id
pub fn get_tree(store: &ObjectStore, oid: Oid, base_path: &str) -> Result<BTreeMap<String, Oid>> {
    let mut result = BTreeMap::new();
    // (tree, path prefix) pairs still to flatten
    let mut pending = vec![(oid, base_path.trim_end_matches('/').to_string())];
    while let Some((tree_oid, prefix)) = pending.pop() {
        for entry in Tree::read(store, tree_oid)?.entries {
            let path = if prefix.is_empty() {
                entry.name
            } else {
                format!("{}/{}", prefix, entry.name)
            };
            match entry.kind {
                EntryKind::Blob => {
                    result.insert(path, entry.oid);
                }
                EntryKind::Tree => pending.push((entry.oid, path)),
            }
        }
    }
    Ok(result)
}
