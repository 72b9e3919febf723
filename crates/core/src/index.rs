//! Staging area: repo-relative path -> blob id, persisted as JSON

use crate::error::Result;
use crate::hash::Oid;
use crate::store::atomic_write;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

/// File name of the index inside the metadata directory
pub const INDEX_FILE: &str = "index";

/// The next tree to be committed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, Oid>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `<meta>/index`; a missing file is an empty index
    pub fn load(meta_dir: &Path) -> Result<Self> {
        let bytes = match std::fs::read(meta_dir.join(INDEX_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        let entries = serde_json::from_slice(&bytes)?;
        Ok(Self { entries })
    }

    pub fn save(&self, meta_dir: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        atomic_write(&meta_dir.join("tmp"), &meta_dir.join(INDEX_FILE), &json)
    }

    pub fn insert(&mut self, path: impl Into<String>, oid: Oid) -> Option<Oid> {
        self.entries.insert(path.into(), oid)
    }

    pub fn remove(&mut self, path: &str) -> Option<Oid> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<Oid> {
        self.entries.get(path).copied()
    }

    /// Drop every entry at or below `dir`
    pub fn remove_dir(&mut self, dir: &str) {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.entries.retain(|path, _| path != dir && !path.starts_with(&prefix));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the whole index with `entries`
    pub fn replace(&mut self, entries: BTreeMap<String, Oid>) {
        self.entries = entries;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Oid)> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &BTreeMap<String, Oid> {
        &self.entries
    }

    pub fn into_entries(self) -> BTreeMap<String, Oid> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
