//! Mutable named pointers to objects, with symbolic indirection
//!
//! A ref file holds either a hex object id or `ref: <other ref>`.

use crate::error::{Error, Result};
use crate::hash::Oid;
use crate::store::atomic_write;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HEAD: &str = "HEAD";
pub const MERGE_HEAD: &str = "MERGE_HEAD";
pub const HEADS_PREFIX: &str = "refs/heads/";
pub const TAGS_PREFIX: &str = "refs/tags/";

const SYMBOLIC_PREFIX: &str = "ref: ";

/// Contents of a ref: either a direct object id or the name of another ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefValue {
    pub symbolic: bool,
    pub value: Option<String>,
}

impl RefValue {
    pub fn direct(oid: Oid) -> Self {
        Self {
            symbolic: false,
            value: Some(oid.to_hex()),
        }
    }

    pub fn symbolic(target: impl Into<String>) -> Self {
        Self {
            symbolic: true,
            value: Some(target.into()),
        }
    }

    fn unset() -> Self {
        Self {
            symbolic: false,
            value: None,
        }
    }

    /// The object id, for a resolved non-symbolic value
    pub fn oid(&self) -> Result<Option<Oid>> {
        match (&self.value, self.symbolic) {
            (Some(hex), false) => Oid::from_hex(hex)
                .map(Some)
                .map_err(|_| Error::InvalidOid(hex.clone())),
            _ => Ok(None),
        }
    }
}

/// Reject names that cannot be stored as ref files
pub fn validate_ref_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.ends_with('/')
        || name.ends_with(".lock")
        || name.contains("..")
        || name.contains("//")
        || name.chars().any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
        || name == "@";
    if invalid {
        Err(Error::InvalidRefName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Ref storage rooted at the metadata directory
pub struct RefStore {
    /// Metadata directory: HEAD and MERGE_HEAD live here, branches under refs/
    root: PathBuf,
    tmp_dir: PathBuf,
}

impl RefStore {
    pub fn new(root: PathBuf, tmp_dir: PathBuf) -> Self {
        Self { root, tmp_dir }
    }

    /// Write `value` to `name`, following symbolic refs first when `deref` is set
    pub fn update_ref(&self, name: &str, value: &RefValue, deref: bool) -> Result<()> {
        let target = self.resolve_name(name, deref)?;
        let content = match (&value.value, value.symbolic) {
            (Some(v), true) => format!("{}{}", SYMBOLIC_PREFIX, v),
            (Some(v), false) => v.clone(),
            (None, _) => return self.delete_ref(&target, false),
        };

        let path = self.ref_path(&target)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        atomic_write(&self.tmp_dir, &path, format!("{}\n", content).as_bytes())?;
        debug!(name = %target, value = %content, "updated ref");
        Ok(())
    }

    /// Read `name`, resolving symbolic chains when `deref` is set
    pub fn get_ref(&self, name: &str, deref: bool) -> Result<RefValue> {
        let target = self.resolve_name(name, deref)?;
        if deref {
            // resolve_name stopped at the first non-symbolic ref
            self.read_raw(&target).map(|raw| raw.unwrap_or_else(RefValue::unset))
        } else {
            Ok(self.read_raw(name)?.unwrap_or_else(RefValue::unset))
        }
    }

    /// Delete `name`, or the ref it finally points at when `deref` is set
    pub fn delete_ref(&self, name: &str, deref: bool) -> Result<()> {
        let target = self.resolve_name(name, deref)?;
        let path = self.ref_path(&target)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(name = %target, "deleted ref");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// All set refs whose name starts with `prefix`, sorted by name
    ///
    /// `HEAD` and `MERGE_HEAD` come first, then everything under `refs/`.
    pub fn iter_refs(&self, prefix: &str, deref: bool) -> Result<Vec<(String, RefValue)>> {
        let mut names = vec![HEAD.to_string(), MERGE_HEAD.to_string()];
        let mut nested = Vec::new();
        collect_ref_names(&self.root.join("refs"), "refs", &mut nested)?;
        nested.sort();
        names.extend(nested);

        let mut refs = Vec::new();
        for name in names {
            if !name.starts_with(prefix) {
                continue;
            }
            let value = self.get_ref(&name, deref)?;
            if value.value.is_some() {
                refs.push((name, value));
            }
        }
        Ok(refs)
    }

    /// Follow symbolic refs from `name` to the last ref in the chain
    fn resolve_name(&self, name: &str, deref: bool) -> Result<String> {
        let mut current = name.to_string();
        if !deref {
            return Ok(current);
        }
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.clone()) {
                return Err(Error::SymbolicRefLoop(name.to_string()));
            }
            match self.read_raw(&current)? {
                Some(RefValue {
                    symbolic: true,
                    value: Some(next),
                }) => current = next,
                _ => return Ok(current),
            }
        }
    }

    fn read_raw(&self, name: &str) -> Result<Option<RefValue>> {
        let path = self.ref_path(name)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            // A directory such as refs/heads is not a ref
            Err(_) if path.is_dir() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(match content.strip_prefix(SYMBOLIC_PREFIX) {
            Some(target) => RefValue::symbolic(target.trim()),
            None => RefValue {
                symbolic: false,
                value: Some(content.to_string()),
            },
        }))
    }

    fn ref_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
            return Err(Error::InvalidRefName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn collect_ref_names(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let name = format!("{}/{}", prefix, entry.file_name().to_string_lossy());
        if entry.file_type()?.is_dir() {
            collect_ref_names(&entry.path(), &name, out)?;
        } else {
            out.push(name);
        }
    }
    Ok(())
}
