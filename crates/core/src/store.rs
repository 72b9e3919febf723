//! Repository handle and on-disk layout
//!
//! Manages the `.idiota/` directory structure:
//! ```text
//! .idiota/
//!   config.toml
//!   HEAD
//!   MERGE_HEAD        (only while a merge is pending)
//!   index
//!   objects/<hh>/<rest>
//!   refs/
//!     heads/
//!     tags/
//!   state/
//!     merge.json
//!   tmp/
//! ```

use crate::config::{RepoConfig, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::hash::{is_hex_prefix, Oid};
use crate::index::Index;
use crate::object::ObjectStore;
use crate::refs::{RefStore, RefValue, HEAD, HEADS_PREFIX, MERGE_HEAD};
use crate::tree::{get_tree, write_tree_from};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Name of the metadata directory at the repository root
pub const META_DIR: &str = ".idiota";

/// Pending merge state, relative to the metadata directory
pub const MERGE_STATE_FILE: &str = "state/merge.json";

/// An opened repository: working tree root plus its metadata stores
///
/// Opened once per command and passed by reference to every operation.
pub struct Repository {
    /// Root of the working tree (canonicalized)
    root: PathBuf,
    /// Path to .idiota directory
    meta_dir: PathBuf,
    objects: ObjectStore,
    refs: RefStore,
    config: RepoConfig,
}

impl Repository {
    /// Initialize a new repository at the given root
    pub fn init(repo_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(repo_root)?;
        let root = repo_root.canonicalize()?;
        let meta_dir = root.join(META_DIR);
        if meta_dir.exists() {
            return Err(Error::AlreadyInitialized(meta_dir));
        }

        for sub in ["objects", "refs/heads", "refs/tags", "state", "tmp"] {
            std::fs::create_dir_all(meta_dir.join(sub))?;
        }
        std::fs::write(meta_dir.join(CONFIG_FILE), example_config())?;

        let repo = Self::open_at(root, meta_dir)?;
        let branch = format!("{}{}", HEADS_PREFIX, repo.config.core.default_branch);
        repo.refs.update_ref(HEAD, &RefValue::symbolic(branch), false)?;
        info!(root = %repo.root.display(), "initialized repository");
        Ok(repo)
    }

    /// Open an existing repository rooted exactly at `repo_root`
    pub fn open(repo_root: &Path) -> Result<Self> {
        let root = repo_root.canonicalize()?;
        let meta_dir = root.join(META_DIR);
        if !meta_dir.is_dir() {
            return Err(Error::NotARepository(root));
        }
        Self::open_at(root, meta_dir)
    }

    /// Find the repository containing `start` by walking up to the nearest `.idiota/`
    pub fn discover(start: &Path) -> Result<Self> {
        let start = start.canonicalize()?;
        let mut current = start.as_path();
        loop {
            if current.join(META_DIR).is_dir() {
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(Error::NotARepository(start)),
            }
        }
    }

    fn open_at(root: PathBuf, meta_dir: PathBuf) -> Result<Self> {
        let tmp_dir = meta_dir.join("tmp");
        std::fs::create_dir_all(&tmp_dir)?;
        let config = RepoConfig::load(&meta_dir)?;
        Ok(Self {
            objects: ObjectStore::new(meta_dir.join("objects"), tmp_dir.clone()),
            refs: RefStore::new(meta_dir.clone(), tmp_dir),
            config,
            root,
            meta_dir,
        })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .idiota directory path
    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn load_index(&self) -> Result<Index> {
        Index::load(&self.meta_dir)
    }

    pub fn save_index(&self, index: &Index) -> Result<()> {
        index.save(&self.meta_dir)
    }

    /// Build tree objects from the current index and return the root tree id
    pub fn write_tree(&self) -> Result<Oid> {
        let index = self.load_index()?;
        write_tree_from(&self.objects, index.entries())
    }

    /// Flatten a tree into path -> blob id
    pub fn get_tree(&self, tree: Oid) -> Result<BTreeMap<String, Oid>> {
        get_tree(&self.objects, tree, "")
    }

    /// Staged index contents
    pub fn get_index_tree(&self) -> Result<BTreeMap<String, Oid>> {
        Ok(self.load_index()?.into_entries())
    }

    /// Resolve a ref name, `@`, or (abbreviated) object id
    pub fn get_oid(&self, name: &str) -> Result<Oid> {
        let name = if name == "@" { HEAD } else { name };

        let mut candidates = vec![
            format!("refs/heads/{}", name),
            format!("refs/tags/{}", name),
            format!("refs/{}", name),
        ];
        // Other files in the metadata directory (index, config) are not refs
        if name == HEAD || name == MERGE_HEAD || name.starts_with("refs/") {
            candidates.push(name.to_string());
        }
        for candidate in &candidates {
            let value = match self.refs.get_ref(candidate, true) {
                Ok(value) => value,
                Err(Error::InvalidRefName(_)) => continue,
                Err(e) => return Err(e),
            };
            if let Some(oid) = value.oid()? {
                debug!(name, candidate = %candidate, %oid, "resolved ref");
                return Ok(oid);
            }
        }

        if is_hex_prefix(name) {
            let mut matches = self.objects.resolve_prefix(name)?;
            match matches.len() {
                0 => {}
                1 => return Ok(matches.remove(0)),
                _ => {
                    return Err(Error::AmbiguousReference {
                        name: name.to_string(),
                        candidates: matches,
                    })
                }
            }
        }

        Err(Error::UnknownReference(name.to_string()))
    }

    /// Convert a user-supplied path (relative to `cwd`, or absolute) into a
    /// repo-relative, forward-slash path
    pub fn relative_path(&self, cwd: &Path, path: &Path) -> Result<String> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        // Resolve symlinked prefixes (e.g. /tmp) the same way the root was
        let absolute = match absolute.canonicalize() {
            Ok(p) => p,
            Err(_) => lexical_normalize(&absolute),
        };
        let relative = absolute.strip_prefix(&self.root).map_err(|_| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "outside repository",
        })?;
        let normalized = normalize_path(relative)?;
        if normalized == META_DIR || normalized.starts_with(&format!("{}/", META_DIR)) {
            return Err(Error::InvalidPath {
                path: path.to_path_buf(),
                reason: "inside the metadata directory",
            });
        }
        Ok(normalized)
    }
}

/// Commented default configuration written by `init`
pub fn example_config() -> String {
    let defaults = RepoConfig::default();
    format!(
        "# idiota repository configuration\n\
         # Values here override the user config file.\n\
         \n\
         # [core]\n\
         # default_branch = \"{}\"\n\
         \n\
         # [diff]\n\
         # context_lines = {}\n\
         \n\
         # [ignore]\n\
         # use_gitignore = {}\n\
         # use_idiotaignore = {}\n\
         # additional_patterns = []\n",
        defaults.core.default_branch,
        defaults.diff.context_lines,
        defaults.ignore.use_gitignore,
        defaults.ignore.use_idiotaignore,
    )
}

/// Atomic write helper
///
/// Writes data to a temporary file in `tmp_dir`, fsyncs it, then renames it
/// over `target`.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    std::fs::create_dir_all(tmp_dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(tmp_dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Normalize a relative path for storage
///
/// - Converts to `/` separators
/// - Rejects `..` and absolute paths
/// - Removes `./` components
pub fn normalize_path(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "contains '..'",
                })
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "absolute path",
                })
            }
        }
    }
    Ok(parts.join("/"))
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Calculate directory size recursively
pub fn calculate_dir_size(dir: &Path) -> Result<u64> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut total = 0u64;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            total += entry.metadata()?.len();
        } else if path.is_dir() {
            total += calculate_dir_size(&path)?;
        }
    }
    Ok(total)
}
