//! Ignore pattern management for idiota
//!
//! Supports multiple sources of ignore patterns:
//! 1. Built-in patterns (.idiota/, .git/ - always active)
//! 2. .idiotaignore patterns (optional, enabled by default)
//! 3. .gitignore patterns (optional, enabled by default)
//! 4. Config-based patterns (`[ignore] additional_patterns`)

use idiota_core::{Error, IgnoreConfig, Repository, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Directories that are never part of the working tree
const BUILTIN_DIRS: &[&str] = &[idiota_core::store::META_DIR, ".git"];

/// Ignore rule manager
///
/// Combines multiple sources of ignore patterns with proper precedence:
/// 1. Built-in patterns (highest priority - always enforced)
/// 2. .idiotaignore patterns (override .gitignore, including `!` whitelists)
/// 3. .gitignore patterns
/// 4. Additional config patterns
pub struct IgnoreRules {
    /// Repository root directory
    repo_root: PathBuf,

    /// Gitignore patterns (optional)
    gitignore: Option<Gitignore>,

    /// idiota-specific ignore patterns (optional)
    idiotaignore: Option<Gitignore>,

    /// Patterns from config
    additional: Option<Gitignore>,

    config: IgnoreConfig,
}

impl IgnoreRules {
    /// Load ignore rules for repository
    pub fn load(repo_root: &Path, config: IgnoreConfig) -> Result<Self> {
        let mut rules = Self {
            repo_root: repo_root.to_path_buf(),
            gitignore: None,
            idiotaignore: None,
            additional: None,
            config,
        };

        rules.reload_ignore_files()?;
        Ok(rules)
    }

    /// Rules for an opened repository, using its `[ignore]` config
    pub fn for_repo(repo: &Repository) -> Result<Self> {
        Self::load(repo.root(), repo.config().ignore.clone())
    }

    /// Reload ignore files from disk
    fn reload_ignore_files(&mut self) -> Result<()> {
        self.gitignore = if self.config.use_gitignore {
            self.build_from_file(".gitignore")?
        } else {
            None
        };

        self.idiotaignore = if self.config.use_idiotaignore {
            self.build_from_file(".idiotaignore")?
        } else {
            None
        };

        self.additional = if self.config.additional_patterns.is_empty() {
            None
        } else {
            let mut builder = GitignoreBuilder::new(&self.repo_root);
            for pattern in &self.config.additional_patterns {
                builder
                    .add_line(None, pattern)
                    .map_err(|e| Error::IgnorePattern(format!("{}: {}", pattern, e)))?;
            }
            Some(build(builder)?)
        };

        Ok(())
    }

    fn build_from_file(&self, name: &str) -> Result<Option<Gitignore>> {
        let path = self.repo_root.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let mut builder = GitignoreBuilder::new(&self.repo_root);
        // Bad lines are skipped; the rest of the file still applies
        if let Some(err) = builder.add(&path) {
            warn!(file = %path.display(), error = %err, "skipping invalid ignore patterns");
        }
        build(builder).map(Some)
    }

    /// Check if a repo-relative path should be ignored
    pub fn should_ignore(&self, path: &Path) -> bool {
        // 1. Built-in patterns (highest priority - always enforced)
        if is_builtin_ignored(path) {
            return true;
        }

        let is_dir = self.repo_root.join(path).is_dir();

        // 2. .idiotaignore (overrides .gitignore)
        if let Some(ref idiotaignore) = self.idiotaignore {
            match idiotaignore.matched_path_or_any_parents(path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }

        // 3. .gitignore
        if let Some(ref gitignore) = self.gitignore {
            if gitignore.matched_path_or_any_parents(path, is_dir).is_ignore() {
                return true;
            }
        }

        // 4. Additional config patterns
        if let Some(ref additional) = self.additional {
            if additional.matched_path_or_any_parents(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }
}

/// True when any component of `path` is a built-in ignored directory
pub fn is_builtin_ignored(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .map_or(false, |name| BUILTIN_DIRS.contains(&name)),
        _ => false,
    })
}

fn build(builder: GitignoreBuilder) -> Result<Gitignore> {
    builder
        .build()
        .map_err(|e| Error::IgnorePattern(e.to_string()))
}
