//! Repository configuration
//!
//! Two layers, merged key by key:
//! - user config: `$IDIOTA_CONFIG`, or `<config dir>/idiota/config.toml`
//! - repository config: `.idiota/config.toml` (wins)

use crate::error::{Error, Result};
use crate::refs::validate_ref_name;
use crate::store::atomic_write;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the config inside the metadata directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the user config location
pub const CONFIG_ENV: &str = "IDIOTA_CONFIG";

/// Every key understood by `get`/`set`
pub const KEYS: &[&str] = &[
    "core.default_branch",
    "diff.context_lines",
    "ignore.use_gitignore",
    "ignore.use_idiotaignore",
    "ignore.additional_patterns",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RepoConfig {
    pub core: CoreConfig,
    pub diff: DiffConfig,
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Branch HEAD points at after `init`
    pub default_branch: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Lines of context around each hunk
    pub context_lines: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { context_lines: 3 }
    }
}

/// Ignore configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Use .gitignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_gitignore: bool,

    /// Use .idiotaignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_idiotaignore: bool,

    /// Additional patterns from config
    #[serde(default)]
    pub additional_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_idiotaignore: true,
            additional_patterns: vec![],
        }
    }
}

fn default_true() -> bool {
    true
}

impl RepoConfig {
    /// Load the merged user + repository configuration
    pub fn load(meta_dir: &Path) -> Result<Self> {
        let mut merged = toml::Table::new();
        if let Some(user_path) = user_config_path() {
            if let Some(table) = read_table(&user_path)? {
                merge_tables(&mut merged, table);
            }
        }
        if let Some(table) = read_table(&meta_dir.join(CONFIG_FILE))? {
            merge_tables(&mut merged, table);
        }

        let config: RepoConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set `key` in the repository config file, leaving its other keys alone
    ///
    /// The value is validated against the merged configuration first.
    pub fn set_repo_value(meta_dir: &Path, key: &str, value: &str) -> Result<Self> {
        let mut merged = Self::load(meta_dir)?;
        merged.set(key, value)?;

        let (section, name) = key.split_once('.').ok_or_else(|| unknown_key(key))?;
        let rendered = toml::Value::try_from(&merged).map_err(|e| Error::Config(e.to_string()))?;
        let new_value = rendered
            .get(section)
            .and_then(|t| t.get(name))
            .cloned()
            .ok_or_else(|| unknown_key(key))?;

        let path = meta_dir.join(CONFIG_FILE);
        let mut table = read_table(&path)?.unwrap_or_default();
        let section_table = table
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        match section_table {
            toml::Value::Table(t) => {
                t.insert(name.to_string(), new_value);
            }
            other => {
                let mut t = toml::Table::new();
                t.insert(name.to_string(), new_value);
                *other = toml::Value::Table(t);
            }
        }

        let content = toml::to_string_pretty(&table).map_err(|e| Error::Config(e.to_string()))?;
        atomic_write(&meta_dir.join("tmp"), &path, content.as_bytes())?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<()> {
        validate_ref_name(&self.core.default_branch).map_err(|_| {
            Error::Config(format!(
                "core.default_branch '{}' is not a valid branch name",
                self.core.default_branch
            ))
        })?;
        if self.diff.context_lines > 100 {
            return Err(Error::Config(format!(
                "diff.context_lines must be 0-100, got {}",
                self.diff.context_lines
            )));
        }
        Ok(())
    }

    /// Get a single value rendered as a string
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "core.default_branch" => self.core.default_branch.clone(),
            "diff.context_lines" => self.diff.context_lines.to_string(),
            "ignore.use_gitignore" => self.ignore.use_gitignore.to_string(),
            "ignore.use_idiotaignore" => self.ignore.use_idiotaignore.to_string(),
            "ignore.additional_patterns" => self.ignore.additional_patterns.join(","),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a single value parsed from a string, then validate
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "core.default_branch" => self.core.default_branch = value.to_string(),
            "diff.context_lines" => {
                self.diff.context_lines = value.parse().map_err(|_| {
                    Error::Config("diff.context_lines must be a non-negative integer".into())
                })?;
            }
            "ignore.use_gitignore" => self.ignore.use_gitignore = parse_bool(key, value)?,
            "ignore.use_idiotaignore" => self.ignore.use_idiotaignore = parse_bool(key, value)?,
            "ignore.additional_patterns" => {
                self.ignore.additional_patterns = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => return Err(unknown_key(key)),
        }
        self.validate()
    }
}

/// Location of the user-level config file, if one can be determined
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("idiota").join(CONFIG_FILE))
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let table = content
        .parse::<toml::Table>()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(table))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} must be 'true' or 'false'", key)))
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "unknown config key '{}' (known keys: {})",
        key,
        KEYS.join(", ")
    ))
}
