//! CLI command execution helpers
//!
//! Wraps the `idiota` binary built by cargo for this test run, isolated from
//! any user config on the machine.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// CLI command builder
pub struct IdiotaCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl IdiotaCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let mut env = HashMap::new();
        // Never pick up the real user config
        env.insert(
            "IDIOTA_CONFIG".to_string(),
            working_dir.join(".no-user-config.toml").display().to_string(),
        );
        env.insert("NO_COLOR".to_string(), "1".to_string());
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_idiota")),
            working_dir,
            args: Vec::new(),
            env,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Execute command and capture its output
    pub fn execute(&self) -> Result<CommandResult> {
        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .env_remove("IDIOTA_LOG")
            .output()
            .context("Failed to execute command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// First full object id in stdout
    pub fn parse_oid(&self) -> Option<String> {
        self.parse_oids().into_iter().next()
    }

    /// Every full object id in stdout, in order
    pub fn parse_oids(&self) -> Vec<String> {
        self.stdout.lines().filter_map(extract_oid).collect()
    }
}

/// Extract a 40 character hex id from a line of text
pub fn extract_oid(line: &str) -> Option<String> {
    line.split(|c: char| !c.is_ascii_hexdigit())
        .find(|word| word.len() == 40)
        .map(|word| word.to_string())
}

/// A freshly initialized repository in a temporary directory
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn init() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        IdiotaCommand::new(dir.path()).args(&["init"]).assert_success()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) -> Result<()> {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, content)?;
        Ok(())
    }

    pub fn read(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.dir.path().join(path))?)
    }

    /// Stage everything and commit, returning the new commit id
    pub fn commit_all(&self, message: &str) -> Result<String> {
        IdiotaCommand::new(self.path()).args(&["add", "."]).assert_success()?;
        let result = IdiotaCommand::new(self.path())
            .args(&["commit", "-m", message])
            .assert_success()?;
        result
            .parse_oid()
            .with_context(|| format!("commit printed no id: {}", result.stdout))
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// idiota!(dir, "init").assert_success()?;
/// idiota!(dir, "commit", "-m", "first").assert_success()?;
/// ```
#[macro_export]
macro_rules! idiota {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::IdiotaCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_extraction() {
        let line = "commit 3b18e512dba79e4c8300dd08aeb37f8e728b8dad (refs/heads/main)";
        assert_eq!(
            extract_oid(line),
            Some("3b18e512dba79e4c8300dd08aeb37f8e728b8dad".to_string())
        );
        assert_eq!(extract_oid("Branch dev created at 3b18e512db"), None);
    }
}
