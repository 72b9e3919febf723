//! Failures and their exit codes

use crate::common::{IdiotaCommand, TestRepo};
use anyhow::Result;

#[test]
fn test_unknown_ref_exits_nonzero() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "1\n")?;
    repo.commit_all("first")?;

    let result = idiota!(repo.path(), "log", "no-such-branch").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("error: Cannot resolve 'no-such-branch'"));
    assert!(result.contains_stderr("unknown"));
    Ok(())
}

#[test]
fn test_commands_outside_repository_fail() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let result = IdiotaCommand::new(dir.path()).args(&["status"]).assert_failure()?;
    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("Failed to find repository"));
    Ok(())
}

#[test]
fn test_init_twice_fails() -> Result<()> {
    let repo = TestRepo::init()?;
    let result = idiota!(repo.path(), "init").assert_failure()?;
    assert_eq!(result.exit_code, 1);
    Ok(())
}

#[test]
fn test_config_rejects_invalid_values() -> Result<()> {
    let repo = TestRepo::init()?;
    idiota!(repo.path(), "config", "set", "diff.context_lines", "500").assert_failure()?;
    idiota!(repo.path(), "config", "set", "no.such_key", "1").assert_failure()?;

    idiota!(repo.path(), "config", "set", "diff.context_lines", "1").assert_success()?;
    let value = idiota!(repo.path(), "config", "get", "diff.context_lines").assert_success()?;
    assert_eq!(value.stdout, "1\n");

    let list = idiota!(repo.path(), "config", "--list").assert_success()?;
    assert!(list.contains_stdout("core.default_branch=main"));
    Ok(())
}

#[test]
fn test_add_missing_path_fails() -> Result<()> {
    let repo = TestRepo::init()?;
    let result = idiota!(repo.path(), "add", "missing.txt").assert_failure()?;
    assert!(result.contains_stderr("did not match any files"));
    Ok(())
}
