//! Branches, tags, checkout and reset

use crate::common::TestRepo;
use anyhow::Result;

#[test]
fn test_branch_checkout_switches_files() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "main\n")?;
    let base = repo.commit_all("base")?;

    let created = idiota!(repo.path(), "branch", "dev").assert_success()?;
    assert!(created.contains_stdout(&format!("Branch dev created at {}", &base[..10])));

    let switched = idiota!(repo.path(), "checkout", "dev").assert_success()?;
    assert!(switched.contains_stdout("Switched to branch dev"));

    repo.write("file.txt", "dev\n")?;
    repo.write("extra.txt", "extra\n")?;
    repo.commit_all("on dev")?;

    idiota!(repo.path(), "checkout", "main").assert_success()?;
    assert_eq!(repo.read("file.txt")?, "main\n");
    assert!(!repo.path().join("extra.txt").exists());

    let branches = idiota!(repo.path(), "branch").assert_success()?;
    assert_eq!(branches.stdout, "  dev\n* main\n");
    Ok(())
}

#[test]
fn test_checkout_commit_detaches_head() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "1\n")?;
    let first = repo.commit_all("first")?;
    repo.write("file.txt", "2\n")?;
    repo.commit_all("second")?;

    let out = idiota!(repo.path(), "checkout", &first).assert_success()?;
    assert!(out.contains_stdout(&format!("HEAD is now at {}", &first[..10])));
    assert_eq!(repo.read("file.txt")?, "1\n");

    let status = idiota!(repo.path(), "status").assert_success()?;
    assert!(status.contains_stdout(&format!("HEAD detached at {}", &first[..10])));
    Ok(())
}

#[test]
fn test_tags_resolve_and_list() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "1\n")?;
    let first = repo.commit_all("first")?;

    idiota!(repo.path(), "tag", "v1").assert_success()?;
    let tags = idiota!(repo.path(), "tag").assert_success()?;
    assert_eq!(tags.stdout, "v1\n");

    repo.write("file.txt", "2\n")?;
    repo.commit_all("second")?;
    let log = idiota!(repo.path(), "log", "v1").assert_success()?;
    assert_eq!(log.parse_oids(), vec![first]);
    Ok(())
}

#[test]
fn test_reset_moves_branch() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "1\n")?;
    let first = repo.commit_all("first")?;
    repo.write("file.txt", "2\n")?;
    repo.commit_all("second")?;

    idiota!(repo.path(), "reset", &first).assert_success()?;
    let log = idiota!(repo.path(), "log").assert_success()?;
    assert_eq!(log.parse_oids(), vec![first]);
    Ok(())
}

#[test]
fn test_delete_branch() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "1\n")?;
    repo.commit_all("first")?;
    idiota!(repo.path(), "branch", "old").assert_success()?;

    let refused = idiota!(repo.path(), "branch", "-d", "main").assert_failure()?;
    assert!(refused.contains_stderr("HEAD points at it"));

    idiota!(repo.path(), "branch", "-d", "old").assert_success()?;
    let branches = idiota!(repo.path(), "branch").assert_success()?;
    assert_eq!(branches.stdout, "* main\n");
    Ok(())
}
