//! Merge base, fast-forward and conflicting merges

use crate::common::TestRepo;
use anyhow::Result;

/// Base commit on main plus one commit each on `main` and `other`
fn diverged(repo: &TestRepo, ours: &str, theirs: &str) -> Result<String> {
    repo.write("file.txt", "base\n")?;
    repo.write("shared.txt", "shared\n")?;
    let base = repo.commit_all("base")?;
    idiota!(repo.path(), "branch", "other").assert_success()?;

    repo.write("file.txt", ours)?;
    repo.commit_all("ours")?;

    idiota!(repo.path(), "checkout", "other").assert_success()?;
    repo.write("file.txt", theirs)?;
    repo.commit_all("theirs")?;
    idiota!(repo.path(), "checkout", "main").assert_success()?;
    Ok(base)
}

#[test]
fn test_merge_base_after_divergence() -> Result<()> {
    let repo = TestRepo::init()?;
    let base = diverged(&repo, "ours\n", "theirs\n")?;

    let out = idiota!(repo.path(), "merge-base", "main", "other").assert_success()?;
    assert_eq!(out.stdout.trim(), base);
    Ok(())
}

#[test]
fn test_fast_forward_merge() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "one\n")?;
    repo.commit_all("one")?;
    idiota!(repo.path(), "branch", "feature").assert_success()?;
    idiota!(repo.path(), "checkout", "feature").assert_success()?;
    repo.write("file.txt", "two\n")?;
    let tip = repo.commit_all("two")?;
    idiota!(repo.path(), "checkout", "main").assert_success()?;

    let merged = idiota!(repo.path(), "merge", "feature").assert_success()?;
    assert!(merged.contains_stdout("Fast-forward"));
    assert_eq!(repo.read("file.txt")?, "two\n");

    let log = idiota!(repo.path(), "log").assert_success()?;
    assert_eq!(log.parse_oid(), Some(tip));

    let again = idiota!(repo.path(), "merge", "feature").assert_success()?;
    assert!(again.contains_stdout("Already up to date."));
    Ok(())
}

#[test]
fn test_conflicting_merge_then_commit() -> Result<()> {
    let repo = TestRepo::init()?;
    diverged(&repo, "ours\n", "theirs\n")?;

    let merged = idiota!(repo.path(), "merge", "other").assert_success()?;
    assert!(merged.contains_stdout("CONFLICT (content): Merge conflict in file.txt"));
    assert!(merged.contains_stdout("Automatic merge failed"));

    let content = repo.read("file.txt")?;
    assert!(content.starts_with("<<<<<<< HEAD\nours\n"));
    assert!(content.contains("=======\ntheirs\n>>>>>>> other\n"));
    assert_eq!(repo.read("shared.txt")?, "shared\n");

    let status = idiota!(repo.path(), "status").assert_success()?;
    assert!(status.contains_stdout("Merging with"));
    assert!(status.contains_stdout("Unmerged paths:"));

    // A second merge waits for the first to be committed
    idiota!(repo.path(), "merge", "other").assert_failure()?;

    repo.write("file.txt", "resolved\n")?;
    let merge_commit = repo.commit_all("merge other")?;

    let show = idiota!(repo.path(), "show").assert_success()?;
    assert!(show.contains_stdout(&format!("commit {}", merge_commit)));
    assert!(show.contains_stdout("Merge: "));

    let status = idiota!(repo.path(), "status").assert_success()?;
    assert!(!status.contains_stdout("Merging with"));
    Ok(())
}

#[test]
fn test_clean_merge_takes_both_sides() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("a.txt", "a\n")?;
    repo.write("b.txt", "b\n")?;
    repo.commit_all("base")?;
    idiota!(repo.path(), "branch", "other").assert_success()?;

    repo.write("a.txt", "a2\n")?;
    repo.commit_all("change a")?;
    idiota!(repo.path(), "checkout", "other").assert_success()?;
    repo.write("b.txt", "b2\n")?;
    repo.commit_all("change b")?;
    idiota!(repo.path(), "checkout", "main").assert_success()?;

    let merged = idiota!(repo.path(), "merge", "other").assert_success()?;
    assert!(!merged.contains_stdout("CONFLICT"));
    assert_eq!(repo.read("a.txt")?, "a2\n");
    assert_eq!(repo.read("b.txt")?, "b2\n");

    repo.commit_all("merge")?;
    let log = idiota!(repo.path(), "log").assert_success()?;
    assert_eq!(log.parse_oids().len(), 4);
    Ok(())
}
