//! Committing, history and diffs

use crate::common::TestRepo;
use anyhow::Result;

#[test]
fn test_log_lists_newest_first() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "one\n")?;
    let h1 = repo.commit_all("H1")?;
    repo.write("file.txt", "two\n")?;
    let h2 = repo.commit_all("H2")?;

    let log = idiota!(repo.path(), "log").assert_success()?;
    assert_eq!(log.parse_oids(), vec![h2.clone(), h1.clone()]);

    let first = log.stdout.find("    H2").expect("H2 in log");
    let second = log.stdout.find("    H1").expect("H1 in log");
    assert!(first < second);
    assert!(log.contains_stdout(&format!("commit {} (HEAD, refs/heads/main)", h2)));

    // Starting from the older commit shows only that one
    let older = idiota!(repo.path(), "log", &h1).assert_success()?;
    assert_eq!(older.parse_oids(), vec![h1]);
    Ok(())
}

#[test]
fn test_diff_shows_working_tree_changes() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "hello\n")?;
    repo.commit_all("first")?;

    let clean = idiota!(repo.path(), "diff").assert_success()?;
    assert!(clean.stdout.is_empty());

    repo.write("file.txt", "hello world\n")?;
    let diff = idiota!(repo.path(), "diff").assert_success()?;
    assert!(diff.contains_stdout("--- a/file.txt"));
    assert!(diff.contains_stdout("+++ b/file.txt"));
    assert!(diff.contains_stdout("-hello\n"));
    assert!(diff.contains_stdout("+hello world\n"));

    // Nothing staged yet
    let cached = idiota!(repo.path(), "diff", "--cached").assert_success()?;
    assert!(cached.stdout.is_empty());

    idiota!(repo.path(), "add", "file.txt").assert_success()?;
    let cached = idiota!(repo.path(), "diff", "--cached").assert_success()?;
    assert!(cached.contains_stdout("+hello world\n"));
    Ok(())
}

#[test]
fn test_diff_against_named_commit() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("file.txt", "first\n")?;
    let h1 = repo.commit_all("H1")?;
    repo.write("file.txt", "second\n")?;
    repo.commit_all("H2")?;
    repo.write("file.txt", "third\n")?;

    // Commit against the working tree
    let diff = idiota!(repo.path(), "diff", &h1).assert_success()?;
    assert!(diff.contains_stdout("--- a/file.txt"));
    assert!(diff.contains_stdout("-first\n"));
    assert!(diff.contains_stdout("+third\n"));
    assert!(!diff.contains_stdout("second"));

    // Commit against the index, which still holds H2's content
    let cached = idiota!(repo.path(), "diff", "--cached", &h1).assert_success()?;
    assert!(cached.contains_stdout("-first\n"));
    assert!(cached.contains_stdout("+second\n"));
    assert!(!cached.contains_stdout("third"));

    let unknown = idiota!(repo.path(), "diff", "no-such-commit").assert_failure()?;
    assert!(unknown.contains_stderr("Cannot resolve 'no-such-commit'"));
    Ok(())
}

#[test]
fn test_status_reports_staged_and_unstaged() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("a.txt", "a\n")?;
    repo.write("b.txt", "b\n")?;
    repo.commit_all("first")?;

    repo.write("a.txt", "changed\n")?;
    repo.write("c.txt", "new\n")?;
    idiota!(repo.path(), "add", "c.txt").assert_success()?;

    let status = idiota!(repo.path(), "status").assert_success()?;
    assert!(status.contains_stdout("On branch main"));
    assert!(status.contains_stdout("Changes to be committed:"));
    assert!(status.contains_stdout("    new file: c.txt"));
    assert!(status.contains_stdout("Changes not staged for commit:"));
    assert!(status.contains_stdout("    modified: a.txt"));
    assert!(!status.contains_stdout("b.txt"));
    Ok(())
}

#[test]
fn test_show_root_commit_lists_new_files() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("src/lib.rs", "fn main() {}\n")?;
    let oid = repo.commit_all("add lib")?;

    let show = idiota!(repo.path(), "show").assert_success()?;
    assert!(show.contains_stdout(&format!("commit {}", oid)));
    assert!(show.contains_stdout("    add lib"));
    assert!(show.contains_stdout("--- /dev/null"));
    assert!(show.contains_stdout("+fn main() {}"));
    Ok(())
}

#[test]
fn test_cat_file_prints_blob() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("note.txt", "raw bytes\n")?;

    let hashed = idiota!(repo.path(), "hash-object", "note.txt").assert_success()?;
    let oid = hashed.parse_oid().expect("blob id");

    let cat = idiota!(repo.path(), "cat-file", &oid[..8]).assert_success()?;
    assert_eq!(cat.stdout, "raw bytes\n");
    Ok(())
}

#[test]
fn test_gc_removes_unreachable_blob() -> Result<()> {
    let repo = TestRepo::init()?;
    repo.write("kept.txt", "kept\n")?;
    repo.commit_all("first")?;
    repo.write("stray.txt", "stray\n")?;
    let stray = idiota!(repo.path(), "hash-object", "stray.txt")
        .assert_success()?
        .parse_oid()
        .expect("blob id");

    let gc = idiota!(repo.path(), "gc").assert_success()?;
    assert!(gc.contains_stdout("Objects removed: 1"));

    idiota!(repo.path(), "cat-file", &stray).assert_failure()?;
    let again = idiota!(repo.path(), "gc").assert_success()?;
    assert!(again.contains_stdout("No garbage found"));
    Ok(())
}
