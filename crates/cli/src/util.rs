//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use history::Commit;
use idiota_core::refs::HEAD;
use idiota_core::{Oid, Repository};
use owo_colors::{OwoColorize, Stream};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use worktree::IgnoreRules;

/// Open the repository containing the current directory
pub fn open_repo() -> Result<Repository> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Repository::discover(&cwd).context("Failed to find repository")
}

/// Ignore rules for the repository's working tree
pub fn load_rules(repo: &Repository) -> Result<IgnoreRules> {
    IgnoreRules::for_repo(repo).context("Failed to load ignore rules")
}

/// Resolve a name to an object id, with the name in the error
pub fn resolve(repo: &Repository, name: &str) -> Result<Oid> {
    repo.get_oid(name)
        .with_context(|| format!("Cannot resolve '{}'", name))
}

/// Flattened tree of a commit
pub fn commit_tree(repo: &Repository, oid: Oid) -> Result<BTreeMap<String, Oid>> {
    let commit = history::get_commit(repo, oid)?;
    Ok(repo.get_tree(commit.tree)?)
}

/// Flattened tree of HEAD; empty before the first commit
pub fn head_tree(repo: &Repository) -> Result<BTreeMap<String, Oid>> {
    match repo.refs().get_ref(HEAD, true)?.oid()? {
        Some(head) => commit_tree(repo, head),
        None => Ok(BTreeMap::new()),
    }
}

/// Map from object id to every ref name pointing at it
pub fn ref_names_by_oid(repo: &Repository) -> Result<HashMap<Oid, Vec<String>>> {
    let mut map: HashMap<Oid, Vec<String>> = HashMap::new();
    for (name, value) in repo.refs().iter_refs("", true)? {
        if let Some(oid) = value.oid()? {
            map.entry(oid).or_default().push(name);
        }
    }
    Ok(map)
}

/// Print a commit header and its indented message
pub fn print_commit(oid: Oid, commit: &Commit, refs: &HashMap<Oid, Vec<String>>) {
    let names = refs
        .get(&oid)
        .map(|names| format!(" ({})", names.join(", ")))
        .unwrap_or_default();
    println!("commit {}{}", yellow(oid), cyan(names));
    if commit.parents.len() > 1 {
        let parents: Vec<String> = commit.parents.iter().map(|p| p.short()).collect();
        println!("Merge: {}", parents.join(" "));
    }
    println!();
    for line in commit.message.lines() {
        println!("    {}", line);
    }
    println!();
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// Colors only when stdout is a terminal

pub fn yellow(value: impl Display) -> String {
    value.if_supports_color(Stream::Stdout, |v| v.yellow()).to_string()
}

pub fn green(value: impl Display) -> String {
    value.if_supports_color(Stream::Stdout, |v| v.green()).to_string()
}

pub fn red(value: impl Display) -> String {
    value.if_supports_color(Stream::Stdout, |v| v.red()).to_string()
}

pub fn cyan(value: impl Display) -> String {
    value.if_supports_color(Stream::Stdout, |v| v.cyan()).to_string()
}

pub fn bold(value: impl Display) -> String {
    value.if_supports_color(Stream::Stdout, |v| v.bold()).to_string()
}

pub fn dimmed(value: impl Display) -> String {
    value.if_supports_color(Stream::Stdout, |v| v.dimmed()).to_string()
}
