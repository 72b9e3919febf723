//! Print the ref and commit graph as Graphviz DOT

use crate::util;
use anyhow::Result;
use history::{get_commit, graph::is_commit, iter_commits_and_parents};

pub fn run() -> Result<()> {
    let repo = util::open_repo()?;

    let mut dot = String::from("digraph commits {\n");
    let mut starts = Vec::new();

    for (name, value) in repo.refs().iter_refs("", false)? {
        dot.push_str(&format!("\"{}\" [shape=note]\n", name));
        if value.symbolic {
            if let Some(target) = &value.value {
                dot.push_str(&format!("\"{}\" -> \"{}\"\n", name, target));
            }
            continue;
        }
        if let Some(oid) = value.oid()? {
            dot.push_str(&format!("\"{}\" -> \"{}\"\n", name, oid));
            if is_commit(&repo, oid)? {
                starts.push(oid);
            }
        }
    }

    for oid in iter_commits_and_parents(&repo, starts) {
        let oid = oid?;
        let commit = get_commit(&repo, oid)?;
        dot.push_str(&format!(
            "\"{}\" [shape=box style=filled label=\"{}\"]\n",
            oid,
            oid.short()
        ));
        for parent in &commit.parents {
            dot.push_str(&format!("\"{}\" -> \"{}\"\n", oid, parent));
        }
    }

    dot.push('}');
    println!("{}", dot);
    Ok(())
}
