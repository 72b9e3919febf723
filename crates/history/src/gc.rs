//! Mark-and-sweep collection of unreachable loose objects

use crate::graph::{collect_tree_objects, iter_objects_in_commits};
use idiota_core::{ObjectKind, Oid, Repository, Result};
use std::collections::HashSet;
use tracing::{info, warn};

/// Outcome of a collection run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GcReport {
    /// Objects still reachable
    pub kept: usize,
    pub removed: usize,
    /// Objects that could not be deleted
    pub failed: usize,
    /// Compressed size of the removed objects
    pub bytes_freed: u64,
}

/// Every object reachable from a ref or the index
pub fn reachable_objects(repo: &Repository) -> Result<HashSet<Oid>> {
    let mut commits = Vec::new();
    let mut visited = HashSet::new();
    let mut objects = Vec::new();

    for (_, value) in repo.refs().iter_refs("", true)? {
        let Some(oid) = value.oid()? else { continue };
        match repo.objects().object_kind(oid)? {
            ObjectKind::Commit => commits.push(oid),
            ObjectKind::Tree => collect_tree_objects(repo, oid, &mut visited, &mut objects)?,
            ObjectKind::Blob => {
                visited.insert(oid);
            }
        }
    }

    visited.extend(iter_objects_in_commits(repo, commits)?);
    visited.extend(repo.load_index()?.iter().map(|(_, oid)| *oid));
    Ok(visited)
}

/// Delete every loose object not reachable from a ref or the index
pub fn gc(repo: &Repository) -> Result<GcReport> {
    let reachable = reachable_objects(repo)?;
    let mut report = GcReport::default();

    for oid in repo.objects().iter_oids()? {
        if reachable.contains(&oid) {
            report.kept += 1;
            continue;
        }
        match repo.objects().remove(oid) {
            Ok(bytes) => {
                report.removed += 1;
                report.bytes_freed += bytes;
            }
            Err(e) => {
                warn!(%oid, error = %e, "failed to remove unreachable object");
                report.failed += 1;
            }
        }
    }

    info!(
        kept = report.kept,
        removed = report.removed,
        bytes_freed = report.bytes_freed,
        "garbage collection complete"
    );
    Ok(report)
}
