//! Diff3-style conflict markers
//!
//! ```text
//! <<<<<<< HEAD
//! our content
//! ||||||| BASE
//! common ancestor content
//! =======
//! their content
//! >>>>>>> feature
//! ```

use idiota_core::Result;
use std::io::ErrorKind;
use std::path::Path;

pub const CONFLICT_MARKER_START: &str = "<<<<<<<";
pub const CONFLICT_MARKER_BASE: &str = "|||||||";
pub const CONFLICT_MARKER_SEPARATOR: &str = "=======";
pub const CONFLICT_MARKER_END: &str = ">>>>>>>";

/// Build the content of a conflicted file
///
/// A missing side (deleted, or absent from the base) renders as an empty
/// section.
pub fn conflict_markers(
    base: Option<&[u8]>,
    ours: Option<&[u8]>,
    theirs: Option<&[u8]>,
    ours_label: &str,
    theirs_label: &str,
) -> Vec<u8> {
    let mut output = Vec::new();

    output.extend_from_slice(format!("{} {}\n", CONFLICT_MARKER_START, ours_label).as_bytes());
    push_section(&mut output, ours);
    output.extend_from_slice(format!("{} BASE\n", CONFLICT_MARKER_BASE).as_bytes());
    push_section(&mut output, base);
    output.extend_from_slice(format!("{}\n", CONFLICT_MARKER_SEPARATOR).as_bytes());
    push_section(&mut output, theirs);
    output.extend_from_slice(format!("{} {}\n", CONFLICT_MARKER_END, theirs_label).as_bytes());

    output
}

fn push_section(output: &mut Vec<u8>, content: Option<&[u8]>) {
    let content = content.unwrap_or_default();
    output.extend_from_slice(content);
    if !content.is_empty() && !content.ends_with(b"\n") {
        output.push(b'\n');
    }
}

/// True when the content holds both a start and an end marker line
pub fn content_has_conflict_markers(content: &str) -> bool {
    let mut lines = content.lines();
    lines.any(|l| l.starts_with(CONFLICT_MARKER_START))
        && lines.any(|l| l.starts_with(CONFLICT_MARKER_END))
}

/// Check if a file contains conflict markers; missing files have none
pub fn has_conflict_markers(file_path: &Path) -> Result<bool> {
    let bytes = match std::fs::read(file_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    Ok(content_has_conflict_markers(&String::from_utf8_lossy(&bytes)))
}

/// Number of conflict regions (start markers) in `content`
pub fn count_conflicts(content: &str) -> usize {
    content
        .lines()
        .filter(|l| l.starts_with(CONFLICT_MARKER_START))
        .count()
}
