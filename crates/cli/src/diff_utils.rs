//! Coloring for unified diff output

use crate::util::{bold, cyan, green, red};

/// Color a unified diff line by line
///
/// File headers are bold, hunk headers cyan, additions green and deletions
/// red. Colors are dropped when stdout is not a terminal.
pub fn colorize_diff(diff: &str) -> String {
    let mut output = String::with_capacity(diff.len());
    for line in diff.split_inclusive('\n') {
        let (text, newline) = match line.strip_suffix('\n') {
            Some(text) => (text, "\n"),
            None => (line, ""),
        };
        let painted = if text.starts_with("diff ")
            || text.starts_with("--- ")
            || text.starts_with("+++ ")
        {
            bold(text)
        } else if text.starts_with("@@") {
            cyan(text)
        } else if text.starts_with('+') {
            green(text)
        } else if text.starts_with('-') {
            red(text)
        } else {
            text.to_string()
        };
        output.push_str(&painted);
        output.push_str(newline);
    }
    output
}
