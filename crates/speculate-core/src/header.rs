//! Managed header block at the top of CLAUDE.md / AGENTS.md.
//!
//! The header is owned by speculate; everything else in the file belongs to the
//! user and is preserved byte-for-byte. The marker phrase identifies the header,
//! so a file holds at most one.

use crate::error::{FsContext, Result};
use crate::io;
use std::path::Path;
use tracing::debug;

/// Phrase that identifies the managed header.
pub const MARKER: &str = "Speculate project structure";

/// The two-line header block (no trailing newline).
pub const HEADER: &str = "IMPORTANT: You MUST read ./docs/development.md and ./docs/docs-overview.md for project documentation.\n(This project uses Speculate project structure.)";

/// Number of lines in [`HEADER`].
const HEADER_LINES: usize = 2;

/// Separator placed between the header and pre-existing content.
const SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderOutcome {
    Created,
    Prepended,
    AlreadyPresent,
    Removed,
    NotPresent,
    Missing,
}

// ---------------------------------------------------------------------------
// Pure content transforms
// ---------------------------------------------------------------------------

/// Content with the header prepended, or `None` if the marker is already there.
pub fn with_header(content: &str) -> Option<String> {
    if content.contains(MARKER) {
        return None;
    }
    Some(format!("{HEADER}{SEPARATOR}{content}"))
}

/// Content for a file that did not exist before.
pub fn fresh_file() -> String {
    format!("{HEADER}\n")
}

/// Content with the header removed, or `None` if there is no header to remove.
///
/// Removes the first full header block plus the separator written with it.
/// If the block was edited, only its leading lines are considered: the first
/// two lines go when they hold the marker or the header's first line. A marker
/// phrase anywhere else belongs to the user and is kept.
pub fn without_header(content: &str) -> Option<String> {
    if !content.contains(MARKER) {
        return None;
    }
    if let Some(pos) = content.find(HEADER) {
        let after = &content[pos + HEADER.len()..];
        let rest = after
            .strip_prefix(SEPARATOR)
            .or_else(|| after.strip_prefix('\n'))
            .unwrap_or(after);
        let mut out = String::with_capacity(content.len());
        out.push_str(&content[..pos]);
        out.push_str(rest);
        return Some(out);
    }

    let first_line = HEADER.lines().next().unwrap_or(HEADER);
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut skip = 0;
    while skip < lines.len().min(HEADER_LINES) {
        let line = lines[skip].trim_end();
        if line.contains(MARKER) || line == first_line {
            skip += 1;
        } else {
            break;
        }
    }
    if !lines[..skip].iter().any(|l| l.contains(MARKER)) {
        return None;
    }
    if lines.get(skip).is_some_and(|l| l.trim().is_empty()) {
        skip += 1;
    }
    Some(lines[skip..].concat())
}

// ---------------------------------------------------------------------------
// File operations
// ---------------------------------------------------------------------------

/// Make sure `path` starts with the managed header. Idempotent.
pub fn ensure_header(path: &Path) -> Result<HeaderOutcome> {
    if !path.exists() {
        io::atomic_write(path, fresh_file().as_bytes())?;
        debug!(path = %path.display(), "created with header");
        return Ok(HeaderOutcome::Created);
    }
    let content = std::fs::read_to_string(path).at(path)?;
    match with_header(&content) {
        None => Ok(HeaderOutcome::AlreadyPresent),
        Some(updated) => {
            io::atomic_write(path, updated.as_bytes())?;
            debug!(path = %path.display(), "header prepended");
            Ok(HeaderOutcome::Prepended)
        }
    }
}

/// Strip the managed header from `path`, leaving the rest untouched.
/// A file that ends up empty is kept as a zero-byte file.
pub fn remove_header(path: &Path) -> Result<HeaderOutcome> {
    if !path.exists() {
        return Ok(HeaderOutcome::Missing);
    }
    let content = std::fs::read_to_string(path).at(path)?;
    match without_header(&content) {
        None => Ok(HeaderOutcome::NotPresent),
        Some(stripped) => {
            io::atomic_write(path, stripped.as_bytes())?;
            debug!(path = %path.display(), "header removed");
            Ok(HeaderOutcome::Removed)
        }
    }
}

/// Whether `path` exists and carries the header marker.
pub fn has_header(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .map(|c| c.contains(MARKER))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLES: &[&str] = &[
        "",
        "\n",
        "# Existing Rules\n\nSome existing content.\n",
        "no trailing newline",
        "\n\n  leading blank lines and spaces  \n\t\n",
        "IMPORTANT: something else entirely\n",
        "crlf\r\nline\r\n",
    ];

    #[test]
    fn remove_undoes_ensure() {
        for c in SAMPLES {
            let added = with_header(c).unwrap();
            assert_eq!(without_header(&added).as_deref(), Some(*c), "sample {c:?}");
        }
    }

    #[test]
    fn ensure_is_idempotent() {
        for c in SAMPLES {
            let once = with_header(c).unwrap();
            assert!(with_header(&once).is_none());
            assert_eq!(once.matches(MARKER).count(), 1);
        }
    }

    #[test]
    fn header_is_two_lines_with_marker() {
        assert_eq!(HEADER.lines().count(), 2);
        assert!(HEADER.contains(MARKER));
        assert!(HEADER.contains("./docs/development.md"));
    }

    #[test]
    fn edited_header_lines_are_removed_by_marker() {
        let content = "(This project uses Speculate project structure, customized.)\n# Mine\n";
        assert_eq!(without_header(content).as_deref(), Some("# Mine\n"));
    }

    #[test]
    fn header_in_the_middle_is_removed_in_place() {
        let content = format!("# Top\n{HEADER}\n\n# Bottom\n");
        assert_eq!(
            without_header(&content).as_deref(),
            Some("# Top\n# Bottom\n")
        );
    }

    #[test]
    fn ensure_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CLAUDE.md");
        assert_eq!(ensure_header(&path).unwrap(), HeaderOutcome::Created);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), fresh_file());
        assert_eq!(ensure_header(&path).unwrap(), HeaderOutcome::AlreadyPresent);
    }

    #[test]
    fn ensure_prepends_and_preserves_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        let existing = "# Existing Rules\n\nSome existing content.\n";
        std::fs::write(&path, existing).unwrap();

        assert_eq!(ensure_header(&path).unwrap(), HeaderOutcome::Prepended);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.find(MARKER).unwrap() < content.find("Existing Rules").unwrap());
        assert!(content.ends_with(existing));

        assert_eq!(ensure_header(&path).unwrap(), HeaderOutcome::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn remove_restores_original_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CLAUDE.md");
        let existing = "# Mine\n";
        std::fs::write(&path, existing).unwrap();
        ensure_header(&path).unwrap();
        assert_eq!(remove_header(&path).unwrap(), HeaderOutcome::Removed);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), existing);
        assert_eq!(remove_header(&path).unwrap(), HeaderOutcome::NotPresent);
    }

    #[test]
    fn remove_keeps_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CLAUDE.md");
        ensure_header(&path).unwrap();
        remove_header(&path).unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn remove_on_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            remove_header(&dir.path().join("nope.md")).unwrap(),
            HeaderOutcome::Missing
        );
        assert!(!has_header(&dir.path().join("nope.md")));
    }

    #[test]
    fn user_mention_of_marker_is_not_a_header() {
        let content = "# Notes\nWe follow the Speculate project structure here.\nMore.\n";
        assert!(without_header(content).is_none());
    }

    #[test]
    fn only_the_header_block_is_removed() {
        let content = format!("{HEADER}\n\n# Mine\nSee Speculate project structure docs.\n");
        assert_eq!(
            without_header(&content).as_deref(),
            Some("# Mine\nSee Speculate project structure docs.\n")
        );
    }

    #[test]
    fn edited_header_keeps_later_marker_lines() {
        let content = "IMPORTANT: You MUST read ./docs/development.md and ./docs/docs-overview.md for project documentation.\n(Uses Speculate project structure, v2.)\n\n# Mine\nSpeculate project structure is great.\n";
        assert_eq!(
            without_header(content).as_deref(),
            Some("# Mine\nSpeculate project structure is great.\n")
        );
    }

    #[test]
    fn remove_leaves_user_marker_lines_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CLAUDE.md");
        let existing = "# Notes\nWe follow the Speculate project structure here.\nMore.\n";
        std::fs::write(&path, existing).unwrap();

        assert_eq!(ensure_header(&path).unwrap(), HeaderOutcome::AlreadyPresent);
        assert_eq!(remove_header(&path).unwrap(), HeaderOutcome::NotPresent);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), existing);
    }
}
