use crate::error::Result;
use crate::{io, paths};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

static CONFLICT_RE: OnceLock<Regex> = OnceLock::new();

fn conflict_re() -> &'static Regex {
    CONFLICT_RE.get_or_init(|| Regex::new(r"(?m)^<<<<<<< .*$[\s\S]*?^>>>>>>> ").unwrap())
}

pub fn has_conflict_markers(content: &str) -> bool {
    conflict_re().is_match(content)
}

/// Suffix of the sidecar holding the upstream side of a binary conflict.
pub const REJECT_SUFFIX: &str = ".rej";

/// Number of unresolved conflicts per docs file, keyed by `/`-separated
/// root-relative path. Inline blocks are counted one by one; a `.rej` sidecar
/// counts once against the file it belongs to.
pub fn conflict_counts(root: &Path) -> Result<BTreeMap<String, usize>> {
    let docs = paths::docs_dir(root);
    let mut out = BTreeMap::new();
    for rel in io::walk_files(&docs)? {
        let rel_str = format!("{}/{}", paths::DOCS_DIR, paths::to_slash(&rel));
        if let Some(original) = rel_str.strip_suffix(REJECT_SUFFIX) {
            if !original.is_empty() {
                *out.entry(original.to_string()).or_insert(0) += 1;
            }
            continue;
        }
        // Binary files cannot hold inline markers.
        let Ok(content) = std::fs::read_to_string(docs.join(&rel)) else {
            continue;
        };
        let n = conflict_re().find_iter(&content).count();
        if n > 0 {
            *out.entry(rel_str).or_insert(0) += n;
        }
    }
    Ok(out)
}

/// Files in the docs tree with unresolved conflicts: inline markers or a
/// `.rej` sidecar.
pub fn find_conflicts(root: &Path) -> Result<Vec<String>> {
    Ok(conflict_counts(root)?.into_keys().collect())
}
