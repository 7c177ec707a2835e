//! Rule links: symlinks in a tool's rules directory pointing back into the
//! canonical rules subtree of the docs tree.

use crate::error::{FsContext, Result};
use crate::io;
use crate::paths::relative_to;
use crate::patterns::RuleFilter;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What one `sync_links` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Links created or re-pointed.
    pub linked: Vec<String>,
    /// Links that were already correct.
    pub unchanged: Vec<String>,
    /// Stale links removed.
    pub removed: Vec<String>,
    /// Rule files filtered out by pattern.
    pub skipped: usize,
    /// Link names occupied by something that is not a symlink.
    pub blocked: Vec<String>,
    /// The rules directory did not exist; nothing was changed.
    pub rules_missing: bool,
}

impl LinkReport {
    pub fn active(&self) -> usize {
        self.linked.len() + self.unchanged.len()
    }
}

/// Link name for a rule file: the stem with the consuming tool's extension.
pub fn link_name(rule_file: &str, ext: &str) -> String {
    let stem = Path::new(rule_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| rule_file.to_string());
    format!("{stem}.{ext}")
}

/// Rule files (`*.md`) directly inside `rules_dir`, sorted by name.
pub fn rule_files(rules_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(rules_dir).at(rules_dir)? {
        let entry = entry.at(rules_dir)?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Make `managed_dir` hold exactly one link per rule file admitted by `filter`.
///
/// Links that point into `rules_dir` but are no longer wanted are removed.
/// Anything in `managed_dir` that is not such a link is left alone.
pub fn sync_links(
    rules_dir: &Path,
    managed_dir: &Path,
    filter: &RuleFilter,
    ext: &str,
) -> Result<LinkReport> {
    let mut report = LinkReport::default();
    if !rules_dir.is_dir() {
        warn!(rules_dir = %rules_dir.display(), "rules directory missing, links not synced");
        report.rules_missing = true;
        return Ok(report);
    }
    io::ensure_dir(managed_dir)?;
    let rel_rules = relative_to(managed_dir, rules_dir);

    let mut wanted: BTreeMap<String, PathBuf> = BTreeMap::new();
    for name in rule_files(rules_dir)? {
        if filter.matches(&name) {
            wanted.insert(link_name(&name, ext), rel_rules.join(&name));
        } else {
            report.skipped += 1;
        }
    }

    for name in owned_links(managed_dir, rules_dir)?.into_keys() {
        if !wanted.contains_key(&name) {
            let path = managed_dir.join(&name);
            io::remove_if_exists(&path)?;
            debug!(link = %path.display(), "removed stale link");
            report.removed.push(name);
        }
    }

    for (name, target) in &wanted {
        let path = managed_dir.join(name);
        match std::fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                if std::fs::read_link(&path).at(&path)? == *target {
                    report.unchanged.push(name.clone());
                    continue;
                }
                io::remove_if_exists(&path)?;
            }
            Ok(_) => {
                warn!(path = %path.display(), "not a symlink, leaving it in place");
                report.blocked.push(name.clone());
                continue;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(crate::SpeculateError::fs(&path, e)),
        }
        create_platform_symlink(target, &path).at(&path)?;
        debug!(link = %path.display(), target = %target.display(), "linked");
        report.linked.push(name.clone());
    }

    Ok(report)
}

/// Remove every link in `managed_dir` that points into `rules_dir`, then the
/// directory itself if it is left empty. Returns the removed link names.
pub fn remove_links(rules_dir: &Path, managed_dir: &Path) -> Result<Vec<String>> {
    if !managed_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut removed = Vec::new();
    for (name, _) in owned_links(managed_dir, rules_dir)? {
        io::remove_if_exists(&managed_dir.join(&name))?;
        removed.push(name);
    }
    io::remove_dir_if_empty(managed_dir)?;
    Ok(removed)
}

/// Number of links in `managed_dir` pointing into `rules_dir`.
pub fn count_links(rules_dir: &Path, managed_dir: &Path) -> Result<usize> {
    if !managed_dir.is_dir() {
        return Ok(0);
    }
    Ok(owned_links(managed_dir, rules_dir)?.len())
}

/// Symlinks in `managed_dir` whose target lives directly in `rules_dir`,
/// written either relative to `managed_dir` or absolute.
fn owned_links(managed_dir: &Path, rules_dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let rel_rules = relative_to(managed_dir, rules_dir);
    let mut out = BTreeMap::new();
    for entry in std::fs::read_dir(managed_dir).at(managed_dir)? {
        let entry = entry.at(managed_dir)?;
        let path = entry.path();
        if !entry.file_type().at(&path)?.is_symlink() {
            continue;
        }
        let target = std::fs::read_link(&path).at(&path)?;
        let parent = target.parent().unwrap_or(Path::new(""));
        if parent == rel_rules || parent == rules_dir {
            out.insert(entry.file_name().to_string_lossy().into_owned(), target);
        }
    }
    Ok(out)
}

fn create_platform_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, link)
    }
}
