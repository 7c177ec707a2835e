use crate::error::{FsContext, Result, SpeculateError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// The tempfile is discarded on every error path, so readers see either the old
/// content or the new content, never a truncated file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).at(dir)?;
    let mut tmp = NamedTempFile::new_in(dir).at(dir)?;
    tmp.write_all(data).at(path)?;
    tmp.as_file().sync_all().at(path)?;
    tmp.persist(path).map_err(|e| SpeculateError::fs(path, e.error))?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).at(path)
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Remove a file or symlink. Returns true if something was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SpeculateError::fs(path, e)),
    }
}

/// Remove `dir` if it exists and is empty. Returns true if removed.
pub fn remove_dir_if_empty(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    if std::fs::read_dir(dir).at(dir)?.next().is_some() {
        return Ok(false);
    }
    std::fs::remove_dir(dir).at(dir)?;
    Ok(true)
}

/// Check that files can be created under `dir` (or its nearest existing ancestor)
/// without leaving anything behind.
pub fn ensure_writable(dir: &Path) -> Result<()> {
    let mut probe = dir;
    while !probe.exists() {
        match probe.parent() {
            Some(p) if !p.as_os_str().is_empty() => probe = p,
            _ => return Ok(()),
        }
    }
    NamedTempFile::new_in(probe).at(probe)?;
    Ok(())
}

/// All regular files under `dir`, as paths relative to `dir`, sorted.
/// Symlinks are not followed.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if dir.is_dir() {
        walk_into(dir, Path::new(""), &mut out)?;
    }
    out.sort();
    Ok(out)
}

fn walk_into(base: &Path, rel: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let here = base.join(rel);
    for entry in std::fs::read_dir(&here).at(&here)? {
        let entry = entry.at(&here)?;
        let file_type = entry.file_type().at(&entry.path())?;
        let child = rel.join(entry.file_name());
        if file_type.is_dir() {
            walk_into(base, &child, out)?;
        } else if file_type.is_file() {
            out.push(child);
        }
    }
    Ok(())
}

/// File count and total size in bytes of everything under `dir`.
pub fn dir_stats(dir: &Path) -> Result<(usize, u64)> {
    let files = walk_files(dir)?;
    let mut total = 0;
    for rel in &files {
        let path = dir.join(rel);
        total += std::fs::metadata(&path).at(&path)?.len();
    }
    Ok((files.len(), total))
}
