//! Built-in engine for templates in a local directory.
//!
//! Copies the template's `docs/` subtree and records the content hash of every
//! file it installed. Updates use those hashes as the merge base: a file is
//! only overwritten when the local copy is unmodified, and edits on both sides
//! produce inline conflict markers.

use super::{is_protected, CopyRequest, TemplateEngine, UpdateReport, REJECT_SUFFIX};
use crate::answers::{LocalAnswers, TemplateReference};
use crate::config::DEFAULT_REF;
use crate::error::{FsContext, Result, SpeculateError};
use crate::{io, paths};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFLICT_BEFORE: &str = "<<<<<<< before updating";
pub const CONFLICT_SEPARATOR: &str = "=======";
pub const CONFLICT_AFTER: &str = ">>>>>>> after updating";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngine;

/// One file of the template, keyed by root-relative `/` path.
struct TemplateFile {
    source: PathBuf,
    hash: String,
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Read every file of the template's docs tree.
fn scan_template(source: &Path) -> Result<BTreeMap<String, TemplateFile>> {
    let docs = source.join(paths::DOCS_DIR);
    if !docs.is_dir() {
        return Err(SpeculateError::EngineFailed(format!(
            "template {} has no {}/ directory",
            source.display(),
            paths::DOCS_DIR
        )));
    }
    let mut files = BTreeMap::new();
    for rel in io::walk_files(&docs)? {
        let path = docs.join(&rel);
        let data = std::fs::read(&path).at(&path)?;
        files.insert(
            format!("{}/{}", paths::DOCS_DIR, paths::to_slash(&rel)),
            TemplateFile {
                source: path,
                hash: sha256_hex(&data),
            },
        );
    }
    Ok(files)
}

/// Version identifier for a template snapshot.
fn tree_version(files: &BTreeMap<String, TemplateFile>) -> String {
    let mut hasher = Sha256::new();
    for (rel, f) in files {
        hasher.update(rel.as_bytes());
        hasher.update([0]);
        hasher.update(f.hash.as_bytes());
        hasher.update([b'\n']);
    }
    let hex = format!("{:x}", hasher.finalize());
    format!("sha256:{}", &hex[..12])
}

fn record(source: &Path, files: &BTreeMap<String, TemplateFile>) -> LocalAnswers {
    LocalAnswers {
        commit: tree_version(files),
        src_path: source.to_string_lossy().into_owned(),
        files: files
            .iter()
            .map(|(rel, f)| (rel.clone(), f.hash.clone()))
            .collect(),
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SpeculateError::fs(path, e)),
    }
}

/// Both versions of a text file with inline markers around them.
pub fn conflict_text(local: &str, upstream: &str) -> String {
    fn terminated(s: &str) -> String {
        if s.is_empty() || s.ends_with('\n') {
            s.to_string()
        } else {
            format!("{s}\n")
        }
    }
    format!(
        "{CONFLICT_BEFORE}\n{}{CONFLICT_SEPARATOR}\n{}{CONFLICT_AFTER}\n",
        terminated(local),
        terminated(upstream)
    )
}

impl TemplateEngine for LocalEngine {
    fn name(&self) -> &'static str {
        "local"
    }

    fn copy(&self, req: &CopyRequest) -> Result<TemplateReference> {
        if req.git_ref != DEFAULT_REF {
            warn!(git_ref = %req.git_ref, "local templates have no refs; using the directory as is");
        }
        let source = std::fs::canonicalize(&req.source).at(Path::new(&req.source))?;
        let files = scan_template(&source)?;
        let root = &req.destination;

        for (rel, f) in &files {
            let dest = root.join(rel);
            if dest.exists() {
                if is_protected(rel) {
                    debug!(file = %rel, "protected, keeping existing");
                    continue;
                }
                if !req.overwrite {
                    let current = std::fs::read(&dest).at(&dest)?;
                    if sha256_hex(&current) != f.hash {
                        warn!(file = %rel, "exists with local changes, keeping it");
                    }
                    continue;
                }
            }
            let data = std::fs::read(&f.source).at(&f.source)?;
            io::atomic_write(&dest, &data)?;
            debug!(file = %rel, "copied");
        }

        let answers = record(&source, &files);
        answers.save(root)?;
        Ok(answers.reference())
    }

    fn update(&self, root: &Path) -> Result<UpdateReport> {
        let previous = LocalAnswers::load(root)?.ok_or(SpeculateError::NotInitialized)?;
        let source = PathBuf::from(&previous.src_path);
        let files = scan_template(&source)?;
        let answers = record(&source, &files);
        let mut report = UpdateReport::new(answers.reference());

        for (rel, f) in &files {
            let dest = root.join(rel);
            let local = read_optional(&dest)?;
            let base = previous.files.get(rel);

            if local.is_some() && is_protected(rel) {
                report.protected.push(rel.clone());
                continue;
            }
            let Some(local) = local else {
                // Deleted locally and unchanged upstream: respect the deletion.
                if base != Some(&f.hash) {
                    let data = std::fs::read(&f.source).at(&f.source)?;
                    io::atomic_write(&dest, &data)?;
                    report.added.push(rel.clone());
                }
                continue;
            };

            let local_hash = sha256_hex(&local);
            if local_hash == f.hash {
                continue;
            }
            if base == Some(&local_hash) {
                let data = std::fs::read(&f.source).at(&f.source)?;
                io::atomic_write(&dest, &data)?;
                report.updated.push(rel.clone());
                continue;
            }
            if base == Some(&f.hash) {
                report.kept_local.push(rel.clone());
                continue;
            }

            let upstream = std::fs::read(&f.source).at(&f.source)?;
            match (std::str::from_utf8(&local), std::str::from_utf8(&upstream)) {
                (Ok(l), Ok(u)) => {
                    io::atomic_write(&dest, conflict_text(l, u).as_bytes())?;
                }
                _ => {
                    let mut rej = dest.clone().into_os_string();
                    rej.push(REJECT_SUFFIX);
                    io::atomic_write(Path::new(&rej), &upstream)?;
                }
            }
            warn!(file = %rel, "conflict: changed both locally and upstream");
            report.conflicts.push(rel.clone());
        }

        for (rel, base_hash) in &previous.files {
            if files.contains_key(rel) {
                continue;
            }
            let dest = root.join(rel);
            if is_protected(rel) {
                if dest.exists() {
                    report.protected.push(rel.clone());
                }
                continue;
            }
            match read_optional(&dest)? {
                Some(local) if sha256_hex(&local) == *base_hash => {
                    io::remove_if_exists(&dest)?;
                    report.removed.push(rel.clone());
                }
                Some(_) => report.kept_local.push(rel.clone()),
                None => {}
            }
        }

        answers.save(root)?;
        Ok(report)
    }
}
