//! Template source adapter.
//!
//! The docs tree is produced by a templating engine: either the external
//! `copier` executable, or the built-in [`LocalEngine`] for templates that
//! live in a local directory. Both leave an answers record at the project root
//! that [`TemplateReference`] reads.

mod conflicts;
mod copier;
mod local;

pub use conflicts::{conflict_counts, find_conflicts, has_conflict_markers, REJECT_SUFFIX};
pub use copier::CopierEngine;
pub use local::LocalEngine;

use crate::answers::TemplateReference;
use crate::error::{Result, SpeculateError};
use crate::paths;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

// ---------------------------------------------------------------------------
// Requests / reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub source: String,
    pub destination: PathBuf,
    pub git_ref: String,
    /// Replace existing files without asking.
    pub overwrite: bool,
}

/// Per-file outcome of an update. Paths are `/`-separated, relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub reference: TemplateReference,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// Local edits kept because upstream did not change the file.
    pub kept_local: Vec<String>,
    /// Protected files left untouched.
    pub protected: Vec<String>,
    /// Files now holding inline conflict markers (or a `.rej` sidecar).
    pub conflicts: Vec<String>,
}

impl UpdateReport {
    pub fn new(reference: TemplateReference) -> Self {
        Self {
            reference,
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
            kept_local: Vec::new(),
            protected: Vec::new(),
            conflicts: Vec::new(),
        }
    }
}

pub trait TemplateEngine {
    fn name(&self) -> &'static str;

    /// Copy the template into `req.destination` and write the answers record.
    fn copy(&self, req: &CopyRequest) -> Result<TemplateReference>;

    /// Refresh the docs tree at `root` from the recorded template source.
    /// Conflicts are marked inline; they never fail the update.
    fn update(&self, root: &Path) -> Result<UpdateReport>;
}

// ---------------------------------------------------------------------------
// EngineKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Auto,
    Copier,
    Local,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Auto => "auto",
            EngineKind::Copier => "copier",
            EngineKind::Local => "local",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(EngineKind::Auto),
            "copier" => Ok(EngineKind::Copier),
            "local" => Ok(EngineKind::Local),
            other => Err(format!(
                "unknown engine '{other}' (expected auto, copier, or local)"
            )),
        }
    }
}

/// Pick the engine for `source`. `Auto` uses the local engine when `source`
/// is an existing directory.
pub fn select(kind: EngineKind, source: &str) -> Result<Box<dyn TemplateEngine>> {
    let resolved = match kind {
        EngineKind::Auto if Path::new(source).is_dir() => EngineKind::Local,
        EngineKind::Auto => EngineKind::Copier,
        k => k,
    };
    debug!(engine = %resolved, source, "selected template engine");
    Ok(match resolved {
        EngineKind::Local => Box::new(LocalEngine),
        _ => Box::new(CopierEngine::locate()?),
    })
}

/// Copy the template described by `req`.
pub fn copy(kind: EngineKind, req: &CopyRequest) -> Result<TemplateReference> {
    select(kind, &req.source)?.copy(req)
}

/// Update the docs tree at `root` from its recorded source.
pub fn update(kind: EngineKind, root: &Path) -> Result<UpdateReport> {
    let reference = TemplateReference::load(root)?.ok_or(SpeculateError::NotInitialized)?;
    select(kind, &reference.source_uri)?.update(root)
}

// ---------------------------------------------------------------------------
// Protected paths
// ---------------------------------------------------------------------------

/// Whether a `/`-separated root-relative path is protected from overwrite.
pub fn is_protected(rel: &str) -> bool {
    paths::PROTECTED_PATTERNS.iter().any(|p| {
        Pattern::new(p)
            .map(|pat| pat.matches(rel))
            .unwrap_or(false)
    })
}
