//! Engine backed by the external `copier` executable.
//!
//! Remote templates (`gh:owner/repo`, git URLs) go through copier, which
//! owns the answers-file format and the inline conflict merge. stdio is
//! inherited so copier's own prompts and progress reach the terminal.

use super::{conflict_counts, CopyRequest, TemplateEngine, UpdateReport};
use crate::answers::TemplateReference;
use crate::error::{Result, SpeculateError};
use crate::paths;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CopierEngine {
    program: PathBuf,
}

impl CopierEngine {
    /// Find `copier` on PATH.
    pub fn locate() -> Result<Self> {
        let program =
            which::which("copier").map_err(|_| SpeculateError::EngineNotFound("copier".into()))?;
        Ok(Self { program })
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[OsString], what: &str) -> Result<()> {
        debug!(program = %self.program.display(), ?args, "running copier");
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|e| SpeculateError::EngineFailed(format!("failed to start copier: {e}")))?;
        if !status.success() {
            return Err(SpeculateError::EngineFailed(format!(
                "copier {what} exited with {status}"
            )));
        }
        Ok(())
    }
}

fn skip_args(args: &mut Vec<OsString>) {
    for pattern in paths::PROTECTED_PATTERNS {
        args.push("--skip".into());
        args.push((*pattern).into());
    }
}

pub(crate) fn copy_args(req: &CopyRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["copy".into(), "--vcs-ref".into(), req.git_ref.clone().into()];
    if req.overwrite {
        args.push("--overwrite".into());
        args.push("--defaults".into());
    }
    skip_args(&mut args);
    args.push(req.source.clone().into());
    args.push(req.destination.clone().into_os_string());
    args
}

pub(crate) fn update_args(root: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "update".into(),
        "--conflict".into(),
        "inline".into(),
        "--defaults".into(),
    ];
    skip_args(&mut args);
    args.push(root.as_os_str().to_os_string());
    args
}

/// Files that gained conflicts during a run, including files that already
/// held some before it.
fn new_conflicts(before: &BTreeMap<String, usize>, after: BTreeMap<String, usize>) -> Vec<String> {
    after
        .into_iter()
        .filter(|(f, n)| *n > before.get(f).copied().unwrap_or(0))
        .map(|(f, _)| f)
        .collect()
}

impl TemplateEngine for CopierEngine {
    fn name(&self) -> &'static str {
        "copier"
    }

    fn copy(&self, req: &CopyRequest) -> Result<TemplateReference> {
        self.run(&copy_args(req), "copy")?;
        TemplateReference::load(&req.destination)?.ok_or_else(|| {
            SpeculateError::EngineFailed(format!("copier did not write {}", paths::ANSWERS_FILE))
        })
    }

    fn update(&self, root: &Path) -> Result<UpdateReport> {
        let before = conflict_counts(root)?;
        self.run(&update_args(root), "update")?;
        let reference = TemplateReference::load(root)?.ok_or(SpeculateError::NotInitialized)?;
        let mut report = UpdateReport::new(reference);
        report.conflicts = new_conflicts(&before, conflict_counts(root)?);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn copy_args_with_overwrite() {
        let args = strings(&copy_args(&CopyRequest {
            source: "gh:jlevy/speculate".into(),
            destination: PathBuf::from("/work/proj"),
            git_ref: "v1.0.0".into(),
            overwrite: true,
        }));
        assert_eq!(&args[..5], ["copy", "--vcs-ref", "v1.0.0", "--overwrite", "--defaults"]);
        assert!(args.windows(2).any(|w| w == ["--skip", "docs/development.md"]));
        assert_eq!(&args[args.len() - 2..], ["gh:jlevy/speculate", "/work/proj"]);
    }

    #[test]
    fn copy_args_interactive() {
        let args = strings(&copy_args(&CopyRequest {
            source: "gh:jlevy/speculate".into(),
            destination: PathBuf::from("."),
            git_ref: "HEAD".into(),
            overwrite: false,
        }));
        assert!(!args.contains(&"--overwrite".to_string()));
        assert!(!args.contains(&"--defaults".to_string()));
    }

    #[test]
    fn update_args_use_inline_conflicts() {
        let args = strings(&update_args(Path::new("/work/proj")));
        assert_eq!(&args[..4], ["update", "--conflict", "inline", "--defaults"]);
        assert_eq!(args.last().unwrap(), "/work/proj");
    }

    #[test]
    fn missing_program_fails_cleanly() {
        let engine = CopierEngine::with_program("/nonexistent/copier");
        let err = engine.run(&["--version".into()], "version").unwrap_err();
        assert!(matches!(err, SpeculateError::EngineFailed(_)));
    }

    #[test]
    fn new_conflicts_include_files_with_earlier_markers() {
        let before = BTreeMap::from([
            ("docs/a.md".to_string(), 1),
            ("docs/b.md".to_string(), 1),
        ]);
        let after = BTreeMap::from([
            ("docs/a.md".to_string(), 2),
            ("docs/b.md".to_string(), 1),
            ("docs/c.md".to_string(), 1),
        ]);
        assert_eq!(new_conflicts(&before, after), vec!["docs/a.md", "docs/c.md"]);
    }
}
