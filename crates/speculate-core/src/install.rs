//! The install pipeline (settings, managed headers, rule links) and its inverse.
//!
//! Each step runs on its own: a failure in one is recorded in the report and
//! the remaining steps still run, so a partial install always leaves a trace.

use crate::error::{Result, SpeculateError};
use crate::header::{self, HeaderOutcome};
use crate::links::{self, LinkReport};
use crate::patterns::RuleFilter;
use crate::settings::SyncSettings;
use crate::{io, paths};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub type StepResult<T> = std::result::Result<T, SpeculateError>;

#[derive(Debug)]
pub struct InstallReport {
    pub settings: StepResult<SyncSettings>,
    pub headers: Vec<(PathBuf, StepResult<HeaderOutcome>)>,
    pub links: StepResult<LinkReport>,
}

impl InstallReport {
    pub fn failures(&self) -> Vec<&SpeculateError> {
        let mut out = Vec::new();
        if let Err(e) = &self.settings {
            out.push(e);
        }
        for (_, r) in &self.headers {
            if let Err(e) = r {
                out.push(e);
            }
        }
        if let Err(e) = &self.links {
            out.push(e);
        }
        out
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Write settings, ensure both managed headers, and sync the rule links.
///
/// Fails up front with `DocsTreeMissing` when there is no docs tree; after
/// that, step failures are collected in the report instead of aborting.
pub fn install(root: &Path, filter: &RuleFilter) -> Result<InstallReport> {
    let docs = paths::docs_dir(root);
    if !docs.is_dir() {
        return Err(SpeculateError::DocsTreeMissing(root.to_path_buf()));
    }

    let settings = SyncSettings::write(root);
    let headers = paths::managed_files(root)
        .into_iter()
        .map(|p| {
            let r = header::ensure_header(&p);
            (p, r)
        })
        .collect();
    let links = links::sync_links(
        &paths::rules_dir(root),
        &paths::cursor_rules_dir(root),
        filter,
        paths::CURSOR_RULE_EXT,
    );

    let report = InstallReport {
        settings,
        headers,
        links,
    };
    for e in report.failures() {
        warn!(error = %e, "install step failed");
    }
    info!(root = %root.display(), ok = report.is_success(), "install finished");
    Ok(report)
}

#[derive(Debug)]
pub struct UninstallReport {
    pub headers: Vec<(PathBuf, StepResult<HeaderOutcome>)>,
    pub links: StepResult<Vec<String>>,
    pub settings: StepResult<bool>,
}

impl UninstallReport {
    pub fn failures(&self) -> Vec<&SpeculateError> {
        let mut out: Vec<&SpeculateError> = self
            .headers
            .iter()
            .filter_map(|(_, r)| r.as_ref().err())
            .collect();
        if let Err(e) = &self.links {
            out.push(e);
        }
        if let Err(e) = &self.settings {
            out.push(e);
        }
        out
    }
}

/// Remove everything `install` created, leaving the docs tree, the answers
/// record and the project config alone.
pub fn uninstall(root: &Path) -> UninstallReport {
    let headers = paths::managed_files(root)
        .into_iter()
        .map(|p| {
            let r = header::remove_header(&p);
            (p, r)
        })
        .collect();

    let links = links::remove_links(&paths::rules_dir(root), &paths::cursor_rules_dir(root))
        .and_then(|removed| {
            io::remove_dir_if_empty(&paths::cursor_dir(root))?;
            Ok(removed)
        });

    let settings = SyncSettings::remove(root).and_then(|existed| {
        io::remove_dir_if_empty(&paths::speculate_dir(root))?;
        Ok(existed)
    });

    UninstallReport {
        headers,
        links,
        settings,
    }
}

/// Seed `docs/development.md` from the template's sample if it is missing.
/// Returns true if the file was created.
pub fn seed_project_file(root: &Path) -> Result<bool> {
    let sample = paths::development_sample_path(root);
    let target = paths::development_md_path(root);
    if !sample.exists() || target.exists() {
        return Ok(false);
    }
    let data = std::fs::read(&sample).map_err(|e| SpeculateError::fs(&sample, e))?;
    io::write_if_missing(&target, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs_tree(rules: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let rules_dir = dir.path().join(paths::RULES_DIR);
        std::fs::create_dir_all(&rules_dir).unwrap();
        for r in rules {
            std::fs::write(rules_dir.join(r), format!("# {r}\n")).unwrap();
        }
        dir
    }

    #[test]
    fn fails_without_docs_tree() {
        let dir = TempDir::new().unwrap();
        let err = install(dir.path(), &RuleFilter::all()).unwrap_err();
        assert!(matches!(err, SpeculateError::DocsTreeMissing(_)));
        assert!(!dir.path().join(".speculate").exists());
    }

    #[cfg(unix)]
    #[test]
    fn creates_all_configs() {
        let dir = docs_tree(&["test-rule.md"]);
        let report = install(dir.path(), &RuleFilter::all()).unwrap();
        assert!(report.is_success());
        assert!(dir.path().join(".speculate/settings.yml").exists());
        assert!(header::has_header(&dir.path().join("CLAUDE.md")));
        assert!(header::has_header(&dir.path().join("AGENTS.md")));
        assert_eq!(report.links.as_ref().unwrap().linked, vec!["test-rule.mdc"]);
    }

    #[cfg(unix)]
    #[test]
    fn install_twice_is_byte_identical() {
        let dir = docs_tree(&["a.md", "b.md"]);
        std::fs::write(dir.path().join("CLAUDE.md"), "# mine\n").unwrap();
        install(dir.path(), &RuleFilter::all()).unwrap();
        let claude = std::fs::read(dir.path().join("CLAUDE.md")).unwrap();
        let agents = std::fs::read(dir.path().join("AGENTS.md")).unwrap();

        let second = install(dir.path(), &RuleFilter::all()).unwrap();
        assert_eq!(std::fs::read(dir.path().join("CLAUDE.md")).unwrap(), claude);
        assert_eq!(std::fs::read(dir.path().join("AGENTS.md")).unwrap(), agents);
        let links = second.links.unwrap();
        assert!(links.linked.is_empty());
        assert_eq!(links.unchanged, vec!["a.mdc", "b.mdc"]);
    }

    #[test]
    fn missing_rules_dir_is_not_a_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        let report = install(dir.path(), &RuleFilter::all()).unwrap();
        assert!(report.is_success());
        assert!(report.links.unwrap().rules_missing);
        assert!(dir.path().join("CLAUDE.md").exists());
    }

    #[cfg(unix)]
    #[test]
    fn uninstall_reverses_install() {
        let dir = docs_tree(&["a.md"]);
        std::fs::write(dir.path().join("AGENTS.md"), "# keep me\n").unwrap();
        std::fs::write(dir.path().join(".copier-answers.yml"), "_commit: abc\n").unwrap();
        install(dir.path(), &RuleFilter::all()).unwrap();

        let report = uninstall(dir.path());
        assert!(report.failures().is_empty());
        assert_eq!(std::fs::read_to_string(dir.path().join("AGENTS.md")).unwrap(), "# keep me\n");
        assert_eq!(std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap(), "");
        assert!(!dir.path().join(".cursor").exists());
        assert!(!dir.path().join(".speculate").exists());
        assert!(dir.path().join("docs/general/agent-rules/a.md").exists());
        assert!(dir.path().join(".copier-answers.yml").exists());
    }

    #[test]
    fn uninstall_keeps_project_config() {
        let dir = docs_tree(&[]);
        install(dir.path(), &RuleFilter::all()).unwrap();
        std::fs::write(dir.path().join(".speculate/config.yml"), "engine: local\n").unwrap();
        uninstall(dir.path());
        assert!(dir.path().join(".speculate/config.yml").exists());
        assert!(!dir.path().join(".speculate/settings.yml").exists());
    }

    #[test]
    fn uninstall_on_clean_project_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let report = uninstall(dir.path());
        assert!(report.failures().is_empty());
        assert!(!report.settings.unwrap());
    }

    #[test]
    fn seeds_development_md_once() {
        let dir = TempDir::new().unwrap();
        let sample = dir.path().join(paths::DEVELOPMENT_SAMPLE_MD);
        std::fs::create_dir_all(sample.parent().unwrap()).unwrap();
        std::fs::write(&sample, "# Sample\n").unwrap();

        assert!(seed_project_file(dir.path()).unwrap());
        std::fs::write(dir.path().join(paths::DEVELOPMENT_MD), "# Customized\n").unwrap();
        assert!(!seed_project_file(dir.path()).unwrap());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(paths::DEVELOPMENT_MD)).unwrap(),
            "# Customized\n"
        );
    }
}
