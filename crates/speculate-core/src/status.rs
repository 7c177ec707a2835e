use crate::answers::TemplateReference;
use crate::engine::find_conflicts;
use crate::error::Result;
use crate::settings::SyncSettings;
use crate::{header, io, links, paths};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocsStats {
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedFileStatus {
    pub name: &'static str,
    pub present: bool,
    pub has_header: bool,
}

/// Read-only snapshot of everything speculate manages in a project.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub root: PathBuf,
    pub template: Option<TemplateReference>,
    pub settings: Option<SyncSettings>,
    pub docs: Option<DocsStats>,
    pub development_md: bool,
    pub managed_files: Vec<ManagedFileStatus>,
    pub cursor_rules: bool,
    pub rule_links: usize,
    pub conflicts: Vec<String>,
}

impl StatusReport {
    pub fn collect(root: &Path) -> Result<Self> {
        let docs_dir = paths::docs_dir(root);
        let docs = if docs_dir.is_dir() {
            let (files, bytes) = io::dir_stats(&docs_dir)?;
            Some(DocsStats { files, bytes })
        } else {
            None
        };

        let managed_files = [paths::CLAUDE_MD, paths::AGENTS_MD]
            .into_iter()
            .map(|name| {
                let path = root.join(name);
                ManagedFileStatus {
                    name,
                    present: path.exists(),
                    has_header: header::has_header(&path),
                }
            })
            .collect();

        let cursor_rules = paths::cursor_rules_dir(root);

        Ok(Self {
            root: root.to_path_buf(),
            template: TemplateReference::load(root)?,
            settings: SyncSettings::load(root)?,
            docs,
            development_md: paths::development_md_path(root).exists(),
            managed_files,
            cursor_rules: cursor_rules.is_dir(),
            rule_links: links::count_links(&paths::rules_dir(root), &cursor_rules)?,
            conflicts: find_conflicts(root)?,
        })
    }

    /// The required project file is missing.
    pub fn has_errors(&self) -> bool {
        !self.development_md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::install;
    use crate::patterns::RuleFilter;
    use tempfile::TempDir;

    #[test]
    fn empty_project() {
        let dir = TempDir::new().unwrap();
        let s = StatusReport::collect(dir.path()).unwrap();
        assert!(s.template.is_none());
        assert!(s.settings.is_none());
        assert!(s.docs.is_none());
        assert!(s.has_errors());
        assert!(s.managed_files.iter().all(|m| !m.present));
    }

    #[test]
    fn missing_development_md_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join(".copier-answers.yml"),
            "_commit: abc123\n_src_path: test\n",
        )
        .unwrap();
        let s = StatusReport::collect(dir.path()).unwrap();
        assert_eq!(s.template.as_ref().unwrap().version_or_unknown(), "abc123");
        assert!(s.has_errors());
    }

    #[cfg(unix)]
    #[test]
    fn installed_project() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join(paths::RULES_DIR);
        std::fs::create_dir_all(&rules).unwrap();
        std::fs::write(rules.join("a.md"), "# a\n").unwrap();
        std::fs::write(dir.path().join("docs/development.md"), "# Dev\n").unwrap();
        install(dir.path(), &RuleFilter::all()).unwrap();

        let s = StatusReport::collect(dir.path()).unwrap();
        assert!(!s.has_errors());
        assert!(s.settings.is_some());
        assert_eq!(s.docs.unwrap().files, 2);
        assert!(s.managed_files.iter().all(|m| m.present && m.has_header));
        assert!(s.cursor_rules);
        assert_eq!(s.rule_links, 1);
        assert!(s.conflicts.is_empty());
    }
}
