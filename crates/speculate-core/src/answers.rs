//! The answers record the template engine leaves at the project root.
//!
//! The record's format belongs to the engine. This module only reads the two
//! fields every engine writes (`_src_path`, `_commit`); the native local engine
//! additionally reads and writes its per-file merge base (`_files`).

use crate::error::{FsContext, Result};
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Where the docs tree came from and which version of it is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateReference {
    pub source_uri: String,
    pub resolved_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnswers {
    #[serde(rename = "_src_path", default)]
    src_path: Option<String>,
    #[serde(rename = "_commit", default)]
    commit: Option<String>,
}

impl TemplateReference {
    /// Read the answers record. `Ok(None)` when the project has none.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::answers_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path).at(&path)?;
        let raw: Option<RawAnswers> = serde_yaml::from_str(&data)?;
        let raw = raw.unwrap_or_default();
        Ok(Some(Self {
            source_uri: raw.src_path.unwrap_or_else(|| "unknown".to_string()),
            resolved_version: raw.commit,
        }))
    }

    pub fn exists(root: &Path) -> bool {
        paths::answers_path(root).exists()
    }

    pub fn version_or_unknown(&self) -> &str {
        self.resolved_version.as_deref().unwrap_or("unknown")
    }
}

// ---------------------------------------------------------------------------
// Local engine record
// ---------------------------------------------------------------------------

/// Full answers record as written by the local engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAnswers {
    #[serde(rename = "_commit")]
    pub commit: String,
    #[serde(rename = "_src_path")]
    pub src_path: String,
    /// Content hash of every file as it was last installed, keyed by
    /// `/`-separated path relative to the project root.
    #[serde(rename = "_files", default)]
    pub files: BTreeMap<String, String>,
}

impl LocalAnswers {
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::answers_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path).at(&path)?;
        Ok(Some(serde_yaml::from_str(&data)?))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = format!(
            "# Changes here will be overwritten by speculate; do not edit.\n{}",
            serde_yaml::to_string(self)?
        );
        io::atomic_write(&paths::answers_path(root), data.as_bytes())
    }

    pub fn reference(&self) -> TemplateReference {
        TemplateReference {
            source_uri: self.src_path.clone(),
            resolved_version: Some(self.commit.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_record_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TemplateReference::load(dir.path()).unwrap(), None);
        assert!(!TemplateReference::exists(dir.path()));
    }

    #[test]
    fn reads_copier_answers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".copier-answers.yml"),
            "# Changes here will be overwritten by Copier\n_commit: v1.2.3\n_src_path: gh:jlevy/speculate\n",
        )
        .unwrap();
        let r = TemplateReference::load(dir.path()).unwrap().unwrap();
        assert_eq!(r.source_uri, "gh:jlevy/speculate");
        assert_eq!(r.resolved_version.as_deref(), Some("v1.2.3"));
    }

    #[test]
    fn missing_fields_degrade_to_unknown() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".copier-answers.yml"), "").unwrap();
        let r = TemplateReference::load(dir.path()).unwrap().unwrap();
        assert_eq!(r.source_uri, "unknown");
        assert_eq!(r.version_or_unknown(), "unknown");
    }

    #[test]
    fn local_answers_are_readable_as_reference() {
        let dir = TempDir::new().unwrap();
        let mut answers = LocalAnswers {
            commit: "sha256:abc".into(),
            src_path: "/templates/speculate".into(),
            files: BTreeMap::new(),
        };
        answers.files.insert("docs/a.md".into(), "00ff".into());
        answers.save(dir.path()).unwrap();

        let loaded = LocalAnswers::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, answers);
        let r = TemplateReference::load(dir.path()).unwrap().unwrap();
        assert_eq!(r, answers.reference());
    }
}
