use crate::answers::TemplateReference;
use crate::error::{FsContext, Result};
use crate::{io, paths, CLI_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Install bookkeeping kept in `.speculate/settings.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub last_update: DateTime<Utc>,
    pub last_cli_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_docs_version: Option<String>,
}

impl SyncSettings {
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::settings_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path).at(&path)?;
        Ok(Some(serde_yaml::from_str(&data)?))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::settings_path(root), data.as_bytes())
    }

    /// Recompute the record from scratch and overwrite it.
    ///
    /// `last_update` never moves backwards relative to the stored record, even
    /// if the wall clock did. A missing answers record is not an error here.
    pub fn write(root: &Path) -> Result<Self> {
        Self::write_at(root, Utc::now())
    }

    pub fn write_at(root: &Path, now: DateTime<Utc>) -> Result<Self> {
        // An unreadable previous record is simply replaced.
        let previous = Self::load(root).ok().flatten();
        let last_update = match previous {
            Some(prev) if prev.last_update > now => prev.last_update,
            _ => now,
        };
        let settings = Self {
            last_update,
            last_cli_version: CLI_VERSION.to_string(),
            last_docs_version: TemplateReference::load(root)?
                .and_then(|r| r.resolved_version),
        };
        settings.save(root)?;
        debug!(path = %paths::settings_path(root).display(), "settings written");
        Ok(settings)
    }

    /// Delete the record. Returns true if it existed.
    pub fn remove(root: &Path) -> Result<bool> {
        io::remove_if_exists(&paths::settings_path(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn creates_settings_file() {
        let dir = TempDir::new().unwrap();
        let s = SyncSettings::write(dir.path()).unwrap();
        assert!(dir.path().join(".speculate/settings.yml").exists());
        assert_eq!(s.last_cli_version, CLI_VERSION);
        assert_eq!(s.last_docs_version, None);

        let raw = std::fs::read_to_string(dir.path().join(".speculate/settings.yml")).unwrap();
        assert!(raw.contains("last_update:"));
        assert!(raw.contains("last_cli_version:"));
        assert!(!raw.contains("last_docs_version"));
    }

    #[test]
    fn reads_docs_version_from_answers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".copier-answers.yml"),
            "_commit: v1.2.3\n_src_path: gh:test/repo\n",
        )
        .unwrap();
        let s = SyncSettings::write(dir.path()).unwrap();
        assert_eq!(s.last_docs_version.as_deref(), Some("v1.2.3"));
        assert_eq!(SyncSettings::load(dir.path()).unwrap(), Some(s));
    }

    #[test]
    fn overwrites_instead_of_merging() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".speculate")).unwrap();
        std::fs::write(
            dir.path().join(".speculate/settings.yml"),
            "custom_key: custom_value\n",
        )
        .unwrap();
        SyncSettings::write(dir.path()).unwrap();
        let raw = std::fs::read_to_string(dir.path().join(".speculate/settings.yml")).unwrap();
        assert!(!raw.contains("custom_key"));
    }

    #[test]
    fn last_update_tracks_latest_write() {
        let dir = TempDir::new().unwrap();
        let t0 = Utc::now();
        let mut last = None;
        for i in 0..3 {
            last = Some(SyncSettings::write_at(dir.path(), t0 + Duration::seconds(i)).unwrap());
        }
        let stored = SyncSettings::load(dir.path()).unwrap().unwrap();
        assert_eq!(stored.last_update, t0 + Duration::seconds(2));
        assert_eq!(Some(stored), last);
    }

    #[test]
    fn last_update_never_goes_backwards() {
        let dir = TempDir::new().unwrap();
        let t0 = Utc::now();
        SyncSettings::write_at(dir.path(), t0).unwrap();
        let s = SyncSettings::write_at(dir.path(), t0 - Duration::minutes(5)).unwrap();
        assert_eq!(s.last_update, t0);
    }

    #[test]
    fn remove_deletes_record() {
        let dir = TempDir::new().unwrap();
        SyncSettings::write(dir.path()).unwrap();
        assert!(SyncSettings::remove(dir.path()).unwrap());
        assert!(SyncSettings::load(dir.path()).unwrap().is_none());
        assert!(!SyncSettings::remove(dir.path()).unwrap());
    }
}
