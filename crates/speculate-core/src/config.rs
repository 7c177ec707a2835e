use crate::engine::EngineKind;
use crate::error::{FsContext, Result};
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TEMPLATE: &str = "gh:jlevy/speculate";
pub const DEFAULT_REF: &str = "HEAD";

// ---------------------------------------------------------------------------
// RulesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Optional, user-owned project config in `.speculate/config.yml`.
/// Command-line flags take precedence over every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default)]
    pub rules: RulesConfig,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_ref() -> String {
    DEFAULT_REF.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: default_template(),
            git_ref: default_ref(),
            engine: EngineKind::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl Config {
    /// Load the project config, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path).at(&path)?;
        let cfg: Option<Config> = serde_yaml::from_str(&data)?;
        Ok(cfg.unwrap_or_default())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&paths::config_path(root), data.as_bytes())
    }
}
