use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DOCS_DIR: &str = "docs";
pub const RULES_DIR: &str = "docs/general/agent-rules";
pub const SPECULATE_DIR: &str = ".speculate";
pub const CURSOR_DIR: &str = ".cursor";
pub const CURSOR_RULES_DIR: &str = ".cursor/rules";

pub const ANSWERS_FILE: &str = ".copier-answers.yml";
pub const SETTINGS_FILE: &str = ".speculate/settings.yml";
pub const CONFIG_FILE: &str = ".speculate/config.yml";

pub const CLAUDE_MD: &str = "CLAUDE.md";
pub const AGENTS_MD: &str = "AGENTS.md";

pub const DEVELOPMENT_MD: &str = "docs/development.md";
pub const DEVELOPMENT_SAMPLE_MD: &str = "docs/project/development.sample.md";

/// Extension Cursor requires for rule files.
pub const CURSOR_RULE_EXT: &str = "mdc";

/// Paths (relative to the project root) the template never overwrites once present.
pub const PROTECTED_PATTERNS: &[&str] = &[
    "docs/development.md",
    "docs/project/specs/*/*",
    "docs/project/architecture/*/*",
    "docs/project/research/*/*",
];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn docs_dir(root: &Path) -> PathBuf {
    root.join(DOCS_DIR)
}

pub fn rules_dir(root: &Path) -> PathBuf {
    root.join(RULES_DIR)
}

pub fn speculate_dir(root: &Path) -> PathBuf {
    root.join(SPECULATE_DIR)
}

pub fn cursor_dir(root: &Path) -> PathBuf {
    root.join(CURSOR_DIR)
}

pub fn cursor_rules_dir(root: &Path) -> PathBuf {
    root.join(CURSOR_RULES_DIR)
}

pub fn answers_path(root: &Path) -> PathBuf {
    root.join(ANSWERS_FILE)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn claude_md_path(root: &Path) -> PathBuf {
    root.join(CLAUDE_MD)
}

pub fn agents_md_path(root: &Path) -> PathBuf {
    root.join(AGENTS_MD)
}

pub fn development_md_path(root: &Path) -> PathBuf {
    root.join(DEVELOPMENT_MD)
}

pub fn development_sample_path(root: &Path) -> PathBuf {
    root.join(DEVELOPMENT_SAMPLE_MD)
}

/// Both managed marker files, in install order.
pub fn managed_files(root: &Path) -> [PathBuf; 2] {
    [claude_md_path(root), agents_md_path(root)]
}

/// `/`-separated form of a relative path, used for pattern matching and records.
pub fn to_slash(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative path from directory `from` to `to`. Both must be absolute or both relative
/// to the same base.
pub fn relative_to(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for c in &to[common..] {
        rel.push(c.as_os_str());
    }
    rel
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
