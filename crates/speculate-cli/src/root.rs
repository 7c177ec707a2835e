use speculate_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `SPECULATE_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.copier-answers.yml` or `.speculate/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(&cwd)
}

fn resolve_from(start: &Path) -> PathBuf {
    let is_project = |dir: &Path| {
        paths::answers_path(dir).is_file() || paths::speculate_dir(dir).is_dir()
    };
    if let Some(dir) = find_upward(start, is_project) {
        return dir;
    }
    if let Some(dir) = find_upward(start, |dir| dir.join(".git").is_dir()) {
        return dir;
    }
    start.to_path_buf()
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|d| found(d)).map(Path::to_path_buf)
}
