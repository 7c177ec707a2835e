use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeculateError {
    #[error("not initialized: no .copier-answers.yml found (run 'speculate init' first)")]
    NotInitialized,

    #[error("no docs/ directory found in {0} (run 'speculate init' first, or copy docs/ here manually)")]
    DocsTreeMissing(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("{path}: {source}")]
    Fs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cancelled")]
    UserCancelled { interrupted: bool },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("template engine '{0}' not found on PATH (install it with 'pipx install copier' or use a local template directory)")]
    EngineNotFound(String),

    #[error("template engine failed: {0}")]
    EngineFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl SpeculateError {
    /// Tag an I/O error with the path it happened on.
    pub fn fs(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            SpeculateError::PermissionDenied(path.to_path_buf())
        } else {
            SpeculateError::Fs {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SpeculateError>;

/// Attach a path to raw `std::io` results.
pub trait FsContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> FsContext<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| SpeculateError::fs(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_keep_the_path() {
        let err = SpeculateError::fs(
            Path::new("/x/CLAUDE.md"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, SpeculateError::PermissionDenied(ref p) if p == Path::new("/x/CLAUDE.md")));
        assert_eq!(err.to_string(), "permission denied: /x/CLAUDE.md");
    }

    #[test]
    fn other_errors_are_tagged() {
        let err = SpeculateError::fs(
            Path::new("docs"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.to_string().starts_with("docs: "));
    }
}
