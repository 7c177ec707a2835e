//! Include/exclude filtering of rule files by bare filename.
//!
//! Patterns are matched against file names only, never full paths, so `**`
//! collapses to `*` and a leading `**/` is dropped. A pattern naming a
//! directory (`docs/*`) matches no file name.

use crate::error::{Result, SpeculateError};
use glob::Pattern;

#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

fn compile(raw: &str) -> Result<Pattern> {
    // "**/*.md" means "any .md file"; a bare filename has no directory part.
    let mut normalized = raw;
    while let Some(rest) = normalized.strip_prefix("**/") {
        normalized = rest;
    }
    let mut normalized = normalized.to_string();
    while normalized.contains("**") {
        normalized = normalized.replace("**", "*");
    }
    Pattern::new(&normalized).map_err(|e| SpeculateError::InvalidPattern {
        pattern: raw.to_string(),
        reason: e.msg.to_string(),
    })
}

impl RuleFilter {
    pub fn new<I, E>(include: I, exclude: E) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            include: include
                .into_iter()
                .map(|p| compile(p.as_ref()))
                .collect::<Result<_>>()?,
            exclude: exclude
                .into_iter()
                .map(|p| compile(p.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    /// Filter that admits every file.
    pub fn all() -> Self {
        Self::default()
    }

    /// True if `filename` matches at least one include pattern (or there are
    /// none) and no exclude pattern.
    pub fn matches(&self, filename: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|p| p.matches(filename));
        included && !self.exclude.iter().any(|p| p.matches(filename))
    }
}
