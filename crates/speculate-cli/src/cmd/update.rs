use super::install::{config_filter, install_and_report};
use crate::output::{print_detail, print_header, print_info, print_success, print_warning};
use anyhow::Context;
use speculate_core::answers::TemplateReference;
use speculate_core::config::Config;
use speculate_core::engine::{self, find_conflicts};
use speculate_core::SpeculateError;
use std::path::Path;

/// `speculate update`: merge upstream template changes, then reinstall.
///
/// Merge conflicts are written inline and reported, never treated as failure.
pub fn run(root: &Path) -> anyhow::Result<i32> {
    if !TemplateReference::exists(root) {
        return Err(SpeculateError::NotInitialized.into());
    }
    let config = Config::load(root).context("failed to load .speculate/config.yml")?;

    print_header("Updating docs from upstream template...", root.display());

    let stale = find_conflicts(root)?;
    if !stale.is_empty() {
        print_warning(format!(
            "{} file(s) still hold conflict markers from a previous update",
            stale.len()
        ));
        for f in &stale {
            print_detail(f);
        }
    }

    let report = engine::update(config.engine, root).context("template update failed")?;

    for (label, files) in [
        ("Added", &report.added),
        ("Updated", &report.updated),
        ("Removed", &report.removed),
    ] {
        if !files.is_empty() {
            print_success(format!("{label} {} file(s)", files.len()));
        }
    }
    if !report.kept_local.is_empty() {
        print_info(format!(
            "Kept local changes in {} file(s)",
            report.kept_local.len()
        ));
    }
    if !report.protected.is_empty() {
        print_info(format!(
            "Left {} project-owned file(s) untouched",
            report.protected.len()
        ));
    }
    if !report.conflicts.is_empty() {
        print_warning(format!(
            "{} conflict(s) marked inline; resolve them by hand:",
            report.conflicts.len()
        ));
        for f in &report.conflicts {
            print_detail(f);
        }
    }

    println!();
    print_success(format!(
        "Docs updated successfully! (template version {})",
        report.reference.version_or_unknown()
    ));

    let failed = install_and_report(root, &config_filter(root)?)?;
    if failed > 0 {
        anyhow::bail!("{failed} install step(s) failed");
    }
    Ok(0)
}
