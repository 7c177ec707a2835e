use crate::output::{
    print_detail, print_error_item, print_header, print_info, print_success, print_warning,
};
use anyhow::Context;
use speculate_core::config::Config;
use speculate_core::header::HeaderOutcome;
use speculate_core::install::{install, InstallReport};
use speculate_core::patterns::RuleFilter;
use speculate_core::paths;
use std::path::Path;

/// `speculate install`: flags replace the corresponding list from
/// `.speculate/config.yml`.
pub fn run(root: &Path, include: Vec<String>, exclude: Vec<String>) -> anyhow::Result<i32> {
    let config = Config::load(root).context("failed to load .speculate/config.yml")?;
    let include = if include.is_empty() {
        config.rules.include
    } else {
        include
    };
    let exclude = if exclude.is_empty() {
        config.rules.exclude
    } else {
        exclude
    };
    let filter = RuleFilter::new(&include, &exclude)?;

    let failed = install_and_report(root, &filter)?;
    if failed > 0 {
        anyhow::bail!("{failed} install step(s) failed");
    }
    Ok(0)
}

/// Filter built from the project config alone.
pub fn config_filter(root: &Path) -> anyhow::Result<RuleFilter> {
    let config = Config::load(root).context("failed to load .speculate/config.yml")?;
    Ok(RuleFilter::new(&config.rules.include, &config.rules.exclude)?)
}

/// Run the install pipeline and print one line per step.
/// Returns the number of failed steps.
pub fn install_and_report(root: &Path, filter: &RuleFilter) -> anyhow::Result<usize> {
    print_header("Installing tool configurations...", root.display());
    let report = install(root, filter)?;
    print_report(&report);

    let failed = report.failures().len();
    println!();
    if failed == 0 {
        print_success("Tool configs installed!");
    } else {
        print_error_item(
            format!("{failed} install step(s) failed"),
            Some("Fix the errors above and run `speculate install` again."),
        );
    }
    println!();
    Ok(failed)
}

fn print_report(report: &InstallReport) {
    match &report.settings {
        Ok(_) => print_success(format!("Updated {}", paths::SETTINGS_FILE)),
        Err(e) => print_error_item(format!("{}: {e}", paths::SETTINGS_FILE), None),
    }

    for (path, result) in &report.headers {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match result {
            Ok(HeaderOutcome::Created) => print_success(format!("Created {name}")),
            Ok(HeaderOutcome::Prepended) => print_success(format!("Updated {name}")),
            Ok(_) => print_info(format!("{name} already configured")),
            Err(e) => print_error_item(format!("{name}: {e}"), None),
        }
    }

    match &report.links {
        Ok(links) if links.rules_missing => {
            print_warning(format!("{}/ not found, skipping Cursor setup", paths::RULES_DIR));
        }
        Ok(links) => {
            let mut msg = format!(
                "Linked {} rules to {}/",
                links.active(),
                paths::CURSOR_RULES_DIR
            );
            if links.skipped > 0 {
                msg.push_str(&format!(" ({} skipped by pattern)", links.skipped));
            }
            print_success(msg);
            if !links.removed.is_empty() {
                print_detail(format!("Removed {} stale link(s)", links.removed.len()));
            }
            for name in &links.blocked {
                print_warning(format!(
                    "{}/{name} exists and is not a link, left in place",
                    paths::CURSOR_RULES_DIR
                ));
            }
        }
        Err(e) => print_error_item(format!("{}: {e}", paths::CURSOR_RULES_DIR), None),
    }
}
