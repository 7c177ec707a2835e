use crate::output::{print_error_item, print_header, print_info, print_success};
use crate::prompt::confirm;
use speculate_core::header::HeaderOutcome;
use speculate_core::install::uninstall;
use speculate_core::paths;
use std::path::Path;

/// `speculate uninstall`: undo `install`. The docs tree, the answers record
/// and the project config are kept.
pub fn run(root: &Path, force: bool) -> anyhow::Result<i32> {
    print_header("Removing speculate tool configurations from:", root.display());
    if !force {
        confirm(
            "Remove the managed headers, rule links and install settings?",
            false,
        )?;
    }

    let report = uninstall(root);

    for (path, result) in &report.headers {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match result {
            Ok(HeaderOutcome::Removed) => print_success(format!("Removed header from {name}")),
            Ok(HeaderOutcome::Missing) => print_info(format!("{name} not present")),
            Ok(_) => print_info(format!("{name} has no speculate header")),
            Err(e) => print_error_item(format!("{name}: {e}"), None),
        }
    }

    match &report.links {
        Ok(removed) if removed.is_empty() => {
            print_info(format!("No rule links in {}/", paths::CURSOR_RULES_DIR))
        }
        Ok(removed) => print_success(format!(
            "Removed {} rule link(s) from {}/",
            removed.len(),
            paths::CURSOR_RULES_DIR
        )),
        Err(e) => print_error_item(format!("{}: {e}", paths::CURSOR_RULES_DIR), None),
    }

    match &report.settings {
        Ok(true) => print_success(format!("Removed {}", paths::SETTINGS_FILE)),
        Ok(false) => print_info(format!("{} not found", paths::SETTINGS_FILE)),
        Err(e) => print_error_item(format!("{}: {e}", paths::SETTINGS_FILE), None),
    }
    println!();

    let failed = report.failures().len();
    if failed > 0 {
        anyhow::bail!("{failed} uninstall step(s) failed");
    }
    print_success("Uninstalled. docs/ was left in place.");
    println!();
    Ok(0)
}
