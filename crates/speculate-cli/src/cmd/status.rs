use crate::output::{
    fmt_count, fmt_size, print_detail, print_error_item, print_header, print_info, print_json,
    print_missing, print_success, print_warning,
};
use speculate_core::paths;
use speculate_core::status::StatusReport;
use std::path::Path;

/// `speculate status`: exits 1 when the required project file is missing.
pub fn run(root: &Path, json: bool) -> anyhow::Result<i32> {
    let status = StatusReport::collect(root)?;
    let code = if status.has_errors() { 1 } else { 0 };

    if json {
        print_json(&status)?;
        return Ok(code);
    }

    print_header("Speculate Status", root.display());

    match &status.template {
        Some(t) => {
            print_success(format!("Template version: {}", t.version_or_unknown()));
            print_detail(format!("Source: {}", t.source_uri));
        }
        None => print_missing(format!("No {} (not initialized)", paths::ANSWERS_FILE)),
    }

    match &status.settings {
        Some(s) => {
            print_success(format!(
                "Last install: {} (CLI {})",
                s.last_update.to_rfc3339(),
                s.last_cli_version
            ));
            if let Some(docs) = &s.last_docs_version {
                print_detail(format!("Docs version at install: {docs}"));
            }
        }
        None => print_info(format!("{} not found", paths::SETTINGS_FILE)),
    }

    match &status.docs {
        Some(d) => print_success(format!(
            "{}/ exists ({}, {})",
            paths::DOCS_DIR,
            fmt_count(d.files, "file"),
            fmt_size(d.bytes)
        )),
        None => print_missing(format!("{}/ not found", paths::DOCS_DIR)),
    }

    if status.development_md {
        print_success(format!("{} exists", paths::DEVELOPMENT_MD));
    } else {
        print_error_item(
            format!("{} missing (required!)", paths::DEVELOPMENT_MD),
            Some("Create this file using docs/project/development.sample.md as a template."),
        );
    }

    for file in &status.managed_files {
        match (file.present, file.has_header) {
            (true, true) => print_success(format!("{} exists", file.name)),
            (true, false) => print_warning(format!(
                "{} exists without the speculate header (run `speculate install`)",
                file.name
            )),
            (false, _) => print_info(format!("{} not configured", file.name)),
        }
    }

    if status.cursor_rules {
        print_success(format!(
            "{}/ exists ({} linked)",
            paths::CURSOR_RULES_DIR,
            fmt_count(status.rule_links, "rule")
        ));
    } else {
        print_info(format!("{}/ not configured", paths::CURSOR_RULES_DIR));
    }

    if !status.conflicts.is_empty() {
        print_warning(format!(
            "{} with unresolved conflict markers:",
            fmt_count(status.conflicts.len(), "file")
        ));
        for f in &status.conflicts {
            print_detail(f);
        }
    }

    println!();
    Ok(code)
}
