use super::install::{config_filter, install_and_report};
use crate::output::{
    fmt_count, fmt_size, print_detail, print_header, print_note, print_success,
};
use crate::prompt::confirm;
use anyhow::Context;
use colored::Colorize;
use speculate_core::config::Config;
use speculate_core::engine::{self, CopyRequest, EngineKind};
use speculate_core::install::seed_project_file;
use speculate_core::{io, paths};
use std::path::{Path, PathBuf};

pub struct InitArgs {
    pub destination: Option<PathBuf>,
    pub force: bool,
    pub template: Option<String>,
    pub git_ref: Option<String>,
    pub engine: Option<EngineKind>,
}

/// `speculate init`: copy the template, seed the project file, then install.
pub fn run(root: &Path, args: InitArgs) -> anyhow::Result<i32> {
    let dst = match args.destination {
        Some(d) if d.is_absolute() => d,
        Some(d) => std::env::current_dir()?.join(d),
        None => root.to_path_buf(),
    };
    let docs = paths::docs_dir(&dst);

    print_header("Initializing Speculate docs in:", dst.display());
    io::ensure_writable(&dst)?;

    if docs.exists() && !args.force {
        print_note(
            format!("{} already exists", docs.display()),
            "Use `speculate update` to preserve local changes.",
        );
        confirm("Reinitialize anyway?", false)?;
    }

    print_header("Docs will be copied to:", format!("{}/", docs.display()));
    if !args.force {
        confirm("Proceed?", true)?;
    }

    let config = Config::load(&dst).context("failed to load .speculate/config.yml")?;
    let request = CopyRequest {
        source: args.template.unwrap_or(config.template),
        destination: dst.clone(),
        git_ref: args.git_ref.unwrap_or(config.git_ref),
        overwrite: args.force,
    };
    io::ensure_dir(&dst)?;
    let reference = engine::copy(args.engine.unwrap_or(config.engine), &request)
        .with_context(|| format!("failed to copy template {}", request.source))?;

    if seed_project_file(&dst)? {
        print_success(format!(
            "Created {} from template",
            paths::DEVELOPMENT_MD
        ));
    }

    let (files, bytes) = io::dir_stats(&docs)?;
    println!();
    print_success(format!(
        "Docs installed ({}, {})",
        fmt_count(files, "file"),
        fmt_size(bytes)
    ));
    print_detail(format!(
        "Template {} at {}",
        reference.source_uri,
        reference.version_or_unknown()
    ));

    let failed = install_and_report(&dst, &config_filter(&dst)?)?;

    println!("{}", "Required next step:".bold().yellow());
    print_detail(format!(
        "Customize {} with your project-specific setup.",
        paths::DEVELOPMENT_MD
    ));
    println!();
    println!("Other commands:");
    print_detail("speculate status     # Check current status");
    print_detail("speculate update     # Pull future updates");
    println!();

    if failed > 0 {
        anyhow::bail!("{failed} install step(s) failed");
    }
    Ok(0)
}
