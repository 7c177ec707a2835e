mod cmd;
mod output;
mod prompt;
mod root;

use clap::{Parser, Subcommand};
use speculate_core::engine::EngineKind;
use speculate_core::SpeculateError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "speculate",
    about = "Install a shared docs tree into a project and keep agent tool configs in sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .copier-answers.yml, .speculate/ or .git/)
    #[arg(long, global = true, env = "SPECULATE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the docs template into a project, then run install
    Init {
        /// Target directory (default: the project root)
        destination: Option<PathBuf>,

        /// Overwrite existing files without confirmation
        #[arg(long, visible_alias = "overwrite")]
        force: bool,

        /// Template source (a git URL, gh:owner/repo, or a local directory)
        #[arg(long)]
        template: Option<String>,

        /// Template version to copy (tag, branch or commit)
        #[arg(long = "ref")]
        git_ref: Option<String>,

        /// Template engine to use
        #[arg(long)]
        engine: Option<EngineKind>,
    },

    /// Pull upstream template changes into docs/, then run install
    Update,

    /// Write settings, managed headers and rule links (idempotent)
    Install {
        /// Only link rule files matching this pattern (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Skip rule files matching this pattern (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Show template version, install state and required files
    Status,

    /// Remove everything install created (docs/ is left alone)
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init {
            destination,
            force,
            template,
            git_ref,
            engine,
        } => cmd::init::run(
            &root,
            cmd::init::InitArgs {
                destination,
                force,
                template,
                git_ref,
                engine,
            },
        ),
        Commands::Update => cmd::update::run(&root),
        Commands::Install { include, exclude } => cmd::install::run(&root, include, exclude),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Uninstall { force } => cmd::uninstall::run(&root, force),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if let Some(SpeculateError::UserCancelled { interrupted }) =
                e.downcast_ref::<SpeculateError>()
            {
                output::print_cancelled();
                std::process::exit(if *interrupted { 130 } else { 0 });
            }
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
