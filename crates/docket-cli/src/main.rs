mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "docket",
    about = "Validate, default and repair the front matter of markdown work items",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .docket/ or .git/)
    #[arg(long, global = true, env = "DOCKET_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter .docket/config.yaml and the status folders
    Init {
        /// Project name (default: root directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Validate every work item against the schema
    Validate {
        /// Reject fields that have no schema entry
        #[arg(long)]
        strict: bool,
    },

    /// Apply defaults and fix recoverable values
    Fix {
        /// Report changes without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Renumber work items that share an ID
    FixIds {
        /// Report changes without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
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
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Validate { strict } => cmd::validate::run(&root, strict, cli.json),
        Commands::Fix { dry_run } => cmd::fix::run(&root, dry_run, cli.json),
        Commands::FixIds { dry_run } => cmd::fix::run_ids(&root, dry_run, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
