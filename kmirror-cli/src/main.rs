//! kmirror: mirror Kaggle notebooks into GitHub repositories.
//!
//! # Usage
//!
//! ```text
//! kmirror sync [--dry-run] [--json] [--kaggle-bin <path>]
//! kmirror slug <title>...
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`).

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{slug::SlugArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "kmirror",
    version,
    about = "Mirror your Kaggle notebooks into one GitHub repository each",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download every notebook you own on Kaggle and push it to GitHub.
    Sync(SyncArgs),

    /// Print the repository name each title would map to.
    Slug(SlugArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Slug(args) => args.run(),
    }
}
