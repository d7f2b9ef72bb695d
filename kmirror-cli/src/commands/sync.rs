//! `kmirror sync`: mirror every owned Kaggle notebook into GitHub.

use anyhow::{Context, Result};
use clap::Args;

use kmirror_core::{config, SummaryReport};
use kmirror_remote::{GithubSink, KaggleCli};
use kmirror_renderer::ReadmeRenderer;
use kmirror_sync::{plan, Orchestrator, SyncReporter, TracingReporter};

use crate::console::{self, ConsoleReporter};

/// Arguments for `kmirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// List notebooks and their repository names without downloading or pushing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the summary (or the dry-run plan) as JSON.
    #[arg(long)]
    pub json: bool,

    /// Kaggle CLI program to run (overrides KMIRROR_KAGGLE_BIN).
    #[arg(long, value_name = "PATH")]
    pub kaggle_bin: Option<String>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let kaggle = config::resolve_kaggle().context("cannot resolve Kaggle credentials")?;
        let owner = kaggle.username.clone();
        let source = match self.kaggle_bin.clone() {
            Some(program) => KaggleCli::with_program(program, kaggle),
            None => KaggleCli::new(kaggle),
        };

        if self.dry_run {
            let planned = plan(&source, &owner).context("dry run aborted")?;
            if self.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&planned).context("failed to serialize plan")?
                );
            } else {
                console::print_plan(&owner, &planned);
            }
            return Ok(());
        }

        let github = config::resolve_github().context("cannot resolve GitHub credentials")?;
        let sink = GithubSink::connect(&github).context("failed to authenticate to GitHub")?;
        let template_dir = config::template_dir();
        let renderer = ReadmeRenderer::with_template_dir(template_dir.as_deref())
            .context("failed to load README template")?;

        // Keep stdout clean for JSON consumers.
        let reporter: &dyn SyncReporter = if self.json {
            &TracingReporter
        } else {
            &ConsoleReporter
        };
        if !self.json {
            println!("Kaggle user: {owner} → GitHub user: {}", sink.login());
        }

        let report = Orchestrator::new(&source, &sink, &renderer, reporter)
            .run(&owner)
            .context("sync aborted")?;

        if self.json {
            print_json(&report)?;
        } else {
            console::print_failures(&report);
        }
        Ok(())
    }
}

fn print_json(report: &SummaryReport) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("failed to serialize summary")?
    );
    Ok(())
}
