//! Terminal rendering: live progress, the run summary and the dry-run plan.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use kmirror_core::SummaryReport;
use kmirror_sync::{PlannedSync, SyncEvent, SyncReporter};

/// Prints one colored line per progress event.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl SyncReporter for ConsoleReporter {
    fn report(&self, event: &SyncEvent) {
        match event {
            SyncEvent::RunStarted { total } => {
                println!("Found {total} notebook(s)");
            }
            SyncEvent::NotebookStarted {
                index,
                total,
                title,
                slug,
            } => {
                println!(
                    "{} {title} {} {slug}",
                    format!("[{index}/{total}]").bold(),
                    "→".bright_black()
                );
            }
            SyncEvent::NotebookSucceeded {
                full_identifier,
                created,
                ..
            } => {
                let verb = if *created { "created" } else { "updated" };
                println!("  {} {verb} {full_identifier}", "✓".green());
            }
            SyncEvent::NotebookFailed { kind, reason, .. } => {
                println!("  {} {kind}: {reason}", "✗".red());
            }
            SyncEvent::RunFinished { total, succeeded } => {
                let line = format!("Successfully synced: {succeeded}/{total}");
                if succeeded == total {
                    println!("\n{}", line.green().bold());
                } else {
                    println!("\n{}", line.yellow().bold());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "notebook")]
    title: String,
    #[tabled(rename = "repository")]
    slug: String,
    #[tabled(rename = "outcome")]
    outcome: String,
    #[tabled(rename = "detail")]
    detail: String,
}

/// Table of failed notebooks; nothing when every notebook succeeded.
pub fn print_failures(report: &SummaryReport) {
    let rows: Vec<FailureRow> = report
        .results
        .iter()
        .filter(|r| !r.outcome.is_success())
        .map(|r| FailureRow {
            title: r.title.clone(),
            slug: r.slug.to_string(),
            outcome: r.outcome.to_string(),
            detail: r.detail.clone().unwrap_or_default(),
        })
        .collect();
    if rows.is_empty() {
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("Failed notebooks are retried on the next run.");
}

// ---------------------------------------------------------------------------
// Dry-run plan
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "notebook")]
    title: String,
    #[tabled(rename = "kaggle")]
    kernel_ref: String,
    #[tabled(rename = "repository")]
    slug: String,
    #[tabled(rename = "note")]
    note: String,
}

pub fn print_plan(owner: &str, planned: &[PlannedSync]) {
    println!("[dry-run] {} notebook(s) for {owner}", planned.len());
    if planned.is_empty() {
        println!("No notebooks found.");
        return;
    }

    let rows: Vec<PlanRow> = planned
        .iter()
        .map(|p| PlanRow {
            title: p.title.clone(),
            kernel_ref: p.kernel_ref.clone(),
            slug: p.slug.to_string(),
            note: if p.collides {
                "collides".to_string()
            } else {
                String::new()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let collisions = planned.iter().filter(|p| p.collides).count();
    if collisions > 0 {
        println!(
            "{} {collisions} notebook(s) share a repository name; \
             the last one listed wins the README.",
            "!".yellow().bold()
        );
    }
}
