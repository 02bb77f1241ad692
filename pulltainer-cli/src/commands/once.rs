//! `pulltainer once`: a single pass with a per-stack report.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use pulltainer_daemon::run_once;
use pulltainer_reconcile::{PassReport, StackOutcome, StackResult};

use super::config::ConfigArgs;

/// Arguments for `pulltainer once`.
#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Emit the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl OnceArgs {
    pub fn run(self, config: &ConfigArgs) -> Result<()> {
        let settings = config.settings()?;
        let report = run_once(&settings).context("reconciliation pass failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize pass report")?
            );
            return Ok(());
        }

        print_table(&report, settings.dry_run);
        Ok(())
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "STACK")]
    name: String,
    #[tabled(rename = "OUTCOME")]
    outcome: &'static str,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl From<&StackResult> for OutcomeRow {
    fn from(result: &StackResult) -> Self {
        let (outcome, detail) = match &result.outcome {
            StackOutcome::Redeployed => ("REDEPLOYED", String::new()),
            StackOutcome::WouldRedeploy => ("WOULD REDEPLOY", "dry run".to_string()),
            StackOutcome::Skipped(reason) if reason.is_failure() => ("FAILED", reason.to_string()),
            StackOutcome::Skipped(reason) => ("SKIPPED", reason.to_string()),
        };
        Self {
            id: result.id.0,
            name: result.name.clone(),
            outcome,
            detail,
        }
    }
}

fn print_table(report: &PassReport, dry_run: bool) {
    let redeployed = format!("{} redeployed", report.redeployed());
    let failed = format!("{} failed", report.failed());
    println!(
        "Pulltainer v{} | {} stacks | {} | {} skipped | {} | {} ms{}",
        env!("CARGO_PKG_VERSION"),
        report.stacks.len(),
        redeployed.green().bold(),
        report.skipped(),
        if report.failed() > 0 {
            failed.red().bold()
        } else {
            failed.normal()
        },
        report.elapsed.as_millis(),
        if dry_run { " | dry run" } else { "" },
    );

    if report.stacks.is_empty() {
        println!("No stacks found.");
        return;
    }

    let rows: Vec<OutcomeRow> = report.stacks.iter().map(OutcomeRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
