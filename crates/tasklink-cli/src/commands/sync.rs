//! Sync command - Reconcile Notion tasks with Apple Reminders
//!
//! Provides the `tasklink sync` CLI command which:
//! 1. Loads and validates configuration
//! 2. Creates the Notion, Reminders and link-store adapters
//! 3. Runs the SyncEngine once and displays the report

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use tasklink_notion::NotionTaskSource;
use tasklink_reminders::OsascriptReminderStore;
use tasklink_sync::{JsonLinkStore, SyncEngine, SyncReport, SyncSettings};

use crate::context::CliContext;
use crate::output::{format_duration, plural, print_serialized, OutputFormatter};

#[derive(Debug, Default, Args)]
pub struct SyncCommand {
    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Wires up the adapters, runs one sync and prints the result
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;
        let dry_run = self.dry_run || ctx.dry_run;

        info!(config_path = %ctx.config_path.display(), dry_run, "Loaded configuration");

        let settings = SyncSettings::from_config(&config)?.with_dry_run(dry_run);
        let remote = Arc::new(NotionTaskSource::from_config(&config)?);
        let local = Arc::new(OsascriptReminderStore::from_config(&config.reminders));
        let links = Arc::new(JsonLinkStore::new(&config.state.link_file));

        if dry_run && !ctx.quiet {
            formatter.info("Dry run - no changes will be made");
        }

        let engine = SyncEngine::new(remote, local, links, settings);
        let report = engine.run().await?;

        if ctx.is_json() {
            print_serialized(formatter.as_ref(), &report)?;
        } else {
            print_report(formatter.as_ref(), &report, ctx.quiet);
        }
        Ok(())
    }
}

fn print_report(formatter: &dyn OutputFormatter, report: &SyncReport, quiet: bool) {
    let duration = format_duration(report.duration_ms);

    if report.mutation_count() == 0 && report.errors.is_empty() {
        formatter.success(&format!("Already up to date ({duration})"));
    } else if report.dry_run {
        formatter.success(&format!(
            "Dry run planned {} in {duration}",
            plural(report.mutation_count(), "change")
        ));
    } else {
        formatter.success(&format!("Sync completed in {duration}"));
    }

    if !quiet {
        let l = &report.local;
        let r = &report.remote;
        if report.mutation_count() > 0 {
            formatter.info(&format!(
                "Reminders: {} created, {} updated, {} completed, {} deleted",
                l.created, l.updated, l.completed, l.deleted
            ));
            formatter.info(&format!(
                "Notion:    {} created, {} updated, {} completed, {} canceled",
                r.created, r.updated, r.completed, r.canceled
            ));
        }
        for action in &report.actions {
            let line = match &action.detail {
                Some(detail) => format!("{}: {} ({detail})", action.kind.label(), action.title),
                None => format!("{}: {}", action.kind.label(), action.title),
            };
            formatter.item(if report.dry_run { "~" } else { "\u{2022}" }, &line);
        }
    }

    if !report.errors.is_empty() {
        formatter.warn(&format!(
            "{} occurred; the affected items were skipped",
            plural(report.errors.len() as u64, "error")
        ));
        for err in &report.errors {
            formatter.item("-", err);
        }
    }
}
