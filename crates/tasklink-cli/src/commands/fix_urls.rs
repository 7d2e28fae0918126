//! Fix-urls command - Backfill Notion URLs onto tagged reminders
//!
//! Useful after importing reminders by hand, or when the URL write-back
//! of a previous sync failed: each tagged reminder without a URL is matched
//! to an open Notion task with the same title.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use tasklink_notion::NotionTaskSource;
use tasklink_reminders::OsascriptReminderStore;
use tasklink_sync::{BackfillReport, SyncSettings, UrlBackfill};

use crate::context::CliContext;
use crate::output::{format_duration, plural, print_serialized, OutputFormatter};

#[derive(Debug, Default, Args)]
pub struct FixUrlsCommand {
    /// Show which reminders would be linked without writing
    #[arg(long)]
    pub dry_run: bool,
}

impl FixUrlsCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        let settings =
            SyncSettings::from_config(&config)?.with_dry_run(self.dry_run || ctx.dry_run);
        let remote = Arc::new(NotionTaskSource::from_config(&config)?);
        let local = Arc::new(OsascriptReminderStore::from_config(&config.reminders));

        let report = UrlBackfill::new(remote, local, &settings).run().await?;

        if ctx.is_json() {
            print_serialized(formatter.as_ref(), &report)?;
        } else {
            print_backfill(formatter.as_ref(), &report, ctx.quiet);
        }
        Ok(())
    }
}

fn print_backfill(formatter: &dyn OutputFormatter, report: &BackfillReport, quiet: bool) {
    if report.candidates == 0 {
        formatter.success("No tagged reminders are missing a URL");
        return;
    }

    let verb = if report.dry_run { "Would link" } else { "Linked" };
    formatter.success(&format!(
        "{verb} {} of {} in {}",
        report.fixed,
        plural(report.candidates as u64, "reminder"),
        format_duration(report.duration_ms)
    ));

    if !quiet {
        for action in &report.actions {
            formatter.item("\u{2022}", &action.title);
        }
        if !report.unmatched.is_empty() {
            formatter.info(&format!(
                "{} without a single matching Notion task:",
                plural(report.unmatched.len() as u64, "reminder")
            ));
            for title in &report.unmatched {
                formatter.item("?", title);
            }
        }
    }

    for err in &report.errors {
        formatter.warn(err);
    }
}
