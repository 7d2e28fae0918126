//! tasklink CLI - Two-way sync between Notion tasks and Apple Reminders
//!
//! Provides commands for:
//! - Running a sync (the default when no command is given)
//! - Backfilling missing reminder URLs
//! - Finding the Notion user id to configure
//! - Viewing and validating configuration

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tasklink_core::config::Config;

mod commands;
mod context;
mod output;

use commands::{
    completions::CompletionsCommand, config::ConfigCommand, fix_urls::FixUrlsCommand,
    sync::SyncCommand, whoami::WhoamiCommand,
};
use context::CliContext;
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tasklink",
    version,
    about = "Two-way sync between a Notion task database and Apple Reminders"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synchronize Notion tasks and reminders (default)
    Sync(SyncCommand),
    /// Write missing Notion URLs onto tagged reminders, matching by title
    FixUrls(FixUrlsCommand),
    /// Show the integration identity and the Notion users it can see
    Whoami(WhoamiCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Picks the log filter: `RUST_LOG`, then `-v`, then `logging.level`
fn env_filter(verbose: u8, quiet: bool, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match (verbose, quiet) {
        (0, true) => "warn",
        (0, false) => configured,
        (1, _) => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing(cli: &Cli, config_path: &std::path::Path) {
    // Fall back to defaults here; commands report a broken file themselves
    let logging = Config::resolve(config_path).unwrap_or_default().logging;
    let filter = env_filter(cli.verbose, cli.quiet, &logging.level);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    init_tracing(&cli, &config_path);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext {
        format,
        config_path,
        quiet: cli.quiet,
        dry_run: cli.dry_run,
    };

    let result = match cli.command {
        None => SyncCommand::default().execute(&ctx).await,
        Some(Commands::Sync(cmd)) => cmd.execute(&ctx).await,
        Some(Commands::FixUrls(cmd)) => cmd.execute(&ctx).await,
        Some(Commands::Whoami(cmd)) => cmd.execute(&ctx).await,
        Some(Commands::Config(cmd)) => cmd.execute(&ctx).await,
        Some(Commands::Completions(cmd)) => cmd.execute(&ctx).await,
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            get_formatter(cli.json).error(&format!("{e:#}"));
            Ok(ExitCode::FAILURE)
        }
    }
}
