//! Config command - View and manage the tasklink configuration
//!
//! Subcommands:
//! - `show` prints the effective configuration with secrets redacted
//! - `set` updates one value by dotted key and saves the file
//! - `validate` loads the file plus environment and reports every problem
//! - `init` writes a starter file

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tracing::info;

use tasklink_core::config::{Config, VALID_CONFLICT_STRATEGIES};

use crate::context::CliContext;
use crate::output::plural;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (file plus environment)
    Show,
    /// Set a configuration value, e.g. `reminders.list_name Work`
    Set {
        /// Dotted configuration key
        key: String,
        /// New value
        value: String,
    },
    /// Validate the configuration
    Validate,
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

const REDACTED: &str = "********";

/// Keys accepted by `config set`, with a short description
const SETTABLE_KEYS: &[(&str, &str)] = &[
    ("notion.database_id", "Task database id"),
    ("notion.user_id", "Assignee whose tasks are synced"),
    ("notion.api_base_url", "Notion API base URL"),
    ("notion.api_version", "Notion-Version header"),
    ("properties.title", "Title property name"),
    ("properties.assignee", "Assignee property name"),
    ("properties.status", "Status property name"),
    ("properties.due_date", "Due date property name"),
    ("properties.customer", "Customer relation property name"),
    ("properties.task_type", "Task type property name"),
    ("properties.last_updated", "Last edit time property name"),
    ("statuses.done", "Status for finished tasks"),
    ("statuses.canceled", "Status for abandoned tasks"),
    ("statuses.initial", "Status for tasks created from reminders"),
    ("filter.type_exclude", "Task type to ignore, or 'none'"),
    ("reminders.list_name", "Reminders list to sync"),
    ("reminders.tag", "Tag that opts a reminder into sync"),
    ("reminders.access_timeout_secs", "Seconds to wait for Reminders access"),
    ("reminders.osascript_path", "Path to osascript"),
    ("state.link_file", "Link table location"),
    ("conflicts.strategy", "timestamp|prefer_local|prefer_remote"),
    ("logging.level", "trace|debug|info|warn|error"),
    ("logging.format", "text|json"),
];

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => show(ctx),
            ConfigCommand::Set { key, value } => set(ctx, key, value),
            ConfigCommand::Validate => validate(ctx),
            ConfigCommand::Init { force } => init(ctx, *force),
        }
    }
}

fn show(ctx: &CliContext) -> Result<()> {
    let formatter = ctx.formatter();
    let config = redacted(ctx.resolve_config()?);

    info!(config_path = %ctx.config_path.display(), "Showing configuration");

    if ctx.is_json() {
        let json = serde_json::to_value(&config)
            .context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
    if !ctx.config_path.exists() {
        formatter.info("File not found; showing defaults plus environment");
    }
    formatter.info("");
    let yaml =
        serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
    for line in yaml.lines() {
        formatter.info(line);
    }
    Ok(())
}

fn redacted(mut config: Config) -> Config {
    if !config.notion.api_key.is_empty() {
        config.notion.api_key = REDACTED.to_string();
    }
    config
}

fn set(ctx: &CliContext, key: &str, value: &str) -> Result<()> {
    let formatter = ctx.formatter();
    let path = &ctx.config_path;

    // Edit the file alone so environment overrides are never persisted
    let mut config = if path.exists() {
        Config::load(path).with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        Config::default()
    };

    if let Err(e) = apply_config_value(&mut config, key, value) {
        if !ctx.is_json() {
            formatter.error(&e.to_string());
            formatter.info("");
            formatter.info("Supported keys:");
            for (name, about) in SETTABLE_KEYS {
                formatter.info(&format!("  {name:<32} - {about}"));
            }
        }
        return Err(e);
    }

    // Fields outside this key may still come from the environment
    let problems: Vec<String> = config
        .validate()
        .into_iter()
        .filter(|e| e.field == key)
        .map(|e| e.message)
        .collect();
    if !problems.is_empty() {
        bail!("Invalid value for '{key}': {}", problems.join("; "));
    }

    save(path, &config)?;
    info!(key = %key, value = %value, "Configuration value updated");

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "key": key,
            "value": value,
            "config_path": path.display().to_string(),
        }));
    } else {
        formatter.success(&format!("Set {key} = {value}"));
        formatter.info(&format!("Saved to {}", path.display()));
    }
    Ok(())
}

fn validate(ctx: &CliContext) -> Result<()> {
    let formatter = ctx.formatter();
    let path = &ctx.config_path;
    let config = ctx.resolve_config()?;

    info!(config_path = %path.display(), "Validating configuration");

    let errors = config.validate();
    if ctx.is_json() {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": path.display().to_string(),
            "file_exists": path.exists(),
            "errors": messages,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", path.display()));
    } else {
        formatter.error(&format!("Configuration has {}:", plural(errors.len() as u64, "error")));
        formatter.info(&format!("File: {}", path.display()));
        formatter.info("");
        for error in &errors {
            formatter.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    if !errors.is_empty() {
        bail!("Configuration is invalid");
    }
    Ok(())
}

fn init(ctx: &CliContext, force: bool) -> Result<()> {
    let formatter = ctx.formatter();
    let path = &ctx.config_path;

    if !write_default_config(path, force)? {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    if ctx.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": true,
            "config_path": path.display().to_string(),
        }));
    } else {
        formatter.success(&format!("Wrote {}", path.display()));
        formatter.info("Fill in notion.database_id and notion.user_id,");
        formatter.info("then export NOTION_API_KEY and run `tasklink sync --dry-run`.");
    }
    Ok(())
}

/// Writes the default configuration to `path`.
///
/// Returns `false` without touching the file when it exists and `force`
/// is not set.
fn write_default_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    save(path, &Config::default())?;
    Ok(true)
}

fn save(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Applies a dotted `key = value` pair to `config`
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let text = || value.to_string();

    match key {
        "notion.api_key" => {
            bail!("Refusing to store the API key in the config file; export NOTION_API_KEY instead")
        }
        "notion.database_id" => config.notion.database_id = text(),
        "notion.user_id" => config.notion.user_id = text(),
        "notion.api_base_url" => config.notion.api_base_url = text(),
        "notion.api_version" => config.notion.api_version = text(),

        "properties.title" => config.properties.title = text(),
        "properties.assignee" => config.properties.assignee = text(),
        "properties.status" => config.properties.status = text(),
        "properties.due_date" => config.properties.due_date = text(),
        "properties.customer" => config.properties.customer = text(),
        "properties.task_type" => config.properties.task_type = text(),
        "properties.last_updated" => config.properties.last_updated = text(),

        "statuses.done" => config.statuses.done = text(),
        "statuses.canceled" => config.statuses.canceled = text(),
        "statuses.initial" => config.statuses.initial = text(),

        "filter.type_exclude" => {
            config.filter.type_exclude = match value {
                "" | "none" => None,
                _ => Some(text()),
            };
        }

        "reminders.list_name" => config.reminders.list_name = text(),
        "reminders.tag" => config.reminders.tag = text(),
        "reminders.access_timeout_secs" => {
            config.reminders.access_timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for reminders.access_timeout_secs")?;
        }
        "reminders.osascript_path" => config.reminders.osascript_path = PathBuf::from(value),

        "state.link_file" => config.state.link_file = PathBuf::from(value),

        "conflicts.strategy" => {
            if !VALID_CONFLICT_STRATEGIES.contains(&value) {
                bail!(
                    "Unknown strategy '{value}', expected one of: {}",
                    VALID_CONFLICT_STRATEGIES.join(", ")
                );
            }
            config.conflicts.strategy = text();
        }

        "logging.level" => config.logging.level = text(),
        "logging.format" => config.logging.format = text(),

        _ => bail!("Unknown configuration key: '{key}'"),
    }

    Ok(())
}
