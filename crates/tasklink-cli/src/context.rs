//! Settings shared by every command

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use tasklink_core::config::Config;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global flags resolved once in `main`
#[derive(Debug, Clone)]
pub struct CliContext {
    pub format: OutputFormat,
    pub config_path: PathBuf,
    pub quiet: bool,
    /// Top-level `--dry-run`, applied when no subcommand is given
    pub dry_run: bool,
}

impl CliContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json())
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Loads the config file plus environment overrides without validating
    pub fn resolve_config(&self) -> Result<Config> {
        Config::resolve(&self.config_path).with_context(|| {
            format!("Failed to load configuration from {}", self.config_path.display())
        })
    }

    /// Loads the configuration and rejects it if any field is invalid
    pub fn load_config(&self) -> Result<Config> {
        let config = self.resolve_config()?;
        let errors = config.validate();
        if !errors.is_empty() {
            let lines: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
            bail!(
                "Invalid configuration ({}):\n{}",
                self.config_path.display(),
                lines.join("\n")
            );
        }
        Ok(config)
    }
}
