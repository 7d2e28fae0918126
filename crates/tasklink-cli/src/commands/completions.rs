//! Shell completions generation command
//!
//! Usage: `tasklink completions zsh > ~/.zfunc/_tasklink`

use std::io;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

use crate::context::CliContext;

/// Arguments for the completions subcommand
#[derive(Debug, clap::Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Prints completions for the chosen shell to stdout
    pub async fn execute(&self, _ctx: &CliContext) -> Result<()> {
        let mut cmd = crate::Cli::command();
        clap_complete::generate(self.shell, &mut cmd, "tasklink", &mut io::stdout());
        Ok(())
    }
}
