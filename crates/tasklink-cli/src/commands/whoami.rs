//! Whoami command - Locate the Notion user id to configure
//!
//! Lists the integration identity and every user it can see, marking the
//! one that matches `notion.user_id`. Only the API key needs to be set.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use tasklink_core::config::{Config, ENV_API_KEY, ENV_USER_ID};
use tasklink_notion::client::NotionClient;
use tasklink_notion::users::{Directory, NotionUser};

use crate::context::CliContext;
use crate::output::{print_serialized, OutputFormatter};

#[derive(Debug, Args)]
pub struct WhoamiCommand {
    /// Include bot users in the list
    #[arg(long)]
    pub bots: bool,
}

#[derive(Debug, Serialize)]
struct WhoamiOutput<'a> {
    me: &'a NotionUser,
    users: Vec<&'a NotionUser>,
    configured_user_id: Option<&'a str>,
    configured_user_found: bool,
}

impl WhoamiCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.resolve_config()?;
        if config.notion.api_key.trim().is_empty() {
            bail!("notion.api_key is not set; add it to the config file or export {ENV_API_KEY}");
        }

        let client = client_for(&config);
        let directory = Directory::fetch(&client)
            .await
            .context("Failed to list Notion users")?;

        let configured = Some(config.notion.user_id.trim()).filter(|id| !id.is_empty());
        let users: Vec<&NotionUser> = if self.bots {
            directory.users.iter().collect()
        } else {
            directory.people().collect()
        };
        let found = configured.is_some_and(|id| directory.users.iter().any(|u| u.has_id(id)));

        if ctx.is_json() {
            return print_serialized(
                formatter.as_ref(),
                &WhoamiOutput {
                    me: &directory.me,
                    users,
                    configured_user_id: configured,
                    configured_user_found: found,
                },
            );
        }

        print_directory(formatter.as_ref(), &directory.me, &users, configured, found);
        Ok(())
    }
}

fn client_for(config: &Config) -> NotionClient {
    NotionClient::with_base_url(&config.notion.api_key, &config.notion.api_base_url)
        .with_api_version(&config.notion.api_version)
}

fn describe(user: &NotionUser) -> String {
    let mut line = format!("{}  {}", user.id, user.display_name());
    if let Some(kind) = &user.kind {
        line.push_str(&format!(" ({kind})"));
    }
    if let Some(email) = user.email() {
        line.push_str(&format!(" <{email}>"));
    }
    line
}

fn print_directory(
    formatter: &dyn OutputFormatter,
    me: &NotionUser,
    users: &[&NotionUser],
    configured: Option<&str>,
    found: bool,
) {
    formatter.success(&format!("Integration: {}", describe(me)));
    formatter.info("");
    formatter.info(&format!("Users visible to the integration ({}):", users.len()));
    for user in users {
        let is_configured = configured.is_some_and(|id| user.has_id(id));
        let marker = if is_configured { "*" } else { " " };
        let mut line = describe(user);
        if is_configured {
            line.push_str("  [configured]");
        }
        formatter.item(marker, &line);
    }
    formatter.info("");

    match configured {
        Some(id) if !found => formatter.warn(&format!(
            "Configured user id {id} is not among the visible users"
        )),
        Some(_) => {}
        None => formatter.info(&format!(
            "Copy your id into notion.user_id or export {ENV_USER_ID}=<id>"
        )),
    }
}
