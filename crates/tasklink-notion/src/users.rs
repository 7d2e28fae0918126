//! Users endpoints, used by the `whoami` diagnostic
//!
//! Helps locate the id to configure as `notion.user_id`: the integration's
//! own bot identity plus every person and bot visible to it.

use serde::{Deserialize, Serialize};

use crate::client::NotionClient;
use crate::NotionError;

/// A Notion user (person or bot)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `person` or `bot`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInfo {
    #[serde(default)]
    pub email: Option<String>,
}

impl NotionUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn is_bot(&self) -> bool {
        self.kind.as_deref() == Some("bot")
    }

    pub fn email(&self) -> Option<&str> {
        self.person.as_ref()?.email.as_deref()
    }

    /// Compares ids ignoring dashes and case
    pub fn has_id(&self, id: &str) -> bool {
        let norm = |s: &str| s.replace('-', "").to_ascii_lowercase();
        norm(&self.id) == norm(id)
    }
}

/// Response of `GET /users`
#[derive(Debug, Deserialize)]
pub(crate) struct UserList {
    #[serde(default)]
    pub results: Vec<NotionUser>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// The integration identity and everyone it can see
#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    pub me: NotionUser,
    pub users: Vec<NotionUser>,
}

impl Directory {
    /// Fetches `/users/me` and the full user list
    pub async fn fetch(client: &NotionClient) -> Result<Self, NotionError> {
        let me = client.get_me().await?;
        let users = client.list_users().await?;
        Ok(Self { me, users })
    }

    /// People only, bots excluded
    pub fn people(&self) -> impl Iterator<Item = &NotionUser> {
        self.users.iter().filter(|u| !u.is_bot())
    }
}
