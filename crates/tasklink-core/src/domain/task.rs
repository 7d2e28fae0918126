//! Remote task entity and status vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::due::DueDate;
use super::newtypes::RemoteId;

/// Status names used by the remote store's status property
///
/// The remote store identifies statuses by display name, and each
/// workspace names them differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusNames {
    /// Terminal "finished" status
    pub done: String,
    /// Terminal "abandoned" status
    pub canceled: String,
    /// Status given to tasks created from the local side
    pub initial: String,
}

impl Default for StatusNames {
    fn default() -> Self {
        Self {
            done: "Done".to_string(),
            canceled: "Canceled".to_string(),
            initial: "New".to_string(),
        }
    }
}

/// Lifecycle status of a remote task
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TaskStatus {
    /// The configured initial status
    New,
    /// Terminal: finished
    Done,
    /// Terminal: abandoned
    Canceled,
    /// Any other non-terminal status, by display name
    Active(String),
}

impl TaskStatus {
    /// Classify a status display name against the configured vocabulary
    ///
    /// Names are compared exactly, as the remote store does.
    pub fn from_name(name: &str, names: &StatusNames) -> Self {
        if name == names.done {
            Self::Done
        } else if name == names.canceled {
            Self::Canceled
        } else if name == names.initial {
            Self::New
        } else {
            Self::Active(name.to_string())
        }
    }

    /// Display name to send back to the remote store
    pub fn name<'a>(&'a self, names: &'a StatusNames) -> &'a str {
        match self {
            Self::New => &names.initial,
            Self::Done => &names.done,
            Self::Canceled => &names.canceled,
            Self::Active(name) => name,
        }
    }

    /// Returns true for Done and Canceled
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

/// A task as read from the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Canonical dash-free identifier
    pub id: RemoteId,
    pub title: String,
    pub due: Option<DueDate>,
    pub status: TaskStatus,
    /// Last modification time; absent when the store did not report one
    pub last_modified: Option<DateTime<Utc>>,
    /// Display name of the associated customer, if any
    pub customer: Option<String>,
    /// Canonical link to the task, embedded in the linked local item
    pub url: String,
}

impl RemoteTask {
    /// Fallback URL for a task whose page payload carried none
    #[must_use]
    pub fn default_url(id: &RemoteId) -> String {
        format!("https://notion.so/{}", id.as_str())
    }
}
