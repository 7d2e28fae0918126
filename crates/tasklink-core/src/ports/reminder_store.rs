//! Local reminder store port (driven/secondary port)
//!
//! Interface to the native reminder list on the user's device. The
//! primary implementation drives Apple Reminders through `osascript` in
//! `tasklink-reminders`.

use std::time::Duration;

use crate::domain::{DueDate, LocalId, LocalItem};

/// Input for creating a local item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReminder {
    pub title: String,
    pub due: Option<DueDate>,
    pub notes: Option<String>,
    pub url: Option<String>,
    /// Tag marker to attach, without the `#` prefix
    pub tag: Option<String>,
}

/// Partial update of a local item
///
/// `None` fields are left untouched. `clear_due` wins over `due`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    pub due: Option<DueDate>,
    pub clear_due: bool,
}

impl ReminderUpdate {
    /// Returns true if applying this update would change nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.due.is_none() && !self.clear_due
    }
}

/// Port trait for the local reminder list
///
/// All item operations act on the single list the store was configured
/// with. `request_access` must be called, and must return `true`, before
/// any other operation.
#[async_trait::async_trait]
pub trait ILocalReminderStore: Send + Sync {
    /// Ask for permission to read and write reminders, waiting at most
    /// `timeout` for the user or the OS to answer
    async fn request_access(&self, timeout: Duration) -> anyhow::Result<bool>;

    /// Every item in the configured list, completed ones included
    async fn list_items(&self) -> anyhow::Result<Vec<LocalItem>>;

    async fn create_item(&self, item: &NewReminder) -> anyhow::Result<LocalItem>;

    async fn update_item(&self, id: &LocalId, update: &ReminderUpdate) -> anyhow::Result<()>;

    async fn complete_item(&self, id: &LocalId) -> anyhow::Result<()>;

    async fn delete_item(&self, id: &LocalId) -> anyhow::Result<()>;

    /// Fetch one item, `None` if it no longer exists
    async fn get_item(&self, id: &LocalId) -> anyhow::Result<Option<LocalItem>>;

    /// Set the item's reference URL, leaving every other field untouched
    async fn set_url(&self, id: &LocalId, url: &str) -> anyhow::Result<()>;
}
