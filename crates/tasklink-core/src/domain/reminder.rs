//! Local reminder entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::due::DueDate;
use super::newtypes::LocalId;

/// An item as read from the local reminder list
///
/// The link to a remote task is not stored here; it is derived from
/// `url` by the sync engine's link resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalItem {
    pub id: LocalId,
    /// Free text; may carry the sync tag
    pub title: String,
    pub due: Option<DueDate>,
    /// The store reported a due date that could not be read; `due` is
    /// `None` but must not be taken as "no due date"
    #[serde(default)]
    pub due_unreadable: bool,
    pub notes: Option<String>,
    /// Reference URL, the embedding point for a remote task id
    pub url: Option<String>,
    pub completed: bool,
    pub last_modified: Option<DateTime<Utc>>,
    /// Tag markers attached to the item (without the `#` prefix)
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LocalItem {
    /// Returns true if the item has a non-blank reference URL
    #[must_use]
    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: Option<&str>) -> LocalItem {
        LocalItem {
            id: LocalId::new("r1").unwrap(),
            title: "Call back".to_string(),
            due: None,
            due_unreadable: false,
            notes: None,
            url: url.map(str::to_string),
            completed: false,
            last_modified: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_has_url() {
        assert!(item(Some("https://notion.so/x")).has_url());
        assert!(!item(None).has_url());
        assert!(!item(Some("  ")).has_url());
    }
}
