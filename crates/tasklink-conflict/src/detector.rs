//! Field divergence detection
//!
//! Determines whether a linked local item and remote task disagree on
//! title or due date. Titles are compared after stripping the sync tag
//! from the local side; due dates are compared at calendar-date
//! granularity, ignoring any time of day.

use chrono::{DateTime, Utc};
use tracing::debug;

use tasklink_core::domain::{due::due_day, DueDate, LocalItem, RemoteTask, SyncTag};

/// Result of comparing a linked pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionResult {
    /// Both sides agree; nothing to push
    InSync,
    /// At least one field differs
    Diverged(Box<FieldConflict>),
}

/// Both sides of a diverged pair, as the policy needs them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConflict {
    /// Local title with the sync tag stripped
    pub local_title: String,
    pub remote_title: String,
    pub local_due: Option<DueDate>,
    pub remote_due: Option<DueDate>,
    pub local_modified: Option<DateTime<Utc>>,
    pub remote_modified: Option<DateTime<Utc>>,
    pub title_changed: bool,
    pub due_changed: bool,
}

/// Detects field divergence between a local item and its remote task
pub struct ConflictDetector;

impl ConflictDetector {
    /// Compares the title and due date of a linked pair
    ///
    /// Callers are expected to have already excluded completed local items
    /// and remote tasks outside the active set.
    pub fn check_pair(local: &LocalItem, remote: &RemoteTask, tag: &SyncTag) -> DetectionResult {
        let local_title = tag.strip(&local.title);
        let title_changed = local_title != remote.title;
        let due_changed = due_day(local.due.as_ref()) != due_day(remote.due.as_ref());

        if !title_changed && !due_changed {
            return DetectionResult::InSync;
        }

        debug!(
            local_id = %local.id,
            remote_id = %remote.id,
            title_changed,
            due_changed,
            "Linked pair diverged"
        );

        DetectionResult::Diverged(Box::new(FieldConflict {
            local_title,
            remote_title: remote.title.clone(),
            local_due: local.due,
            remote_due: remote.due,
            local_modified: local.last_modified,
            remote_modified: remote.last_modified,
            title_changed,
            due_changed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use tasklink_core::domain::{LocalId, RemoteId, TaskStatus};

    use super::*;

    fn tag() -> SyncTag {
        SyncTag::new("#Notion").unwrap()
    }

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn local(title: &str, due: Option<DueDate>) -> LocalItem {
        LocalItem {
            id: LocalId::new("l1").unwrap(),
            title: title.to_string(),
            due,
            due_unreadable: false,
            notes: None,
            url: None,
            completed: false,
            last_modified: Some(Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap()),
            tags: Vec::new(),
        }
    }

    fn remote(title: &str, due: Option<DueDate>) -> RemoteTask {
        RemoteTask {
            id: RemoteId::new("a".repeat(32)).unwrap(),
            title: title.to_string(),
            due,
            status: TaskStatus::New,
            last_modified: Some(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()),
            customer: None,
            url: "https://notion.so/x".to_string(),
        }
    }

    #[test]
    fn test_identical_pair_in_sync() {
        let result = ConflictDetector::check_pair(
            &local("Renew license", Some(DueDate::on(ymd(1)))),
            &remote("Renew license", Some(DueDate::on(ymd(1)))),
            &tag(),
        );
        assert_eq!(result, DetectionResult::InSync);
    }

    #[test]
    fn test_tag_ignored_in_title_comparison() {
        let result = ConflictDetector::check_pair(
            &local("Renew license #notion", None),
            &remote("Renew license", None),
            &tag(),
        );
        assert_eq!(result, DetectionResult::InSync);
    }

    #[test]
    fn test_time_of_day_ignored() {
        let timed = DueDate::at(ymd(1), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        let result = ConflictDetector::check_pair(
            &local("A", Some(timed)),
            &remote("A", Some(DueDate::parse("2024-05-01T00:00:00Z").unwrap())),
            &tag(),
        );
        assert_eq!(result, DetectionResult::InSync);
    }

    #[test]
    fn test_title_divergence() {
        let result = ConflictDetector::check_pair(
            &local("Renew license today #notion", None),
            &remote("Renew license", None),
            &tag(),
        );
        let DetectionResult::Diverged(conflict) = result else {
            panic!("expected divergence");
        };
        assert!(conflict.title_changed);
        assert!(!conflict.due_changed);
        assert_eq!(conflict.local_title, "Renew license today");
    }

    #[test]
    fn test_due_removed_on_one_side() {
        let result = ConflictDetector::check_pair(
            &local("A", None),
            &remote("A", Some(DueDate::on(ymd(3)))),
            &tag(),
        );
        let DetectionResult::Diverged(conflict) = result else {
            panic!("expected divergence");
        };
        assert!(!conflict.title_changed);
        assert!(conflict.due_changed);
        assert_eq!(conflict.remote_due, Some(DueDate::on(ymd(3))));
    }
}
