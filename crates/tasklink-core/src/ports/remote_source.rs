//! Remote task source port (driven/secondary port)
//!
//! This module defines the interface to the remote task tracker. The
//! primary implementation is the Notion adapter in `tasklink-notion`.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because transport errors are adapter-specific.
//!   A failed call is never fatal to a sync run; the engine logs it and
//!   moves on to the next item.
//! - Every identifier crossing this boundary is a canonical [`RemoteId`].

use chrono::NaiveDate;

use crate::domain::{DueDate, RemoteId, RemoteTask, TaskStatus};

/// Result of a direct status lookup for a single task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLookup {
    /// The task exists and has this status
    Found(TaskStatus),
    /// The task does not exist or has been archived
    NotFound,
}

/// Input for creating a remote task from a local item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemoteTask {
    /// Title with the sync tag already stripped
    pub title: String,
    pub due: Option<DueDate>,
}

/// Port trait for the remote task tracker
///
/// ## Implementation Notes
///
/// - `list_active_tasks` must apply the assignee, non-terminal status and
///   optional type-exclusion filters, server-side or client-side.
/// - `get_task_status` must distinguish "gone" from "filtered out": only a
///   definitive not-found or archived answer may yield
///   [`StatusLookup::NotFound`]. Transport failures are errors.
#[async_trait::async_trait]
pub trait IRemoteTaskSource: Send + Sync {
    /// Fetch every active task assigned to the configured user
    async fn list_active_tasks(&self) -> anyhow::Result<Vec<RemoteTask>>;

    /// Look up the live status of one task, bypassing the active filter
    async fn get_task_status(&self, id: &RemoteId) -> anyhow::Result<StatusLookup>;

    /// Create a task assigned to the configured user with the initial status
    async fn create_task(&self, task: &NewRemoteTask) -> anyhow::Result<RemoteTask>;

    /// Replace the task's title
    async fn update_title(&self, id: &RemoteId, title: &str) -> anyhow::Result<()>;

    /// Set the due date, or clear it with `None`
    async fn update_due_date(&self, id: &RemoteId, due: Option<NaiveDate>) -> anyhow::Result<()>;

    /// Move the task to the terminal done status
    async fn mark_done(&self, id: &RemoteId) -> anyhow::Result<()>;

    /// Move the task to the terminal canceled status
    async fn mark_canceled(&self, id: &RemoteId) -> anyhow::Result<()>;
}
