//! Dry-run store wrappers
//!
//! Wrap a real store so that reads pass through and writes are logged and
//! dropped. Creates return synthetic records so the engine can keep
//! planning against them exactly as it would in a live run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use tasklink_core::domain::{LocalId, LocalItem, RemoteId, RemoteTask, TaskStatus};
use tasklink_core::ports::{
    ILocalReminderStore, IRemoteTaskSource, NewReminder, NewRemoteTask, ReminderUpdate,
    StatusLookup,
};

/// Remote source that never writes
pub struct DryRunRemote {
    inner: Arc<dyn IRemoteTaskSource>,
    counter: AtomicU64,
}

impl DryRunRemote {
    pub fn new(inner: Arc<dyn IRemoteTaskSource>) -> Self {
        Self {
            inner,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait::async_trait]
impl IRemoteTaskSource for DryRunRemote {
    async fn list_active_tasks(&self) -> Result<Vec<RemoteTask>> {
        self.inner.list_active_tasks().await
    }

    async fn get_task_status(&self, id: &RemoteId) -> Result<StatusLookup> {
        self.inner.get_task_status(id).await
    }

    async fn create_task(&self, task: &NewRemoteTask) -> Result<RemoteTask> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let id = RemoteId::new(format!("d7{n:030x}"))?;
        info!(title = %task.title, "[dry-run] would create Notion task");
        Ok(RemoteTask {
            url: RemoteTask::default_url(&id),
            id,
            title: task.title.clone(),
            due: task.due,
            status: TaskStatus::New,
            last_modified: None,
            customer: None,
        })
    }

    async fn update_title(&self, id: &RemoteId, title: &str) -> Result<()> {
        info!(remote_id = %id, title, "[dry-run] would update Notion title");
        Ok(())
    }

    async fn update_due_date(&self, id: &RemoteId, due: Option<NaiveDate>) -> Result<()> {
        info!(remote_id = %id, ?due, "[dry-run] would update Notion due date");
        Ok(())
    }

    async fn mark_done(&self, id: &RemoteId) -> Result<()> {
        info!(remote_id = %id, "[dry-run] would mark Notion task done");
        Ok(())
    }

    async fn mark_canceled(&self, id: &RemoteId) -> Result<()> {
        info!(remote_id = %id, "[dry-run] would mark Notion task canceled");
        Ok(())
    }
}

/// Local store that never writes
pub struct DryRunLocal {
    inner: Arc<dyn ILocalReminderStore>,
    counter: AtomicU64,
}

impl DryRunLocal {
    pub fn new(inner: Arc<dyn ILocalReminderStore>) -> Self {
        Self {
            inner,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait::async_trait]
impl ILocalReminderStore for DryRunLocal {
    async fn request_access(&self, timeout: Duration) -> Result<bool> {
        self.inner.request_access(timeout).await
    }

    async fn list_items(&self) -> Result<Vec<LocalItem>> {
        self.inner.list_items().await
    }

    async fn create_item(&self, item: &NewReminder) -> Result<LocalItem> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        info!(title = %item.title, "[dry-run] would create reminder");
        Ok(LocalItem {
            id: LocalId::new(format!("dry-run-{n}"))?,
            title: item.title.clone(),
            due: item.due,
            due_unreadable: false,
            notes: item.notes.clone(),
            url: item.url.clone(),
            completed: false,
            last_modified: None,
            tags: item.tag.iter().cloned().collect(),
        })
    }

    async fn update_item(&self, id: &LocalId, update: &ReminderUpdate) -> Result<()> {
        info!(local_id = %id, ?update, "[dry-run] would update reminder");
        Ok(())
    }

    async fn complete_item(&self, id: &LocalId) -> Result<()> {
        info!(local_id = %id, "[dry-run] would complete reminder");
        Ok(())
    }

    async fn delete_item(&self, id: &LocalId) -> Result<()> {
        info!(local_id = %id, "[dry-run] would delete reminder");
        Ok(())
    }

    async fn get_item(&self, id: &LocalId) -> Result<Option<LocalItem>> {
        self.inner.get_item(id).await
    }

    async fn set_url(&self, id: &LocalId, url: &str) -> Result<()> {
        info!(local_id = %id, url, "[dry-run] would set reminder URL");
        Ok(())
    }
}
