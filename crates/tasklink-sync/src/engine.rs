//! Bidirectional sync engine
//!
//! The [`SyncEngine`] reconciles the remote task database with the local
//! reminder list in one sequential batch pass.
//!
//! ## Sync Flow
//!
//! 1. **Access**: request local store permission, abort if refused
//! 2. **Snapshot**: load the link table, fetch both stores, abort on failure
//! 3. **Passes**, in fixed order:
//!    deletion, remote status to local, local creation, field reconcile,
//!    local completion to remote, remote creation
//! 4. **Persist**: overwrite the link table (skipped in dry-run mode)
//!
//! A failed store operation inside a pass is logged, recorded in the
//! report and skipped. Nothing is retried within a run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use tasklink_conflict::ConflictPolicy;
use tasklink_core::config::Config;
use tasklink_core::domain::{LinkTable, LocalItem, RemoteTask, SyncTag};
use tasklink_core::ports::{ILinkStore, ILocalReminderStore, IRemoteTaskSource};

use crate::dry_run::{DryRunLocal, DryRunRemote};
use crate::index::SnapshotIndex;
use crate::passes::{self, PassContext};
use crate::report::SyncReport;
use crate::SyncError;

// ============================================================================
// Settings
// ============================================================================

/// Engine parameters taken from the configuration
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub tag: SyncTag,
    pub policy: ConflictPolicy,
    /// Longest wait for the local permission prompt
    pub access_timeout: Duration,
    /// Plan every action but write nothing
    pub dry_run: bool,
}

impl SyncSettings {
    /// Builds settings from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the sync tag or the conflict strategy is invalid.
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        let tag = SyncTag::new(&config.reminders.tag)?;
        let policy = ConflictPolicy::from_name(&config.conflicts.strategy)
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            tag,
            policy,
            access_timeout: Duration::from_secs(config.reminders.access_timeout_secs),
            dry_run: false,
        })
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// ============================================================================
// Shared run steps
// ============================================================================

/// Asks for local store access, failing the run if it is not granted
pub(crate) async fn ensure_access(
    local: &dyn ILocalReminderStore,
    timeout: Duration,
) -> Result<(), SyncError> {
    match local.request_access(timeout).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(SyncError::AccessDenied),
        Err(e) => Err(SyncError::AccessRequest(format!("{e:#}"))),
    }
}

/// Fetches both snapshots, failing the run if either store is unreadable
pub(crate) async fn fetch_snapshots(
    remote: &dyn IRemoteTaskSource,
    local: &dyn ILocalReminderStore,
) -> Result<(Vec<RemoteTask>, Vec<LocalItem>), SyncError> {
    let remote_tasks = remote
        .list_active_tasks()
        .await
        .map_err(|e| SyncError::Snapshot {
            store: "Notion",
            message: format!("{e:#}"),
        })?;
    let local_items = local.list_items().await.map_err(|e| SyncError::Snapshot {
        store: "Reminders",
        message: format!("{e:#}"),
    })?;
    Ok((remote_tasks, local_items))
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Orchestrates one reconciliation run
pub struct SyncEngine {
    remote: Arc<dyn IRemoteTaskSource>,
    local: Arc<dyn ILocalReminderStore>,
    links: Arc<dyn ILinkStore>,
    settings: SyncSettings,
}

impl SyncEngine {
    /// Creates an engine over the given stores
    ///
    /// In dry-run mode both stores are wrapped so that writes are dropped.
    pub fn new(
        remote: Arc<dyn IRemoteTaskSource>,
        local: Arc<dyn ILocalReminderStore>,
        links: Arc<dyn ILinkStore>,
        settings: SyncSettings,
    ) -> Self {
        let (remote, local): (Arc<dyn IRemoteTaskSource>, Arc<dyn ILocalReminderStore>) =
            if settings.dry_run {
                (
                    Arc::new(DryRunRemote::new(remote)),
                    Arc::new(DryRunLocal::new(local)),
                )
            } else {
                (remote, local)
            };
        Self {
            remote,
            local,
            links,
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Runs one full reconciliation
    ///
    /// # Errors
    ///
    /// Returns an error only when the run aborts before any mutation:
    /// local access was refused or a store snapshot could not be fetched.
    #[tracing::instrument(skip(self), fields(dry_run = self.settings.dry_run))]
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let mut report = SyncReport::new(self.settings.dry_run);

        ensure_access(self.local.as_ref(), self.settings.access_timeout).await?;

        let persisted = match self.links.load().await {
            Ok(table) => table,
            Err(e) => {
                let msg = format!("Failed to load link table, deletions cannot be detected this run: {e:#}");
                warn!(%msg);
                report.error(msg);
                LinkTable::new()
            }
        };

        let (remote_tasks, local_items) =
            fetch_snapshots(self.remote.as_ref(), self.local.as_ref()).await?;
        report.remote_tasks = remote_tasks.len();
        report.local_items = local_items.len();
        info!(
            remote = remote_tasks.len(),
            local = local_items.len(),
            persisted = persisted.len(),
            "Snapshots fetched"
        );

        let index = SnapshotIndex::build(remote_tasks, local_items, &self.settings.tag);
        let mut ctx = PassContext::new(
            self.remote.as_ref(),
            self.local.as_ref(),
            &self.settings.tag,
            self.settings.policy,
            index,
            report,
        );

        passes::deletion::reconcile(&mut ctx, &persisted).await;
        passes::status::propagate_remote_status(&mut ctx).await;
        passes::creation::create_local_items(&mut ctx).await;
        passes::fields::reconcile(&mut ctx).await;
        passes::status::propagate_local_completion(&mut ctx).await;
        passes::creation::create_remote_tasks(&mut ctx).await;

        let (index, mut report, carried) = ctx.finish();
        let mut table = index.active_links();
        for (remote_id, local_id) in carried.iter() {
            if !table.contains(remote_id) {
                table.insert(remote_id.clone(), local_id.clone());
            }
        }

        if self.settings.dry_run {
            debug!(pairs = table.len(), "Dry run, link table not saved");
        } else {
            match self.links.save(&table).await {
                Ok(()) => report.links_saved = Some(table.len()),
                Err(e) => {
                    let msg = format!("Failed to save link table: {e:#}");
                    warn!(%msg);
                    report.error(msg);
                }
            }
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            local_created = report.local.created,
            local_updated = report.local.updated,
            local_completed = report.local.completed,
            local_deleted = report.local.deleted,
            remote_created = report.remote.created,
            remote_updated = report.remote.updated,
            remote_completed = report.remote.completed,
            remote_canceled = report.remote.canceled,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "Sync completed"
        );

        Ok(report)
    }
}
