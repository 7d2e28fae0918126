//! Reference URL backfill
//!
//! Repairs tagged local items that lost, or never got, the URL linking them
//! to their remote task. Each such item is matched to an active remote task
//! by normalized title and, when exactly one task matches, the task's URL is
//! written onto the item.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use tasklink_core::domain::{RemoteTask, SyncTag};
use tasklink_core::ports::{ILocalReminderStore, IRemoteTaskSource};

use crate::dry_run::DryRunLocal;
use crate::engine::{ensure_access, fetch_snapshots, SyncSettings};
use crate::linker;
use crate::report::{ActionKind, BackfillReport, SyncAction};
use crate::SyncError;

/// Runs the `fix-urls` mode
pub struct UrlBackfill {
    remote: Arc<dyn IRemoteTaskSource>,
    local: Arc<dyn ILocalReminderStore>,
    tag: SyncTag,
    access_timeout: Duration,
    dry_run: bool,
}

impl UrlBackfill {
    pub fn new(
        remote: Arc<dyn IRemoteTaskSource>,
        local: Arc<dyn ILocalReminderStore>,
        settings: &SyncSettings,
    ) -> Self {
        let local: Arc<dyn ILocalReminderStore> = if settings.dry_run {
            Arc::new(DryRunLocal::new(local))
        } else {
            local
        };
        Self {
            remote,
            local,
            tag: settings.tag.clone(),
            access_timeout: settings.access_timeout,
            dry_run: settings.dry_run,
        }
    }

    /// Matches untracked local items to remote tasks and writes their URLs
    ///
    /// # Errors
    ///
    /// Fails before any write if local access is refused or either store
    /// cannot be listed.
    #[tracing::instrument(skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self) -> Result<BackfillReport, SyncError> {
        let start = Instant::now();
        let mut report = BackfillReport {
            dry_run: self.dry_run,
            ..BackfillReport::default()
        };

        ensure_access(self.local.as_ref(), self.access_timeout).await?;
        let (remote_tasks, local_items) =
            fetch_snapshots(self.remote.as_ref(), self.local.as_ref()).await?;

        let mut by_title: HashMap<String, Vec<&RemoteTask>> = HashMap::new();
        for task in &remote_tasks {
            by_title
                .entry(self.tag.normalize(&task.title))
                .or_default()
                .push(task);
        }

        for item in local_items
            .iter()
            .filter(|item| linker::is_sync_candidate(item, &self.tag))
        {
            report.candidates += 1;
            let key = self.tag.normalize(&item.title);

            let task = match by_title.get(&key).map(Vec::as_slice) {
                Some([task]) => *task,
                Some(matches) if matches.len() > 1 => {
                    debug!(title = %item.title, matches = matches.len(), "Ambiguous title, leaving unmatched");
                    report.unmatched.push(item.title.clone());
                    continue;
                }
                _ => {
                    report.unmatched.push(item.title.clone());
                    continue;
                }
            };

            match self.local.set_url(&item.id, &task.url).await {
                Ok(()) => {
                    report.fixed += 1;
                    report.actions.push(
                        SyncAction::new(ActionKind::LinkLocal, item.title.clone())
                            .remote(&task.id)
                            .local(&item.id)
                            .detail(task.url.clone()),
                    );
                }
                Err(e) => {
                    let msg = format!("Failed to set URL on reminder '{}': {e:#}", item.title);
                    warn!(%msg);
                    report.errors.push(msg);
                }
            }
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            candidates = report.candidates,
            fixed = report.fixed,
            unmatched = report.unmatched.len(),
            "URL backfill completed"
        );
        Ok(report)
    }
}
