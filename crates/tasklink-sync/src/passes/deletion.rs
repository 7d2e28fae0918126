//! Deletion reconciliation
//!
//! Interprets one-sided absences of previously linked pairs. A pair in the
//! persisted table whose local item vanished means the user deleted the
//! reminder; a pair whose remote task left the active set is only treated
//! as a deletion after a direct lookup confirms the task is gone.

use tracing::debug;

use tasklink_core::domain::{LinkTable, LocalId, RemoteId};
use tasklink_core::ports::StatusLookup;

use crate::linker;
use crate::report::{ActionKind, SyncAction};

use super::PassContext;

pub(crate) async fn reconcile(ctx: &mut PassContext<'_>, persisted: &LinkTable) {
    for (remote_id, local_id) in persisted.iter() {
        let local_present = ctx.index.local(local_id).is_some();
        let remote_active = ctx.index.is_active(remote_id);

        match (local_present, remote_active) {
            (false, true) => cancel_orphaned_remote(ctx, remote_id, local_id).await,
            (true, false) => confirm_remote_deletion(ctx, remote_id, local_id).await,
            (true, true) => {}
            (false, false) => {
                debug!(remote_id = %remote_id, local_id = %local_id, "Both sides gone, dropping pair");
            }
        }
    }
}

async fn cancel_orphaned_remote(ctx: &mut PassContext<'_>, remote_id: &RemoteId, local_id: &LocalId) {
    if let Some(other) = ctx.index.linked_local(remote_id) {
        debug!(
            remote_id = %remote_id,
            linked_to = %other,
            "Remote task relinked to another reminder, not canceling"
        );
        return;
    }

    let title = ctx
        .index
        .remote(remote_id)
        .map(|t| t.title.clone())
        .unwrap_or_default();

    match ctx.remote.mark_canceled(remote_id).await {
        Ok(()) => {
            ctx.report.remote.canceled += 1;
            ctx.report.record(
                SyncAction::new(ActionKind::CancelRemote, title)
                    .remote(remote_id)
                    .local(local_id)
                    .detail("reminder deleted"),
            );
            ctx.index.retire(remote_id);
        }
        Err(e) => {
            ctx.record_error(format!("Failed to cancel Notion task '{title}' ({remote_id}): {e:#}"));
            ctx.carried.insert(remote_id.clone(), local_id.clone());
            ctx.excluded.insert(remote_id.clone());
        }
    }
}

async fn confirm_remote_deletion(ctx: &mut PassContext<'_>, remote_id: &RemoteId, local_id: &LocalId) {
    let Some(item) = ctx.index.local(local_id) else {
        return;
    };
    if linker::extract_link(item).as_ref() != Some(remote_id) {
        debug!(remote_id = %remote_id, local_id = %local_id, "Reminder no longer links to task, dropping pair");
        return;
    }
    let title = item.title.clone();

    match ctx.lookup_status(remote_id).await {
        Ok(StatusLookup::NotFound) => match ctx.local.delete_item(local_id).await {
            Ok(()) => {
                ctx.report.local.deleted += 1;
                ctx.report.record(
                    SyncAction::new(ActionKind::DeleteLocal, title)
                        .remote(remote_id)
                        .local(local_id)
                        .detail("Notion task deleted"),
                );
                ctx.index.remove_local(local_id);
            }
            Err(e) => {
                ctx.record_error(format!("Failed to delete reminder '{title}' ({local_id}): {e:#}"));
            }
        },
        Ok(StatusLookup::Found(status)) => {
            debug!(remote_id = %remote_id, ?status, "Task left the active set but still exists");
        }
        Err(e) => {
            ctx.record_error(format!(
                "Could not confirm deletion of Notion task {remote_id}, keeping reminder '{title}': {e:#}"
            ));
        }
    }
}
