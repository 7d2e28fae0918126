//! Status propagation in both directions

use tracing::debug;

use tasklink_core::domain::TaskStatus;
use tasklink_core::ports::StatusLookup;

use crate::report::{ActionKind, SyncAction};

use super::PassContext;

/// Completes or deletes local items whose remote task reached a terminal
/// status
///
/// Tasks still in the active set are non-terminal by construction, so only
/// linked tasks that left it are looked up.
pub(crate) async fn propagate_remote_status(ctx: &mut PassContext<'_>) {
    for (remote_id, local_id) in ctx.index.links() {
        let Some(item) = ctx.index.local(&local_id) else {
            continue;
        };
        if item.completed || ctx.index.is_active(&remote_id) {
            continue;
        }
        let title = item.title.clone();

        let status = match ctx.lookup_status(&remote_id).await {
            Ok(StatusLookup::Found(status)) => status,
            Ok(StatusLookup::NotFound) => continue,
            Err(e) => {
                ctx.record_error(format!("Failed to look up Notion task {remote_id}: {e:#}"));
                continue;
            }
        };

        match status {
            TaskStatus::Done => match ctx.local.complete_item(&local_id).await {
                Ok(()) => {
                    ctx.report.local.completed += 1;
                    ctx.report.record(
                        SyncAction::new(ActionKind::CompleteLocal, title)
                            .remote(&remote_id)
                            .local(&local_id),
                    );
                    if let Some(item) = ctx.index.local_mut(&local_id) {
                        item.completed = true;
                    }
                }
                Err(e) => ctx.record_error(format!("Failed to complete reminder '{title}': {e:#}")),
            },
            TaskStatus::Canceled => match ctx.local.delete_item(&local_id).await {
                Ok(()) => {
                    ctx.report.local.deleted += 1;
                    ctx.report.record(
                        SyncAction::new(ActionKind::DeleteLocal, title)
                            .remote(&remote_id)
                            .local(&local_id)
                            .detail("Notion task canceled"),
                    );
                    ctx.index.remove_local(&local_id);
                }
                Err(e) => ctx.record_error(format!("Failed to delete reminder '{title}': {e:#}")),
            },
            other => debug!(remote_id = %remote_id, status = ?other, "Linked task is filtered out but open"),
        }
    }
}

/// Marks remote tasks done when their linked local item was completed
pub(crate) async fn propagate_local_completion(ctx: &mut PassContext<'_>) {
    for (remote_id, local_id) in ctx.index.links() {
        if !ctx.index.local(&local_id).is_some_and(|item| item.completed) {
            continue;
        }
        let Some(task) = ctx.index.remote(&remote_id) else {
            continue;
        };
        if task.status.is_terminal() {
            continue;
        }
        let title = task.title.clone();

        match ctx.remote.mark_done(&remote_id).await {
            Ok(()) => {
                ctx.report.remote.completed += 1;
                ctx.report.record(
                    SyncAction::new(ActionKind::CompleteRemote, title)
                        .remote(&remote_id)
                        .local(&local_id),
                );
                if let Some(task) = ctx.index.remote_mut(&remote_id) {
                    task.status = TaskStatus::Done;
                }
            }
            Err(e) => ctx.record_error(format!("Failed to mark Notion task '{title}' done: {e:#}")),
        }
    }
}
