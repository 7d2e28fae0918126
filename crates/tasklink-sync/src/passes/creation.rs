//! Creation of missing counterparts on either side

use tracing::{debug, warn};

use tasklink_core::domain::RemoteTask;
use tasklink_core::ports::{NewReminder, NewRemoteTask};

use crate::linker;
use crate::report::{ActionKind, SyncAction};

use super::PassContext;

/// Creates a local item for every active remote task with no linked item
pub(crate) async fn create_local_items(ctx: &mut PassContext<'_>) {
    let unlinked: Vec<RemoteTask> = ctx
        .index
        .remote_tasks()
        .filter(|t| ctx.index.linked_local(&t.id).is_none() && !ctx.excluded.contains(&t.id))
        .cloned()
        .collect();

    for task in unlinked {
        let request = NewReminder {
            title: task.title.clone(),
            due: task.due,
            notes: task.customer.as_ref().map(|c| format!("Customer: {c}")),
            url: Some(task.url.clone()),
            tag: Some(ctx.tag.word().to_string()),
        };

        match ctx.local.create_item(&request).await {
            Ok(item) => {
                let local_id = item.id.clone();
                ctx.report.local.created += 1;
                ctx.report.record(
                    SyncAction::new(ActionKind::CreateLocal, task.title.clone())
                        .remote(&task.id)
                        .local(&local_id),
                );
                ctx.index.insert_local(item);
                ctx.index.link(task.id.clone(), local_id);
            }
            Err(e) => ctx.record_error(format!(
                "Failed to create reminder for Notion task '{}' ({}): {e:#}",
                task.title, task.id
            )),
        }
    }
}

/// Creates a remote task for every tagged, unlinked, open local item and
/// writes the task's URL back onto the item
pub(crate) async fn create_remote_tasks(ctx: &mut PassContext<'_>) {
    for local_id in ctx.index.candidates() {
        let Some(item) = ctx.index.local(&local_id) else {
            continue;
        };
        if !linker::is_sync_candidate(item, ctx.tag) {
            debug!(local_id = %local_id, "Reminder no longer a sync candidate");
            continue;
        }

        let title = ctx.tag.strip(&item.title);
        if title.is_empty() {
            warn!(local_id = %local_id, "Tagged reminder has no title besides the tag, skipping");
            continue;
        }
        let request = NewRemoteTask {
            title,
            due: item.due,
        };

        let task = match ctx.remote.create_task(&request).await {
            Ok(task) => task,
            Err(e) => {
                ctx.record_error(format!("Failed to create Notion task '{}': {e:#}", request.title));
                continue;
            }
        };
        ctx.report.remote.created += 1;

        match ctx.local.set_url(&local_id, &task.url).await {
            Ok(()) => {
                ctx.report.record(
                    SyncAction::new(ActionKind::CreateRemote, task.title.clone())
                        .remote(&task.id)
                        .local(&local_id),
                );
                if let Some(item) = ctx.index.local_mut(&local_id) {
                    item.url = Some(task.url.clone());
                }
                ctx.index.link(task.id.clone(), local_id.clone());
            }
            Err(e) => {
                ctx.report.record(
                    SyncAction::new(ActionKind::CreateRemote, task.title.clone())
                        .remote(&task.id)
                        .detail("URL not written back"),
                );
                ctx.record_error(format!(
                    "Created Notion task '{}' but failed to link reminder {local_id}: {e:#}",
                    task.title
                ));
            }
        }

        ctx.index.insert_remote(task);
    }
}
