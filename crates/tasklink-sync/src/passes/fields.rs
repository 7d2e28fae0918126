//! Title and due-date reconciliation for open linked pairs

use tracing::warn;

use tasklink_conflict::{ConflictDetector, DetectionResult, DueUpdate, Resolution};
use tasklink_core::domain::{DueDate, LocalId, RemoteId};
use tasklink_core::ports::ReminderUpdate;

use crate::report::{ActionKind, SyncAction};

use super::PassContext;

pub(crate) async fn reconcile(ctx: &mut PassContext<'_>) {
    for (remote_id, local_id) in ctx.index.links() {
        let (Some(local), Some(remote)) = (ctx.index.local(&local_id), ctx.index.remote(&remote_id))
        else {
            continue;
        };
        if local.completed {
            continue;
        }
        if local.due_unreadable {
            let title = remote.title.clone();
            ctx.record_error(format!(
                "Reminder {local_id} has an unreadable due date, not syncing '{title}' this run"
            ));
            continue;
        }

        let conflict = match ConflictDetector::check_pair(local, remote, ctx.tag) {
            DetectionResult::InSync => continue,
            DetectionResult::Diverged(conflict) => conflict,
        };

        match ctx.policy.resolve(&conflict) {
            Resolution::UpdateRemote { title, due } => {
                push_to_remote(ctx, &remote_id, &local_id, title, due).await;
            }
            Resolution::UpdateLocal { title, due } => {
                pull_to_local(ctx, &remote_id, &local_id, title, due).await;
            }
        }
    }
}

async fn push_to_remote(
    ctx: &mut PassContext<'_>,
    remote_id: &RemoteId,
    local_id: &LocalId,
    title: Option<String>,
    due: Option<DueUpdate>,
) {
    let title = title.filter(|t| {
        let keep = !t.trim().is_empty();
        if !keep {
            warn!(local_id = %local_id, "Reminder title is only the tag, not clearing the Notion title");
        }
        keep
    });
    if let Some(title) = title {
        match ctx.remote.update_title(remote_id, &title).await {
            Ok(()) => {
                ctx.report.remote.updated += 1;
                ctx.report.record(
                    SyncAction::new(ActionKind::UpdateRemote, title.clone())
                        .remote(remote_id)
                        .local(local_id)
                        .detail("title"),
                );
                if let Some(task) = ctx.index.remote_mut(remote_id) {
                    task.title = title;
                }
            }
            Err(e) => ctx.record_error(format!("Failed to update title of Notion task {remote_id}: {e:#}")),
        }
    }

    if let Some(due) = due {
        let day = match due {
            DueUpdate::Set(due) => Some(due.date()),
            DueUpdate::Clear => None,
        };
        match ctx.remote.update_due_date(remote_id, day).await {
            Ok(()) => {
                let title = ctx
                    .index
                    .remote(remote_id)
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                ctx.report.remote.updated += 1;
                ctx.report.record(
                    SyncAction::new(ActionKind::UpdateRemote, title)
                        .remote(remote_id)
                        .local(local_id)
                        .detail(match day {
                            Some(day) => format!("due {day}"),
                            None => "due cleared".to_string(),
                        }),
                );
                if let Some(task) = ctx.index.remote_mut(remote_id) {
                    task.due = day.map(DueDate::on);
                }
            }
            Err(e) => ctx.record_error(format!("Failed to update due date of Notion task {remote_id}: {e:#}")),
        }
    }
}

async fn pull_to_local(
    ctx: &mut PassContext<'_>,
    remote_id: &RemoteId,
    local_id: &LocalId,
    title: Option<String>,
    due: Option<DueUpdate>,
) {
    let update = ReminderUpdate {
        title,
        due: match due {
            Some(DueUpdate::Set(due)) => Some(due),
            _ => None,
        },
        clear_due: matches!(due, Some(DueUpdate::Clear)),
    };
    if update.is_empty() {
        return;
    }

    let mut changed = Vec::new();
    if update.title.is_some() {
        changed.push("title".to_string());
    }
    if let Some(due) = &update.due {
        changed.push(format!("due {due}"));
    }
    if update.clear_due {
        changed.push("due cleared".to_string());
    }

    match ctx.local.update_item(local_id, &update).await {
        Ok(()) => {
            let item = ctx.index.local_mut(local_id);
            let mut shown = String::new();
            if let Some(item) = item {
                if let Some(title) = update.title {
                    item.title = title;
                }
                if update.clear_due {
                    item.due = None;
                } else if update.due.is_some() {
                    item.due = update.due;
                }
                shown = item.title.clone();
            }
            ctx.report.local.updated += 1;
            ctx.report.record(
                SyncAction::new(ActionKind::UpdateLocal, shown)
                    .remote(remote_id)
                    .local(local_id)
                    .detail(changed.join(", ")),
            );
        }
        Err(e) => ctx.record_error(format!("Failed to update reminder {local_id}: {e:#}")),
    }
}
