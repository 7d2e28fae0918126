//! Run reports
//!
//! A [`SyncReport`] collects the counters, the ordered list of actions and
//! the non-fatal errors of one run. Dry runs fill it exactly like live runs.

use serde::Serialize;

use tasklink_core::domain::{LocalId, RemoteId};

/// Mutations applied to the local reminder list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocalCounters {
    pub created: u32,
    pub updated: u32,
    pub completed: u32,
    pub deleted: u32,
}

/// Mutations applied to the remote task database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoteCounters {
    pub created: u32,
    pub updated: u32,
    pub completed: u32,
    pub canceled: u32,
}

/// What a single action did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateLocal,
    UpdateLocal,
    CompleteLocal,
    DeleteLocal,
    CreateRemote,
    UpdateRemote,
    CompleteRemote,
    CancelRemote,
    /// Reference URL written onto a local item
    LinkLocal,
}

impl ActionKind {
    /// Short human label
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateLocal => "Created reminder",
            Self::UpdateLocal => "Updated reminder",
            Self::CompleteLocal => "Completed reminder",
            Self::DeleteLocal => "Deleted reminder",
            Self::CreateRemote => "Created Notion task",
            Self::UpdateRemote => "Updated Notion task",
            Self::CompleteRemote => "Completed Notion task",
            Self::CancelRemote => "Canceled Notion task",
            Self::LinkLocal => "Linked reminder",
        }
    }
}

/// One applied (or, in a dry run, planned) mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAction {
    pub kind: ActionKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<RemoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<LocalId>,
    /// Why, or what changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SyncAction {
    pub fn new(kind: ActionKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            remote_id: None,
            local_id: None,
            detail: None,
        }
    }

    pub fn remote(mut self, id: &RemoteId) -> Self {
        self.remote_id = Some(id.clone());
        self
    }

    pub fn local(mut self, id: &LocalId) -> Self {
        self.local_id = Some(id.clone());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Summary of one sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub remote_tasks: usize,
    pub local_items: usize,
    pub local: LocalCounters,
    pub remote: RemoteCounters,
    pub actions: Vec<SyncAction>,
    /// Non-fatal failures, one message per skipped operation
    pub errors: Vec<String>,
    /// Pairs written to the link store; `None` when nothing was saved
    pub links_saved: Option<usize>,
    pub duration_ms: u64,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn record(&mut self, action: SyncAction) {
        self.actions.push(action);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Total mutations across both stores
    pub fn mutation_count(&self) -> u32 {
        let l = &self.local;
        let r = &self.remote;
        l.created + l.updated + l.completed + l.deleted + r.created + r.updated + r.completed + r.canceled
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Summary of a `fix-urls` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub dry_run: bool,
    /// Tagged local items without a URL
    pub candidates: usize,
    pub fixed: u32,
    /// Titles of candidates with no single matching remote task
    pub unmatched: Vec<String>,
    pub actions: Vec<SyncAction>,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}
