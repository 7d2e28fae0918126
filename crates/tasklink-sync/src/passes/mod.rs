//! Reconciliation passes
//!
//! Each pass reads and updates one shared [`PassContext`]. The engine runs
//! them in a fixed order, so a pass always sees the in-memory effects of the
//! passes before it.

pub(crate) mod creation;
pub(crate) mod deletion;
pub(crate) mod fields;
pub(crate) mod status;

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use tracing::warn;

use tasklink_conflict::ConflictPolicy;
use tasklink_core::domain::{LinkTable, RemoteId, SyncTag};
use tasklink_core::ports::{ILocalReminderStore, IRemoteTaskSource, StatusLookup};

use crate::index::SnapshotIndex;
use crate::report::SyncReport;

/// State shared by every pass of one run
pub(crate) struct PassContext<'a> {
    pub remote: &'a dyn IRemoteTaskSource,
    pub local: &'a dyn ILocalReminderStore,
    pub tag: &'a SyncTag,
    pub policy: ConflictPolicy,
    pub index: SnapshotIndex,
    pub report: SyncReport,
    /// Pairs to persist even though they are no longer linked in the index
    pub carried: LinkTable,
    /// Remote tasks that must not get a new local item this run
    pub excluded: HashSet<RemoteId>,
    lookups: HashMap<RemoteId, StatusLookup>,
}

impl<'a> PassContext<'a> {
    pub fn new(
        remote: &'a dyn IRemoteTaskSource,
        local: &'a dyn ILocalReminderStore,
        tag: &'a SyncTag,
        policy: ConflictPolicy,
        index: SnapshotIndex,
        report: SyncReport,
    ) -> Self {
        Self {
            remote,
            local,
            tag,
            policy,
            index,
            report,
            carried: LinkTable::new(),
            excluded: HashSet::new(),
            lookups: HashMap::new(),
        }
    }

    /// Direct status lookup, answered at most once per task per run
    ///
    /// Failures are not cached.
    pub async fn lookup_status(&mut self, id: &RemoteId) -> Result<StatusLookup> {
        if let Some(cached) = self.lookups.get(id) {
            return Ok(cached.clone());
        }
        let lookup = self.remote.get_task_status(id).await?;
        self.lookups.insert(id.clone(), lookup.clone());
        Ok(lookup)
    }

    /// Logs a skipped operation and records it in the report
    pub fn record_error(&mut self, msg: String) {
        warn!(%msg);
        self.report.error(msg);
    }

    /// Consumes the context, returning the final index, the report and
    /// the carried pairs
    pub fn finish(self) -> (SnapshotIndex, SyncReport, LinkTable) {
        (self.index, self.report, self.carried)
    }
}
