//! In-memory snapshot of both stores for one run
//!
//! Built once from the fetched remote tasks and local items, then kept
//! current by the passes so that each pass sees the effects of the ones
//! before it: created items are registered, deleted items removed,
//! canceled tasks retired from the active set.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use tasklink_core::domain::{LinkTable, LocalId, LocalItem, RemoteId, RemoteTask, SyncTag};

use crate::linker;

/// Lookup structures over one run's snapshot
#[derive(Debug, Default)]
pub struct SnapshotIndex {
    remote: Vec<RemoteTask>,
    remote_pos: HashMap<RemoteId, usize>,
    retired: HashSet<RemoteId>,
    local: Vec<Option<LocalItem>>,
    local_pos: HashMap<LocalId, usize>,
    /// Remote id to the local item linking to it
    links: BTreeMap<RemoteId, LocalId>,
    /// Tagged, unlinked, open local items in snapshot order
    candidates: Vec<LocalId>,
}

impl SnapshotIndex {
    /// Indexes a snapshot
    ///
    /// Duplicate ids keep their first occurrence. When several local items
    /// link to the same remote task, the first one owns the link and the
    /// others are left unlinked for this run.
    pub fn build(remote: Vec<RemoteTask>, local: Vec<LocalItem>, tag: &SyncTag) -> Self {
        let mut index = Self::default();

        for task in remote {
            if index.remote_pos.contains_key(&task.id) {
                warn!(remote_id = %task.id, "Duplicate remote task in snapshot, ignoring");
                continue;
            }
            index.remote_pos.insert(task.id.clone(), index.remote.len());
            index.remote.push(task);
        }

        for item in local {
            if index.local_pos.contains_key(&item.id) {
                warn!(local_id = %item.id, "Duplicate local item in snapshot, ignoring");
                continue;
            }
            if linker::is_sync_candidate(&item, tag) {
                index.candidates.push(item.id.clone());
            }
            index.insert_local(item);
        }

        index
    }

    // ========================================================================
    // Remote side
    // ========================================================================

    /// A task of the active set, unless retired during this run
    pub fn remote(&self, id: &RemoteId) -> Option<&RemoteTask> {
        if self.retired.contains(id) {
            return None;
        }
        self.remote_pos.get(id).map(|&pos| &self.remote[pos])
    }

    pub fn remote_mut(&mut self, id: &RemoteId) -> Option<&mut RemoteTask> {
        if self.retired.contains(id) {
            return None;
        }
        let pos = *self.remote_pos.get(id)?;
        Some(&mut self.remote[pos])
    }

    /// True if the task is in the active set and not retired
    pub fn is_active(&self, id: &RemoteId) -> bool {
        self.remote(id).is_some()
    }

    /// Removes a task from the active set for the rest of the run
    pub fn retire(&mut self, id: &RemoteId) {
        self.retired.insert(id.clone());
    }

    /// Adds a task created during this run to the active set
    pub fn insert_remote(&mut self, task: RemoteTask) {
        if let Some(&pos) = self.remote_pos.get(&task.id) {
            self.remote[pos] = task;
            return;
        }
        self.remote_pos.insert(task.id.clone(), self.remote.len());
        self.remote.push(task);
    }

    /// Active tasks in snapshot order
    pub fn remote_tasks(&self) -> impl Iterator<Item = &RemoteTask> {
        self.remote.iter().filter(|t| !self.retired.contains(&t.id))
    }

    // ========================================================================
    // Local side
    // ========================================================================

    pub fn local(&self, id: &LocalId) -> Option<&LocalItem> {
        self.local_pos
            .get(id)
            .and_then(|&pos| self.local[pos].as_ref())
    }

    pub fn local_mut(&mut self, id: &LocalId) -> Option<&mut LocalItem> {
        let pos = *self.local_pos.get(id)?;
        self.local[pos].as_mut()
    }

    /// Local items still present, in snapshot order
    pub fn local_items(&self) -> impl Iterator<Item = &LocalItem> {
        self.local.iter().flatten()
    }

    /// Registers a local item and the link its URL carries
    pub fn insert_local(&mut self, item: LocalItem) {
        let link = linker::extract_link(&item);
        let id = item.id.clone();
        self.local_pos.insert(id.clone(), self.local.len());
        self.local.push(Some(item));
        if let Some(remote_id) = link {
            self.link(remote_id, id);
        }
    }

    /// Forgets a deleted local item and any link it owned
    pub fn remove_local(&mut self, id: &LocalId) -> Option<LocalItem> {
        let pos = *self.local_pos.get(id)?;
        let item = self.local[pos].take()?;
        self.links.retain(|_, local| local != id);
        self.candidates.retain(|c| c != id);
        Some(item)
    }

    /// Tagged, unlinked, open local items as classified at build time
    pub fn candidates(&self) -> Vec<LocalId> {
        self.candidates.clone()
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Records a link unless the remote task is already linked elsewhere
    pub fn link(&mut self, remote: RemoteId, local: LocalId) -> bool {
        match self.links.get(&remote) {
            Some(existing) if *existing != local => {
                warn!(
                    remote_id = %remote,
                    local_id = %local,
                    linked_to = %existing,
                    "Remote task already linked to another local item"
                );
                false
            }
            _ => {
                self.candidates.retain(|c| *c != local);
                self.links.insert(remote, local);
                true
            }
        }
    }

    pub fn linked_local(&self, remote: &RemoteId) -> Option<&LocalId> {
        self.links.get(remote)
    }

    /// Current links in remote-id order
    pub fn links(&self) -> Vec<(RemoteId, LocalId)> {
        self.links
            .iter()
            .map(|(r, l)| (r.clone(), l.clone()))
            .collect()
    }

    /// Links whose local item is present and not completed
    pub fn active_links(&self) -> LinkTable {
        self.links
            .iter()
            .filter(|(_, local)| self.local(local).is_some_and(|item| !item.completed))
            .map(|(r, l)| (r.clone(), l.clone()))
            .collect()
    }
}
