//! Persisted table of active links between remote tasks and local items

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::newtypes::{LocalId, RemoteId};

/// Mapping from remote id to local id for every active (not completed) pair
///
/// This is the only state carried between runs. It does not mirror either
/// store; it records that a pair was seen matched, so that a later
/// one-sided absence can be read as a deletion. Serialized as
/// `{"synced_pairs": {"<remote id>": "<local id>"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTable {
    #[serde(default)]
    synced_pairs: BTreeMap<RemoteId, LocalId>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pair, replacing any previous local id for the remote id
    pub fn insert(&mut self, remote: RemoteId, local: LocalId) -> Option<LocalId> {
        self.synced_pairs.insert(remote, local)
    }

    pub fn remove(&mut self, remote: &RemoteId) -> Option<LocalId> {
        self.synced_pairs.remove(remote)
    }

    pub fn get(&self, remote: &RemoteId) -> Option<&LocalId> {
        self.synced_pairs.get(remote)
    }

    pub fn contains(&self, remote: &RemoteId) -> bool {
        self.synced_pairs.contains_key(remote)
    }

    pub fn len(&self) -> usize {
        self.synced_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synced_pairs.is_empty()
    }

    /// Pairs in remote-id order
    pub fn iter(&self) -> impl Iterator<Item = (&RemoteId, &LocalId)> {
        self.synced_pairs.iter()
    }
}

impl FromIterator<(RemoteId, LocalId)> for LinkTable {
    fn from_iter<I: IntoIterator<Item = (RemoteId, LocalId)>>(iter: I) -> Self {
        Self {
            synced_pairs: iter.into_iter().collect(),
        }
    }
}
