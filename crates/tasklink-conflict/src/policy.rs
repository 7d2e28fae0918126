//! Conflict resolution policy
//!
//! Decides which side of a diverged pair is authoritative and turns a
//! [`FieldConflict`] into a [`Resolution`] describing the writes to make.
//!
//! The default `timestamp` strategy compares last-modified times: the local
//! side wins when either timestamp is missing or when the local edit is at
//! least as recent as the remote one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use tasklink_core::domain::DueDate;

use crate::detector::FieldConflict;
use crate::error::ConflictError;

/// How to pick the authoritative side of a diverged pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Most recent edit wins; local wins ties and missing timestamps
    #[default]
    Timestamp,
    /// Always push local fields to the remote store
    PreferLocal,
    /// Always pull remote fields into the local store
    PreferRemote,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timestamp => "timestamp",
            Self::PreferLocal => "prefer_local",
            Self::PreferRemote => "prefer_remote",
        };
        f.write_str(name)
    }
}

impl FromStr for ConflictStrategy {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(Self::Timestamp),
            "prefer_local" => Ok(Self::PreferLocal),
            "prefer_remote" => Ok(Self::PreferRemote),
            other => Err(ConflictError::UnknownStrategy(other.to_string())),
        }
    }
}

/// The side whose field values are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Local,
    Remote,
}

/// Change to apply to a due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueUpdate {
    Set(DueDate),
    Clear,
}

impl DueUpdate {
    fn from_option(due: Option<DueDate>) -> Self {
        match due {
            Some(due) => Self::Set(due),
            None => Self::Clear,
        }
    }
}

/// Writes needed to converge a diverged pair
///
/// Only fields that actually differ are populated, so each can be pushed
/// independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Push local values to the remote task
    UpdateRemote {
        title: Option<String>,
        due: Option<DueUpdate>,
    },
    /// Pull remote values into the local item
    UpdateLocal {
        title: Option<String>,
        due: Option<DueUpdate>,
    },
}

/// Resolution policy built from the configured strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictPolicy {
    strategy: ConflictStrategy,
}

impl ConflictPolicy {
    pub fn new(strategy: ConflictStrategy) -> Self {
        Self { strategy }
    }

    /// Build from a configuration value such as `"timestamp"`
    pub fn from_name(name: &str) -> Result<Self, ConflictError> {
        name.parse().map(Self::new)
    }

    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Picks the authoritative side given both modification times
    pub fn winner(
        &self,
        local_modified: Option<DateTime<Utc>>,
        remote_modified: Option<DateTime<Utc>>,
    ) -> Winner {
        match self.strategy {
            ConflictStrategy::PreferLocal => Winner::Local,
            ConflictStrategy::PreferRemote => Winner::Remote,
            ConflictStrategy::Timestamp => match (local_modified, remote_modified) {
                (Some(local), Some(remote)) if local < remote => Winner::Remote,
                _ => Winner::Local,
            },
        }
    }

    /// Turns a detected conflict into the writes that resolve it
    pub fn resolve(&self, conflict: &FieldConflict) -> Resolution {
        let winner = self.winner(conflict.local_modified, conflict.remote_modified);
        trace!(strategy = %self.strategy, ?winner, "Resolving field conflict");

        match winner {
            Winner::Local => Resolution::UpdateRemote {
                title: conflict
                    .title_changed
                    .then(|| conflict.local_title.clone()),
                due: conflict
                    .due_changed
                    .then(|| DueUpdate::from_option(conflict.local_due)),
            },
            Winner::Remote => Resolution::UpdateLocal {
                title: conflict
                    .title_changed
                    .then(|| conflict.remote_title.clone()),
                due: conflict
                    .due_changed
                    .then(|| DueUpdate::from_option(conflict.remote_due)),
            },
        }
    }
}
