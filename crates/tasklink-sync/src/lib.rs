//! tasklink Sync - Notion and Reminders reconciliation engine
//!
//! Provides:
//! - One-shot bidirectional reconciliation of tasks and reminders
//! - Deletion detection from the persisted link table
//! - Status propagation in both directions
//! - Dry-run planning with an identical action report
//! - Reference URL backfill for untracked reminders
//!
//! ## Modules
//!
//! - [`engine`] - Sync engine running the reconciliation passes
//! - [`linker`] - Remote id extraction from reminder URLs
//! - [`index`] - In-memory snapshot index for one run
//! - [`report`] - Run reports and action lists
//! - [`state`] - JSON file link store
//! - [`backfill`] - The `fix-urls` mode
//! - [`dry_run`] - Store wrappers that drop writes

pub mod backfill;
pub mod dry_run;
pub mod engine;
pub mod index;
pub mod linker;
mod passes;
pub mod report;
pub mod state;

#[cfg(test)]
mod testing;

pub use backfill::UrlBackfill;
pub use engine::{SyncEngine, SyncSettings};
pub use report::{ActionKind, BackfillReport, SyncAction, SyncReport};
pub use state::JsonLinkStore;

use thiserror::Error;

/// Errors that abort a sync run
///
/// Failures of individual store operations never surface here; they are
/// recorded in the run report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The user or the OS refused access to the local reminder store
    #[error("Reminders access was not granted")]
    AccessDenied,

    /// The access request itself failed or timed out
    #[error("Reminders access request failed: {0}")]
    AccessRequest(String),

    /// A store could not be listed, so the run cannot tell what changed
    #[error("Failed to fetch {store} snapshot: {message}")]
    Snapshot {
        store: &'static str,
        message: String,
    },

    /// A configuration value the engine depends on is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A domain-level error propagated from tasklink-core
    #[error("Domain error: {0}")]
    DomainError(#[from] tasklink_core::domain::DomainError),
}
