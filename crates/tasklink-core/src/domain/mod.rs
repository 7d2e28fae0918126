//! Domain entities and value types
//!
//! This module contains the core domain types for tasklink:
//! - Newtypes for canonical store identifiers
//! - Remote tasks and their status vocabulary
//! - Local reminder items
//! - Due dates with calendar-date comparison
//! - The sync tag and its title normalization
//! - The persisted link table
//! - Domain-specific error types

pub mod due;
pub mod errors;
pub mod links;
pub mod newtypes;
pub mod reminder;
pub mod tag;
pub mod task;

// Re-export commonly used types
pub use due::{due_day, DueDate};
pub use errors::DomainError;
pub use links::LinkTable;
pub use newtypes::*;
pub use reminder::LocalItem;
pub use tag::SyncTag;
pub use task::{RemoteTask, StatusNames, TaskStatus};
