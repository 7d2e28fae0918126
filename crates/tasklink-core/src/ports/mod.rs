//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. The sync engine depends only on these traits;
//! their implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteTaskSource`] - Remote task tracker (Notion database)
//! - [`ILocalReminderStore`] - Local reminder list (Apple Reminders)
//! - [`ILinkStore`] - Persistence for the link table between runs

pub mod link_store;
pub mod reminder_store;
pub mod remote_source;

pub use link_store::ILinkStore;
pub use reminder_store::{ILocalReminderStore, NewReminder, ReminderUpdate};
pub use remote_source::{IRemoteTaskSource, NewRemoteTask, StatusLookup};
