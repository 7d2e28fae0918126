//! tasklink Core - Domain types and port definitions
//!
//! This crate is the hexagonal core shared by every other tasklink crate:
//! - **Domain types** - `RemoteTask`, `LocalItem`, `DueDate`, `SyncTag`, `LinkTable`
//! - **Port definitions** - Traits for adapters: `IRemoteTaskSource`,
//!   `ILocalReminderStore`, `ILinkStore`
//! - **Configuration** - Typed YAML configuration with environment overrides
//!
//! # Architecture
//!
//! The domain module holds pure values with no I/O. Ports define the
//! async trait interfaces that the Notion, Reminders and state adapters
//! implement, and that the sync engine consumes.

pub mod config;
pub mod domain;
pub mod ports;
