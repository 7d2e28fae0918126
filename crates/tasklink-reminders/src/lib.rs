//! tasklink Reminders - Apple Reminders access through `osascript`
//!
//! The reminder list is driven by a JavaScript for Automation script that
//! talks to EventKit. Each store operation runs the script once with a JSON
//! request and reads back a single JSON response.
//!
//! ## Modules
//!
//! - [`bridge`] - Request/response codec and the `osascript` process runner
//! - [`script`] - The embedded EventKit script
//! - [`store`] - `ILocalReminderStore` implementation

pub mod bridge;
pub mod script;
pub mod store;

pub use store::OsascriptReminderStore;

use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to the Reminders bridge
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The bridge process did not answer in time
    #[error("Reminders bridge timed out after {0:?}")]
    Timeout(Duration),

    /// The bridge process could not be started
    #[error("Failed to start osascript: {0}")]
    Spawn(#[source] std::io::Error),

    /// The bridge ran but reported a failure
    #[error("Reminders bridge error: {0}")]
    Bridge(String),

    /// The bridge answered with something that is not a valid response
    #[error("Invalid bridge output: {0}")]
    InvalidOutput(String),
}
