//! tasklink Notion - Notion API client
//!
//! Provides an async client for:
//! - Querying a task database with assignee, status and type filters
//! - Reading and patching individual task pages
//! - Creating task pages
//! - Listing workspace users for diagnostics
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client and status mapping
//! - [`pages`] - Page payloads and their conversion to `RemoteTask`
//! - [`query`] - Database query filters and pagination bodies
//! - [`provider`] - `IRemoteTaskSource` implementation
//! - [`users`] - Users endpoints for the `whoami` diagnostic

pub mod client;
pub mod pages;
pub mod provider;
pub mod query;
pub mod users;

pub use client::NotionClient;
pub use provider::NotionTaskSource;

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when communicating with the Notion API
#[derive(Debug, Error)]
pub enum NotionError {
    /// The integration token is missing, invalid or revoked
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The integration lacks access to the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested page or database does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay requested by the server, if it sent one
        retry_after: Option<Duration>,
    },

    /// Any other non-success response
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NotionError {
    /// Returns true for a definitive "no such page" answer
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
