//! Domain error types
//!
//! Errors raised while constructing or validating domain values, such as
//! identifiers read from a store or due dates parsed from API payloads.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A remote task identifier is not 32 hex digits once dashes are removed
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// A local item identifier is empty
    #[error("Invalid local ID: {0}")]
    InvalidLocalId(String),

    /// A due date string could not be parsed
    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    /// The sync tag is empty or has no word after its marker
    #[error("Invalid sync tag: {0}")]
    InvalidTag(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
