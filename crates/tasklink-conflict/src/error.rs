//! Error types for the conflict engine

use thiserror::Error;

/// Errors that can occur while configuring conflict resolution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// The configured strategy name is not recognised
    #[error("unknown conflict strategy '{0}'; valid: timestamp, prefer_local, prefer_remote")]
    UnknownStrategy(String),
}
