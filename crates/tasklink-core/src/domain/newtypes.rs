//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for the identifiers that
//! cross store boundaries. Each newtype normalizes and validates its input
//! at construction time, so two ids that compare equal always refer to
//! the same record.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// RemoteId
// ============================================================================

/// Number of hex digits in a canonical remote task identifier
pub const REMOTE_ID_LEN: usize = 32;

/// Identifier of a task in the remote store
///
/// Remote page ids arrive either hyphenated (`8-4-4-4-12`) or as a bare
/// 32-digit hex string, sometimes upper-cased. `RemoteId` always holds the
/// dash-free, lower-case form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId, normalizing to the canonical form
    ///
    /// # Errors
    /// Returns error if the input is not 32 hex digits once dashes are removed
    pub fn new(id: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = id.as_ref();
        let canonical: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if canonical.len() != REMOTE_ID_LEN || !canonical.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidRemoteId(format!(
                "expected {REMOTE_ID_LEN} hex digits, got '{raw}'"
            )));
        }

        Ok(Self(canonical))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hyphenated `8-4-4-4-12` rendering, as shown by the remote store's UI
    #[must_use]
    pub fn hyphenated(&self) -> String {
        let s = &self.0;
        format!(
            "{}-{}-{}-{}-{}",
            &s[0..8],
            &s[8..12],
            &s[12..16],
            &s[16..20],
            &s[20..32]
        )
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// LocalId
// ============================================================================

/// Identifier of an item in the local reminder store
///
/// Opaque and store-assigned; the only requirement is that it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalId(String);

impl LocalId {
    /// Create a new LocalId
    ///
    /// # Errors
    /// Returns error if the id is empty or only whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidLocalId(
                "Local ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LocalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LocalId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LocalId> for String {
    fn from(id: LocalId) -> Self {
        id.0
    }
}
