//! Bridge protocol and process runner
//!
//! A [`BridgeRequest`] is serialized to JSON and passed as the single
//! script argument. The script answers with a [`BridgeResponse`] on stdout.
//! Reminders travel as [`WireItem`]s and are converted to domain
//! [`LocalItem`]s here.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use tasklink_core::domain::{DueDate, LocalId, LocalItem};

use crate::script::EVENTKIT_BRIDGE;
use crate::ReminderError;

/// Default upper bound on one bridge call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Wire types
// ============================================================================

/// Due date as exchanged with the script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDue {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, absent for all-day reminders
    #[serde(default)]
    pub time: Option<String>,
}

impl From<&DueDate> for WireDue {
    fn from(due: &DueDate) -> Self {
        Self {
            date: due.date().format("%Y-%m-%d").to_string(),
            time: due.time().map(|t| t.format("%H:%M").to_string()),
        }
    }
}

impl WireDue {
    fn to_due(&self) -> Result<DueDate, ReminderError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| ReminderError::InvalidOutput(format!("due date '{}': {e}", self.date)))?;
        match &self.time {
            Some(time) => {
                let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|e| {
                    ReminderError::InvalidOutput(format!("due time '{time}': {e}"))
                })?;
                Ok(DueDate::at(date, time))
            }
            None => Ok(DueDate::on(date)),
        }
    }
}

/// A reminder as encoded by the script
#[derive(Debug, Clone, Deserialize)]
pub struct WireItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub due: Option<WireDue>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<WireItem> for LocalItem {
    type Error = ReminderError;

    fn try_from(item: WireItem) -> Result<Self, Self::Error> {
        let id = LocalId::new(item.id).map_err(|e| ReminderError::InvalidOutput(e.to_string()))?;
        let (due, due_unreadable) = match item.due.as_ref().map(WireDue::to_due).transpose() {
            Ok(due) => (due, false),
            Err(e) => {
                warn!(local_id = %id, error = %e, "Ignoring unreadable due date");
                (None, true)
            }
        };

        let last_modified = item.last_modified.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    warn!(local_id = %id, value = raw, error = %e, "Ignoring unreadable modification time");
                    None
                }
            }
        });

        Ok(LocalItem {
            id,
            title: item.title,
            due,
            due_unreadable,
            notes: item.notes.filter(|n| !n.is_empty()),
            url: item.url.filter(|u| !u.is_empty()),
            completed: item.completed,
            last_modified,
            tags: item.tags,
        })
    }
}

/// One bridge operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeRequest {
    RequestAccess {
        timeout_secs: u64,
    },
    ListItems {
        list: String,
    },
    CreateItem {
        list: String,
        title: String,
        due: Option<WireDue>,
        notes: Option<String>,
        url: Option<String>,
        tag: Option<String>,
    },
    UpdateItem {
        id: String,
        title: Option<String>,
        due: Option<WireDue>,
        clear_due: bool,
    },
    CompleteItem {
        id: String,
    },
    DeleteItem {
        id: String,
    },
    GetItem {
        id: String,
    },
    SetUrl {
        id: String,
        url: String,
    },
}

impl BridgeRequest {
    /// Operation name, for logging
    pub fn op(&self) -> &'static str {
        match self {
            Self::RequestAccess { .. } => "request_access",
            Self::ListItems { .. } => "list_items",
            Self::CreateItem { .. } => "create_item",
            Self::UpdateItem { .. } => "update_item",
            Self::CompleteItem { .. } => "complete_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::GetItem { .. } => "get_item",
            Self::SetUrl { .. } => "set_url",
        }
    }
}

/// The script's answer
#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl BridgeResponse {
    /// Parses the script's stdout
    pub fn parse(stdout: &str) -> Result<Self, ReminderError> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Err(ReminderError::InvalidOutput("empty output".to_string()));
        }
        serde_json::from_str(trimmed).map_err(|e| ReminderError::InvalidOutput(e.to_string()))
    }

    /// The result value, or the reported error
    pub fn into_result(self) -> Result<Value, ReminderError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(ReminderError::Bridge(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

// ============================================================================
// OsascriptBridge
// ============================================================================

/// Runs bridge requests through `osascript`
#[derive(Debug, Clone)]
pub struct OsascriptBridge {
    program: PathBuf,
    timeout: Duration,
}

impl OsascriptBridge {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one request with the default timeout
    pub async fn call(&self, request: &BridgeRequest) -> Result<Value, ReminderError> {
        self.call_with_timeout(request, self.timeout).await
    }

    /// Runs one request, killing the process if it outlives `timeout`
    ///
    /// # Errors
    /// - [`ReminderError::Spawn`] if the program cannot be started
    /// - [`ReminderError::Timeout`] if it does not finish in time
    /// - [`ReminderError::Bridge`] if it exits non-zero or reports an error
    /// - [`ReminderError::InvalidOutput`] if stdout is not a response
    pub async fn call_with_timeout(
        &self,
        request: &BridgeRequest,
        timeout: Duration,
    ) -> Result<Value, ReminderError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| ReminderError::InvalidOutput(e.to_string()))?;
        trace!(op = request.op(), payload = %payload, "Calling Reminders bridge");

        let child = Command::new(&self.program)
            .arg("-l")
            .arg("JavaScript")
            .arg("-e")
            .arg(EVENTKIT_BRIDGE)
            .arg(&payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ReminderError::Spawn)?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ReminderError::Timeout(timeout))?
            .map_err(ReminderError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ReminderError::Bridge(format!(
                "osascript exited with {}: {}",
                output.status, stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = BridgeResponse::parse(&stdout)?.into_result()?;
        debug!(op = request.op(), "Reminders bridge call succeeded");
        Ok(result)
    }
}
