//! OsascriptReminderStore - ILocalReminderStore implementation
//!
//! Every operation is one bridge call scoped to the configured list. The
//! list is created by the script on first use if it does not exist.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use tasklink_core::config::RemindersConfig;
use tasklink_core::domain::{LocalId, LocalItem};
use tasklink_core::ports::{ILocalReminderStore, NewReminder, ReminderUpdate};

use crate::bridge::{BridgeRequest, OsascriptBridge, WireDue, WireItem};
use crate::ReminderError;

/// Extra time given to the process beyond the permission wait itself
const ACCESS_GRACE: Duration = Duration::from_secs(5);

/// Local reminder store backed by Apple Reminders
#[derive(Debug, Clone)]
pub struct OsascriptReminderStore {
    bridge: OsascriptBridge,
    list_name: String,
}

impl OsascriptReminderStore {
    pub fn new(bridge: OsascriptBridge, list_name: impl Into<String>) -> Self {
        Self {
            bridge,
            list_name: list_name.into(),
        }
    }

    pub fn from_config(config: &RemindersConfig) -> Self {
        Self::new(
            OsascriptBridge::new(&config.osascript_path),
            config.list_name.clone(),
        )
    }

    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    async fn call(&self, request: BridgeRequest) -> Result<Value> {
        let op = request.op();
        self.bridge
            .call(&request)
            .await
            .with_context(|| format!("Reminders operation {op} failed"))
    }
}

fn decode_item(value: Value) -> Result<LocalItem, ReminderError> {
    let wire: WireItem =
        serde_json::from_value(value).map_err(|e| ReminderError::InvalidOutput(e.to_string()))?;
    LocalItem::try_from(wire)
}

#[async_trait::async_trait]
impl ILocalReminderStore for OsascriptReminderStore {
    async fn request_access(&self, timeout: Duration) -> Result<bool> {
        let request = BridgeRequest::RequestAccess {
            timeout_secs: timeout.as_secs().max(1),
        };
        let value = self
            .bridge
            .call_with_timeout(&request, timeout + ACCESS_GRACE)
            .await
            .context("Failed to request Reminders access")?;

        let granted = value
            .as_bool()
            .ok_or_else(|| ReminderError::InvalidOutput(format!("expected a boolean, got {value}")))?;
        info!(granted, "Reminders access request answered");
        Ok(granted)
    }

    async fn list_items(&self) -> Result<Vec<LocalItem>> {
        let value = self
            .call(BridgeRequest::ListItems {
                list: self.list_name.clone(),
            })
            .await?;

        let wires: Vec<WireItem> = serde_json::from_value(value)
            .map_err(|e| ReminderError::InvalidOutput(e.to_string()))?;

        let mut items = Vec::with_capacity(wires.len());
        for wire in wires {
            let id = wire.id.clone();
            match LocalItem::try_from(wire) {
                Ok(item) => items.push(item),
                Err(e) => warn!(local_id = %id, error = %e, "Skipping reminder without a usable id"),
            }
        }

        debug!(list = %self.list_name, count = items.len(), "Listed reminders");
        Ok(items)
    }

    async fn create_item(&self, item: &NewReminder) -> Result<LocalItem> {
        let value = self
            .call(BridgeRequest::CreateItem {
                list: self.list_name.clone(),
                title: item.title.clone(),
                due: item.due.as_ref().map(WireDue::from),
                notes: item.notes.clone(),
                url: item.url.clone(),
                tag: item.tag.clone(),
            })
            .await?;
        let created = decode_item(value)?;
        debug!(local_id = %created.id, title = %created.title, "Created reminder");
        Ok(created)
    }

    async fn update_item(&self, id: &LocalId, update: &ReminderUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.call(BridgeRequest::UpdateItem {
            id: id.as_str().to_string(),
            title: update.title.clone(),
            due: if update.clear_due {
                None
            } else {
                update.due.as_ref().map(WireDue::from)
            },
            clear_due: update.clear_due,
        })
        .await?;
        Ok(())
    }

    async fn complete_item(&self, id: &LocalId) -> Result<()> {
        self.call(BridgeRequest::CompleteItem {
            id: id.as_str().to_string(),
        })
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: &LocalId) -> Result<()> {
        self.call(BridgeRequest::DeleteItem {
            id: id.as_str().to_string(),
        })
        .await?;
        Ok(())
    }

    async fn get_item(&self, id: &LocalId) -> Result<Option<LocalItem>> {
        let value = self
            .call(BridgeRequest::GetItem {
                id: id.as_str().to_string(),
            })
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(decode_item(value)?))
    }

    async fn set_url(&self, id: &LocalId, url: &str) -> Result<()> {
        self.call(BridgeRequest::SetUrl {
            id: id.as_str().to_string(),
            url: url.to_string(),
        })
        .await?;
        Ok(())
    }
}
