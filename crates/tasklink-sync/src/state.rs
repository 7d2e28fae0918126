//! JSON file link store
//!
//! Stores the [`LinkTable`] as `{"synced_pairs": {...}}`. Writes go to a
//! temporary file in the same directory followed by a rename, so a crash
//! mid-write never leaves a truncated table behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use tasklink_core::domain::LinkTable;
use tasklink_core::ports::ILinkStore;

/// Link store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonLinkStore {
    path: PathBuf,
}

impl JsonLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut p = self.path.as_os_str().to_owned();
        p.push(".tmp");
        PathBuf::from(p)
    }
}

#[async_trait::async_trait]
impl ILinkStore for JsonLinkStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<LinkTable> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no link table yet, starting empty");
                return Ok(LinkTable::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read link table {}", self.path.display())
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(LinkTable::new());
        }

        let table: LinkTable = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse link table {}", self.path.display()))?;
        debug!(pairs = table.len(), "loaded link table");
        Ok(table)
    }

    #[instrument(skip(self, table), fields(path = %self.path.display(), pairs = table.len()))]
    async fn save(&self, table: &LinkTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let data = serde_json::to_vec_pretty(table).context("Failed to encode link table")?;
        let tmp_path = self.tmp_path();

        debug!(?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, &data)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("link table saved");
        Ok(())
    }
}
