//! Link store port (driven/secondary port)
//!
//! Persistence for the [`LinkTable`] between runs. It is read once at the
//! start of a run and overwritten once at the end.

use crate::domain::LinkTable;

#[async_trait::async_trait]
pub trait ILinkStore: Send + Sync {
    /// Load the table written by the previous run
    ///
    /// A missing table is not an error and yields an empty one.
    async fn load(&self) -> anyhow::Result<LinkTable>;

    /// Replace the stored table
    async fn save(&self, table: &LinkTable) -> anyhow::Result<()>;
}
