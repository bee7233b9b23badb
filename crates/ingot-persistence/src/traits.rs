//! Item persistence trait
//!
//! Defines the interface the ingestion core uses to query and persist items.
//! Stores do not enforce content uniqueness themselves; callers serialize
//! check-then-save per content through the lock coordinator.

use async_trait::async_trait;

use ingot_common::{Item, Result};

use crate::model::StorageMode;

/// Item persistence operations
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Find every item whose content is exactly `content`
    async fn find_items_with_content(&self, content: &str) -> Result<Vec<Item>>;

    /// Persist a new item and return it with its generated id
    async fn save_item(&self, content: &str) -> Result<Item>;

    /// List all items
    async fn get_all_items(&self) -> Result<Vec<Item>>;

    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<()>;
}
