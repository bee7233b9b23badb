// In-memory item store
// Keeps items in insertion order; nothing survives a restart

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use ingot_common::{Item, Result};

use crate::model::StorageMode;
use crate::traits::ItemStore;

#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn find_items_with_content(&self, content: &str) -> Result<Vec<Item>> {
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| item.content == content)
            .cloned()
            .collect())
    }

    async fn save_item(&self, content: &str) -> Result<Item> {
        let item = Item::new(Uuid::new_v4().to_string(), content);
        self.items.write().push(item.clone());
        Ok(item)
    }

    async fn get_all_items(&self) -> Result<Vec<Item>> {
        Ok(self.items.read().clone())
    }

    fn storage_mode(&self) -> StorageMode {
        StorageMode::Memory
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
