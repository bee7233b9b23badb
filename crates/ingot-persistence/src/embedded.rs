// Embedded item store using RocksDB
// Provides standalone (single-node) storage without an external database

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use md5::{Digest, Md5};
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use tracing::{debug, info};
use uuid::Uuid;

use ingot_common::{IngotError, Item, Result};

use crate::model::StorageMode;
use crate::traits::ItemStore;

/// Items keyed by id, value is the JSON-encoded item
pub const CF_ITEMS: &str = "items";
/// Content index keyed by `md5(content)@@id`, empty values
pub const CF_ITEM_CONTENT: &str = "item_content";

/// Standalone embedded item store using RocksDB
///
/// Every save writes the item and its content index entry in one batch, so a
/// crash never leaves an item that `find_items_with_content` cannot see.
pub struct EmbeddedItemStore {
    db: Arc<DB>,
}

impl EmbeddedItemStore {
    /// Open (or create) a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_ITEMS, cf_opts.clone()),
            ColumnFamilyDescriptor::new(CF_ITEM_CONTENT, cf_opts),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cfs)
            .map_err(|e| IngotError::StoreFailure(format!("RocksDB open error: {}", e)))?;

        info!(path = %path.as_ref().display(), "Embedded item store opened");

        Ok(Self::new(Arc::new(db)))
    }

    /// Create from a raw RocksDB instance that already has the item column families
    pub fn new(db: Arc<DB>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> Arc<DB> {
        self.db.clone()
    }

    /// Flush memtables to disk
    pub fn flush(&self) -> Result<()> {
        for name in [CF_ITEMS, CF_ITEM_CONTENT] {
            let cf = self.cf(name)?;
            self.db
                .flush_cf(cf)
                .map_err(|e| IngotError::StoreFailure(format!("RocksDB flush error: {}", e)))?;
        }
        Ok(())
    }

    /// Get a column family handle
    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| IngotError::StoreFailure(format!("Column family '{}' not found", name)))
    }

    fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let cf = self.cf(CF_ITEMS)?;
        match self
            .db
            .get_cf(cf, id.as_bytes())
            .map_err(|e| IngotError::StoreFailure(format!("RocksDB get error: {}", e)))?
        {
            Some(bytes) => Ok(Some(decode_item(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Compute the index prefix for a content value
    fn content_prefix(content: &str) -> String {
        let digest = Md5::digest(content.as_bytes());
        format!("{}@@", const_hex::encode(digest.as_slice()))
    }
}

fn decode_item(bytes: &[u8]) -> Result<Item> {
    serde_json::from_slice(bytes)
        .map_err(|e| IngotError::StoreFailure(format!("corrupt item record: {}", e)))
}

#[async_trait]
impl ItemStore for EmbeddedItemStore {
    async fn find_items_with_content(&self, content: &str) -> Result<Vec<Item>> {
        let cf = self.cf(CF_ITEM_CONTENT)?;
        let prefix = Self::content_prefix(content);
        let mut items = Vec::new();

        let iter = self.db.prefix_iterator_cf(cf, prefix.as_bytes());
        for entry in iter {
            let (key, _) = entry
                .map_err(|e| IngotError::StoreFailure(format!("RocksDB iterator error: {}", e)))?;
            let key_str = String::from_utf8_lossy(&key);
            if !key_str.starts_with(&prefix) {
                break;
            }

            // Digest collisions are filtered by comparing the stored content
            let id = &key_str[prefix.len()..];
            if let Some(item) = self.get_item(id)?
                && item.content == content
            {
                items.push(item);
            }
        }

        Ok(items)
    }

    async fn save_item(&self, content: &str) -> Result<Item> {
        let item = Item::new(Uuid::new_v4().to_string(), content);
        let value = serde_json::to_vec(&item)
            .map_err(|e| IngotError::StoreFailure(format!("encode item: {}", e)))?;
        let index_key = format!("{}{}", Self::content_prefix(content), item.id);

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_ITEMS)?, item.id.as_bytes(), &value);
        batch.put_cf(self.cf(CF_ITEM_CONTENT)?, index_key.as_bytes(), b"");
        self.db
            .write(batch)
            .map_err(|e| IngotError::StoreFailure(format!("RocksDB write error: {}", e)))?;

        debug!(id = %item.id, "Item persisted");
        Ok(item)
    }

    async fn get_all_items(&self) -> Result<Vec<Item>> {
        let cf = self.cf(CF_ITEMS)?;
        let mut items = Vec::new();

        let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);
        for entry in iter {
            let (_, value) = entry
                .map_err(|e| IngotError::StoreFailure(format!("RocksDB iterator error: {}", e)))?;
            items.push(decode_item(&value)?);
        }

        Ok(items)
    }

    fn storage_mode(&self) -> StorageMode {
        StorageMode::Embedded
    }

    async fn health_check(&self) -> Result<()> {
        self.cf(CF_ITEMS)?;
        self.cf(CF_ITEM_CONTENT)?;
        Ok(())
    }
}
