// Ingestion service
// Serializes the duplicate check and the save per content key through the lock coordinator

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use ingot_common::{DEFAULT_LOCK_TTL_SECS, IngotError, Item, Result, SaveResult, content_lock_key};
use ingot_consistency::LockCoordinator;
use ingot_persistence::ItemStore;

/// Ingestion settings
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Lock time-to-live. Must comfortably exceed the store's save latency,
    /// otherwise the lock can expire mid-save and let a duplicate through.
    pub lock_ttl: Duration,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_secs(DEFAULT_LOCK_TTL_SECS),
        }
    }
}

/// Duplicate-safe ingestion over a shared lock backend and item store
pub struct IngestionService {
    coordinator: LockCoordinator,
    store: Arc<dyn ItemStore>,
    config: IngestionConfig,
}

impl IngestionService {
    pub fn new(
        coordinator: LockCoordinator,
        store: Arc<dyn ItemStore>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            coordinator,
            store,
            config,
        }
    }

    pub fn coordinator(&self) -> &LockCoordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Save `content` unless it already exists or is being saved elsewhere.
    ///
    /// Contention and duplicates are reported in the returned [`SaveResult`].
    /// `Err` means infrastructure failure: `BackendUnavailable` when the lock
    /// could not be attempted, `StoreFailure` for any error raised by the
    /// store during the check or the save (the lock is released before the
    /// error is returned).
    pub async fn save_item(&self, content: &str) -> Result<SaveResult> {
        let key = content_lock_key(content);

        let Some(guard) = self.coordinator.acquire(&key, self.config.lock_ttl).await? else {
            debug!(key = %key, "Content is being processed elsewhere");
            return Ok(SaveResult::contended(content));
        };

        let outcome = self.save_if_absent(content).await;

        if !guard.release().await {
            warn!(key = %key, "Lock was not held at release, TTL may be shorter than save latency");
        }

        outcome
    }

    /// Check-then-save, only ever called while holding the content lock
    async fn save_if_absent(&self, content: &str) -> Result<SaveResult> {
        let existing = self
            .store
            .find_items_with_content(content)
            .await
            .map_err(store_error)?;
        if !existing.is_empty() {
            metrics::counter!("ingot_items_duplicate_total").increment(1);
            debug!("Duplicate content rejected");
            return Ok(SaveResult::duplicate(content));
        }

        let item = self.store.save_item(content).await.map_err(store_error)?;
        metrics::counter!("ingot_items_saved_total").increment(1);
        info!(id = %item.id, "Item saved");
        Ok(SaveResult::saved(&item))
    }

    /// Save every content concurrently; results are in input order
    pub async fn save_items<S: AsRef<str>>(&self, contents: &[S]) -> Vec<Result<SaveResult>> {
        join_all(
            contents
                .iter()
                .map(|content| self.save_item(content.as_ref())),
        )
        .await
    }

    /// All stored items, straight from the store without locking
    pub async fn get_all_items(&self) -> Result<Vec<Item>> {
        self.store.get_all_items().await.map_err(store_error)
    }
}

/// Report every store error as `StoreFailure` so it can never be confused
/// with a lock backend outage
fn store_error(e: IngotError) -> IngotError {
    match e {
        IngotError::StoreFailure(_) => e,
        other => IngotError::StoreFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingot_common::SaveOutcome;
    use ingot_consistency::MemoryLockBackend;
    use ingot_persistence::MemoryItemStore;

    #[test]
    fn test_store_error_is_normalized() {
        assert_eq!(
            store_error(IngotError::BackendUnavailable("db conn reset".to_string())),
            IngotError::StoreFailure("lock backend unavailable: db conn reset".to_string())
        );
        assert_eq!(
            store_error(IngotError::StoreFailure("disk full".to_string())),
            IngotError::StoreFailure("disk full".to_string())
        );
    }

    fn service() -> (IngestionService, Arc<MemoryItemStore>, Arc<MemoryLockBackend>) {
        let backend = Arc::new(MemoryLockBackend::new());
        let store = Arc::new(MemoryItemStore::new());
        let service = IngestionService::new(
            LockCoordinator::new(backend.clone()),
            store.clone(),
            IngestionConfig::default(),
        );
        (service, store, backend)
    }

    #[tokio::test]
    async fn test_sequential_duplicate() {
        let (service, store, backend) = service();

        let first = service.save_item("foo").await.unwrap();
        assert!(first.success);
        assert!(first.saved_id().is_some());

        let second = service.save_item("foo").await.unwrap();
        assert!(!second.success);
        assert_eq!(second.outcome, SaveOutcome::Duplicate);
        assert!(second.message.contains("duplicate content"));

        assert_eq!(store.len(), 1);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_contended_when_lock_held() {
        let (service, store, _backend) = service();
        let key = content_lock_key("foo");

        let held = service
            .coordinator()
            .try_acquire(&key, Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();

        let result = service.save_item("foo").await.unwrap();
        assert!(!result.success);
        assert!(result.is_contended());
        assert!(store.is_empty());

        service.coordinator().release(&key, &held).await.unwrap();
        assert!(service.save_item("foo").await.unwrap().success);
    }

    #[tokio::test]
    async fn test_save_items_preserves_order() {
        let (service, _store, _backend) = service();

        let results = service.save_items(&["a", "b", "a"]).await;
        assert_eq!(results.len(), 3);
        assert!(results[1].as_ref().unwrap().success);

        // Exactly one of the two "a" submissions wins
        let a_wins = [0, 2]
            .iter()
            .filter(|&&i| results[i].as_ref().unwrap().success)
            .count();
        assert_eq!(a_wins, 1);

        let mut contents: Vec<String> = service
            .get_all_items()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.content)
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["a", "b"]);
    }
}
