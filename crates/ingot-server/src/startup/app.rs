// Backend construction and teardown
// Handles are built once at startup and passed into the service explicitly

use std::sync::Arc;

use tracing::info;

use ingot_common::Result;
use ingot_consistency::{LockCoordinator, MemoryLockBackend};
use ingot_core::IngestionService;
use ingot_persistence::{EmbeddedItemStore, ItemStore, MemoryItemStore, StorageMode};

use crate::model::config::Configuration;

/// Wired application: the ingestion service plus the handles it was built from
pub struct Application {
    pub service: IngestionService,
    lock_backend: Arc<MemoryLockBackend>,
    embedded_store: Option<Arc<EmbeddedItemStore>>,
}

impl Application {
    /// Build backends and the service. Must run inside a tokio runtime since
    /// the lock backend starts its expiry sweeper here.
    pub fn build(configuration: &Configuration) -> Result<Self> {
        let storage_mode = configuration.storage_mode()?;
        info!("Storage mode: {}", storage_mode);

        let (store, embedded_store): (Arc<dyn ItemStore>, Option<Arc<EmbeddedItemStore>>) =
            match storage_mode {
                StorageMode::Memory => (Arc::new(MemoryItemStore::new()), None),
                StorageMode::Embedded => {
                    let data_dir = configuration.embedded_data_dir();
                    info!("Initializing embedded storage at: {}", data_dir);
                    let embedded = Arc::new(EmbeddedItemStore::open(&data_dir)?);
                    (embedded.clone(), Some(embedded))
                }
            };

        let lock_backend = Arc::new(
            MemoryLockBackend::new().with_cleanup(configuration.lock_cleanup_interval()),
        );

        let ingestion_config = configuration.ingestion_config()?;
        info!(
            lock_ttl_secs = ingestion_config.lock_ttl.as_secs(),
            "Ingestion service ready"
        );

        let service = IngestionService::new(
            LockCoordinator::new(lock_backend.clone()),
            store,
            ingestion_config,
        );

        Ok(Self {
            service,
            lock_backend,
            embedded_store,
        })
    }

    /// Stop background tasks and flush storage
    pub fn shutdown(&self) -> Result<()> {
        self.lock_backend.shutdown();
        if let Some(store) = &self.embedded_store {
            store.flush()?;
        }

        let stats = self.service.coordinator().stats();
        info!(
            acquisitions = stats.total_acquisitions,
            contentions = stats.failed_acquisitions,
            release_races = stats.release_races,
            "Shutdown complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::Cli;
    use clap::Parser;

    fn configuration(args: &[&str]) -> Configuration {
        let cli = Cli::parse_from(std::iter::once("ingot").chain(args.iter().copied()));
        Configuration::new(&cli).unwrap()
    }

    #[tokio::test]
    async fn test_build_memory() {
        let app = Application::build(&configuration(&["list"])).unwrap();

        assert!(app.embedded_store.is_none());
        assert!(app.service.save_item("foo").await.unwrap().success);
        app.shutdown().unwrap();
    }

    #[tokio::test]
    async fn test_build_embedded_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let args = ["--storage-mode", "embedded", "--data-dir", data_dir, "list"];

        {
            let app = Application::build(&configuration(&args)).unwrap();
            assert!(app.service.save_item("foo").await.unwrap().success);
            app.shutdown().unwrap();
        }

        let app = Application::build(&configuration(&args)).unwrap();
        let result = app.service.save_item("foo").await.unwrap();
        assert!(result.is_duplicate());
        assert_eq!(app.service.get_all_items().await.unwrap().len(), 1);
        app.shutdown().unwrap();
    }
}
