//! Lock coordinator
//!
//! Wraps a [`LockBackend`] with fail-fast acquisition, per-acquisition
//! ownership tokens, and release through the backend's atomic
//! compare-and-delete. Lock entries exist only in the backend; the coordinator
//! keeps no per-key state, so independent keys never serialize against each
//! other and any number of processes can share one backend.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, warn};

use ingot_common::{IngotError, Result};

use super::backend::LockBackend;
use super::model::{LockStats, LockStatsCollector, LockToken};

/// Fail-fast distributed lock coordinator
#[derive(Clone)]
pub struct LockCoordinator {
    backend: Arc<dyn LockBackend>,
    stats: Arc<LockStatsCollector>,
}

impl LockCoordinator {
    pub fn new(backend: Arc<dyn LockBackend>) -> Self {
        Self {
            backend,
            stats: Arc::new(LockStatsCollector::default()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn LockBackend> {
        &self.backend
    }

    /// Try to take the lock for `key` once.
    ///
    /// Returns the ownership token on success and `None` when a live entry
    /// already exists. Never waits and never retries.
    pub async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockToken>> {
        let token = LockToken::generate();

        let created = self
            .backend
            .set_if_not_exists(key, token.as_str(), ttl)
            .await
            .map_err(|e| self.backend_error(e))?;

        if created {
            self.stats
                .total_acquisitions
                .fetch_add(1, Ordering::Relaxed);
            metrics::counter!("ingot_lock_acquisitions_total").increment(1);
            debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Lock acquired");
            Ok(Some(token))
        } else {
            self.stats
                .failed_acquisitions
                .fetch_add(1, Ordering::Relaxed);
            metrics::counter!("ingot_lock_contentions_total").increment(1);
            debug!(key = %key, "Lock held by another owner");
            Ok(None)
        }
    }

    /// Release the lock for `key` if it is still held by `token`.
    ///
    /// Returns `false` when the entry already expired or now belongs to a
    /// later acquirer. That case leaves the backend untouched.
    pub async fn release(&self, key: &str, token: &LockToken) -> Result<bool> {
        let released = self
            .backend
            .compare_and_delete(key, token.as_str())
            .await
            .map_err(|e| self.backend_error(e))?;

        if released {
            self.stats.total_releases.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("ingot_lock_releases_total").increment(1);
            debug!(key = %key, "Lock released");
        } else {
            self.stats.release_races.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("ingot_lock_release_races_total").increment(1);
            debug!(key = %key, "Lock no longer owned by this token, release skipped");
        }

        Ok(released)
    }

    /// Scoped acquisition: the returned guard releases the lock when
    /// [`LockGuard::release`] is awaited or, failing that, when it is dropped.
    pub async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockGuard>> {
        Ok(self
            .try_acquire(key, ttl)
            .await?
            .map(|token| LockGuard {
                coordinator: self.clone(),
                key: key.to_string(),
                token,
                released: false,
            }))
    }

    pub fn stats(&self) -> LockStats {
        self.stats.snapshot()
    }

    fn backend_error(&self, e: IngotError) -> IngotError {
        self.stats.backend_errors.fetch_add(1, Ordering::Relaxed);
        match e {
            IngotError::BackendUnavailable(_) => e,
            other => IngotError::BackendUnavailable(other.to_string()),
        }
    }
}

/// A held lock. Release is best-effort: failures are logged, never returned,
/// and a lock that cannot be released is reclaimed by its TTL.
pub struct LockGuard {
    coordinator: LockCoordinator,
    key: String,
    token: LockToken,
    released: bool,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &LockToken {
        &self.token
    }

    /// Release the lock now. Returns whether this guard's entry was deleted.
    pub async fn release(mut self) -> bool {
        self.released = true;
        match self.coordinator.release(&self.key, &self.token).await {
            Ok(released) => released,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Lock release failed, entry left to expire");
                false
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Unwinding or a cancelled future skipped the explicit release
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let coordinator = self.coordinator.clone();
                let key = std::mem::take(&mut self.key);
                let token = self.token.clone();
                handle.spawn(async move {
                    if let Err(e) = coordinator.release(&key, &token).await {
                        warn!(key = %key, error = %e, "Deferred lock release failed");
                    }
                });
            }
            Err(_) => {
                warn!(key = %self.key, "Lock guard dropped outside a runtime, entry left to expire");
            }
        }
    }
}
