// In-memory lock backend
// Single-process stand-in for a shared coordination store, with automatic expiry

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval};
use tracing::{debug, info};

use ingot_common::Result;

use super::backend::LockBackend;

struct LockEntry {
    value: String,
    /// `None` when the TTL reaches past the clock's range
    expires_at: Option<Instant>,
}

impl LockEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory lock backend using DashMap
///
/// Set-if-absent goes through the shard-locked entry API and compare-and-delete
/// through `remove_if`, so both are atomic per key while distinct keys never
/// contend on a shared mutex. Expired entries are treated as absent on access
/// and purged by the optional background sweeper.
pub struct MemoryLockBackend {
    entries: Arc<DashMap<String, LockEntry>>,
    cleanup_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for MemoryLockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLockBackend {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            cleanup_handle: Mutex::new(None),
        }
    }

    /// Start the background expiry sweeper. Requires a tokio runtime.
    pub fn with_cleanup(self, cleanup_interval: Duration) -> Self {
        let entries = self.entries.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(cleanup_interval);
            loop {
                ticker.tick().await;
                Self::cleanup_expired(&entries);
            }
        });

        *self.cleanup_handle.lock() = Some(handle);
        info!(
            interval_ms = cleanup_interval.as_millis() as u64,
            "MemoryLockBackend initialized with background expiry task"
        );
        self
    }

    /// Stop the background sweeper
    pub fn shutdown(&self) {
        if let Some(handle) = self.cleanup_handle.lock().take() {
            handle.abort();
            debug!("MemoryLockBackend expiry task stopped");
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cleanup_expired(entries: &DashMap<String, LockEntry>) {
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let alive = entries.len();

        metrics::gauge!("ingot_lock_entries_alive").set(alive as f64);

        let removed = before.saturating_sub(alive);
        if removed > 0 {
            debug!(count = removed, "Cleaned up expired lock entries");
        }
    }
}

impl Drop for MemoryLockBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl LockBackend for MemoryLockBackend {
    async fn set_if_not_exists(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let fresh = LockEntry {
            value: value.to_string(),
            expires_at: now.checked_add(ttl),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired(now) {
                    return Ok(false);
                }
                occupied.insert(fresh);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove_if(key, |_, entry| {
                entry.value == expected && !entry.is_expired(now)
            })
            .is_some())
    }
}
