//! Coordination backend contract

use std::time::Duration;

use async_trait::async_trait;

use ingot_common::Result;

/// Key-value coordination store holding lock entries with expiry.
///
/// Every method must be linearizable per key. Implementations report
/// connectivity problems as `IngotError::BackendUnavailable`.
#[async_trait]
pub trait LockBackend: Send + Sync {
    /// Atomically store `value` under `key` with a time-to-live, only if no
    /// live entry exists. Returns whether the entry was created.
    async fn set_if_not_exists(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Current value of a live entry
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Atomically delete `key` only if its live value equals `expected`.
    ///
    /// Must be a single conditional operation on the backend (a scripted or
    /// transactional primitive). Composing `get` and an unconditional delete
    /// is not an implementation of this method.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool>;
}
