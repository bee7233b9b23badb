//! Ingot Consistency - Content-scoped distributed locking
//!
//! This crate provides:
//! - The `LockBackend` contract (set-if-absent with expiry, compare-and-delete)
//! - An in-memory backend with lazy and background expiry
//! - `LockCoordinator` with ownership tokens and scoped `LockGuard` release

pub mod lock;

// Re-export lock types
pub use lock::{
    LockBackend, LockCoordinator, LockGuard, LockStats, LockToken, MemoryLockBackend,
};
