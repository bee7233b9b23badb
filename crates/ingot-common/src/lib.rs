//! Ingot Common - Shared types, errors, and utilities
//!
//! This crate provides the foundational types used across all Ingot components:
//! - Error types (`IngotError`) and the crate-wide `Result` alias
//! - Item and save-result models
//! - Lock key derivation

pub mod error;
pub mod model;
pub mod utils;

// Re-exports for convenience
pub use error::{IngotError, Result};
pub use model::{Item, SaveOutcome, SaveResult};
pub use utils::{content_lock_key, content_preview};

/// Default lock time-to-live in seconds
pub const DEFAULT_LOCK_TTL_SECS: u64 = 30;

/// Namespace prefix for content lock keys
pub const LOCK_KEY_PREFIX: &str = "item-lock:";
