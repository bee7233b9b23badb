//! Ingot Core - Duplicate-safe ingestion
//!
//! Combines the lock coordinator and an item store so that concurrent
//! submissions of identical content persist exactly one item, while distinct
//! content proceeds in parallel.

pub mod service;

pub use service::ingestion::{IngestionConfig, IngestionService};
