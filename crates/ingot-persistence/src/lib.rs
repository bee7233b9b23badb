//! Ingot Persistence - Item store abstraction and storage backends
//!
//! This crate provides:
//! - The `ItemStore` trait the ingestion core depends on
//! - An in-memory store for tests and ephemeral runs
//! - An embedded RocksDB store for standalone deployments

pub mod embedded;
pub mod memory;
pub mod model;
pub mod traits;

pub use embedded::EmbeddedItemStore;
pub use memory::MemoryItemStore;
pub use model::StorageMode;
pub use traits::ItemStore;
