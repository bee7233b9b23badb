//! Distributed lock implementation
//!
//! This module provides:
//! - Lock data model (tokens, statistics)
//! - Backend contract and in-memory backend
//! - Fail-fast acquire and atomic token-checked release

mod backend;
mod coordinator;
mod memory;
mod model;

pub use backend::*;
pub use coordinator::*;
pub use memory::*;
pub use model::*;
