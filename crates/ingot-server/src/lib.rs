//! Ingot server - configuration, logging, and the `ingot` command line
//!
//! The library half exists so the binary's wiring can be tested directly.

pub mod command;
pub mod metrics;
pub mod model;
pub mod startup;
