//! Application startup utilities module.

mod app;
mod logging;

pub use app::Application;
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
