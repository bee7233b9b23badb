//! Error types for Ingot
//!
//! Only infrastructure failures are errors. Lock contention and duplicate
//! content are expected outcomes and travel as [`crate::SaveResult`] values.

/// Application-specific error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IngotError {
    /// The coordination backend could not be reached or rejected the command
    #[error("lock backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The item store failed to read or persist
    #[error("store failure: {0}")]
    StoreFailure(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl IngotError {
    /// Whether the caller may reasonably retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IngotError::BackendUnavailable(_) | IngotError::StoreFailure(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, IngotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            IngotError::BackendUnavailable("connection refused".to_string()).to_string(),
            "lock backend unavailable: connection refused"
        );
        assert_eq!(
            IngotError::StoreFailure("disk full".to_string()).to_string(),
            "store failure: disk full"
        );
        assert_eq!(
            IngotError::ConfigError("lock.ttl_secs must be positive".to_string()).to_string(),
            "configuration error: lock.ttl_secs must be positive"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(IngotError::BackendUnavailable(String::new()).is_retryable());
        assert!(IngotError::StoreFailure(String::new()).is_retryable());
        assert!(!IngotError::ConfigError(String::new()).is_retryable());
    }
}
