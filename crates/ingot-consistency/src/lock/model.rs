//! Lock data model

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ownership token stored as the value of a lock entry
///
/// A fresh token is generated for every acquisition, so a release carrying an
/// old token can never match an entry created by a later acquirer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockToken(String);

impl LockToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LockToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for LockToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lock statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStats {
    pub total_acquisitions: u64,
    pub failed_acquisitions: u64,
    pub total_releases: u64,
    /// Releases skipped because the entry had expired or changed hands
    pub release_races: u64,
    pub backend_errors: u64,
}

#[derive(Default)]
pub(crate) struct LockStatsCollector {
    pub(crate) total_acquisitions: AtomicU64,
    pub(crate) failed_acquisitions: AtomicU64,
    pub(crate) total_releases: AtomicU64,
    pub(crate) release_races: AtomicU64,
    pub(crate) backend_errors: AtomicU64,
}

impl LockStatsCollector {
    pub(crate) fn snapshot(&self) -> LockStats {
        LockStats {
            total_acquisitions: self.total_acquisitions.load(Ordering::Relaxed),
            failed_acquisitions: self.failed_acquisitions.load(Ordering::Relaxed),
            total_releases: self.total_releases.load(Ordering::Relaxed),
            release_races: self.release_races.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = LockToken::generate();
        let b = LockToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.as_str());
    }

    #[test]
    fn test_stats_snapshot() {
        let collector = LockStatsCollector::default();
        collector.total_acquisitions.fetch_add(3, Ordering::Relaxed);
        collector.release_races.fetch_add(1, Ordering::Relaxed);

        let stats = collector.snapshot();
        assert_eq!(stats.total_acquisitions, 3);
        assert_eq!(stats.release_races, 1);
        assert_eq!(stats.total_releases, 0);
    }
}
