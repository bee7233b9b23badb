use serde::{Deserialize, Serialize};

/// Storage mode for the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Process-local memory, lost on exit
    #[default]
    Memory,
    /// Standalone embedded RocksDB
    Embedded,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Memory => write!(f, "memory"),
            StorageMode::Embedded => write!(f, "embedded"),
        }
    }
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageMode::Memory),
            "embedded" => Ok(StorageMode::Embedded),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_mode_parse() {
        assert_eq!("memory".parse::<StorageMode>(), Ok(StorageMode::Memory));
        assert_eq!("embedded".parse::<StorageMode>(), Ok(StorageMode::Embedded));
        assert!("external_db".parse::<StorageMode>().is_err());
        assert_eq!(StorageMode::Embedded.to_string(), "embedded");
    }
}
