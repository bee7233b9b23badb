//! Item and save result models

use serde::{Deserialize, Serialize};

use crate::utils::content_preview;

/// A persisted item. Content is never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub content: String,
}

impl Item {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// What happened to a single save request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SaveOutcome {
    /// Content was persisted as a new item
    Saved { id: String },
    /// Content already exists in the store
    Duplicate,
    /// Another caller currently holds the lock for this content
    Contended,
}

/// Result returned to callers of `save_item`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub success: bool,
    pub message: String,
    pub outcome: SaveOutcome,
}

impl SaveResult {
    pub fn saved(item: &Item) -> Self {
        Self {
            success: true,
            message: format!(
                "item with content {} saved with id {}",
                content_preview(&item.content),
                item.id
            ),
            outcome: SaveOutcome::Saved {
                id: item.id.clone(),
            },
        }
    }

    pub fn duplicate(content: &str) -> Self {
        Self {
            success: false,
            message: format!(
                "duplicate content: item with content {} already exists",
                content_preview(content)
            ),
            outcome: SaveOutcome::Duplicate,
        }
    }

    pub fn contended(content: &str) -> Self {
        Self {
            success: false,
            message: format!(
                "item with content {} is being processed elsewhere",
                content_preview(content)
            ),
            outcome: SaveOutcome::Contended,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.outcome == SaveOutcome::Duplicate
    }

    pub fn is_contended(&self) -> bool {
        self.outcome == SaveOutcome::Contended
    }

    /// Id of the newly saved item, if any
    pub fn saved_id(&self) -> Option<&str> {
        match &self.outcome {
            SaveOutcome::Saved { id } => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_result() {
        let item = Item::new("42", "foo");
        let result = SaveResult::saved(&item);

        assert!(result.success);
        assert_eq!(result.saved_id(), Some("42"));
        assert!(result.message.contains("saved with id 42"));
    }

    #[test]
    fn test_rejected_results() {
        let dup = SaveResult::duplicate("foo");
        assert!(!dup.success);
        assert!(dup.is_duplicate());
        assert!(dup.message.contains("duplicate content"));
        assert_eq!(dup.saved_id(), None);

        let busy = SaveResult::contended("foo");
        assert!(!busy.success);
        assert!(busy.is_contended());
        assert!(busy.message.contains("being processed elsewhere"));
    }

    #[test]
    fn test_long_content_is_cut_in_messages() {
        let big = "x".repeat(1024 * 1024);
        let item = Item::new("42", big.clone());

        let saved = SaveResult::saved(&item);
        assert!(saved.message.len() < 200);
        assert!(saved.message.contains("(1048576 bytes)"));
        assert!(saved.message.ends_with("saved with id 42"));
        assert!(SaveResult::duplicate(&big).message.len() < 200);
        assert!(SaveResult::contended(&big).message.len() < 200);

        // Multi-byte content is cut on a char boundary
        let accented = "é".repeat(100);
        let message = SaveResult::contended(&accented).message;
        assert!(message.contains(&"é".repeat(64)));
        assert!(!message.contains(&"é".repeat(65)));

        // Short content is echoed in full
        assert!(SaveResult::duplicate("foo").message.contains("content foo already"));
    }

    #[test]
    fn test_serialization() {
        let item = Item::new("abc", "foo");
        let json = serde_json::to_value(SaveResult::saved(&item)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["outcome"]["type"], "saved");
        assert_eq!(json["outcome"]["id"], "abc");

        let back: Item = serde_json::from_str(r#"{"id":"abc","content":"foo"}"#).unwrap();
        assert_eq!(back, item);
    }
}
