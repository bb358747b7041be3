//! Journal entry model

use serde::{Deserialize, Serialize};

use super::{DateKey, UserId};

/// Free-text journal content for exactly one (user, date).
///
/// Stored remotely in `journal_entries`, unique on `(user_id, entry_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Owner of the entry
    pub user_id: UserId,
    /// Day the entry belongs to
    #[serde(rename = "entry_date")]
    pub date_key: DateKey,
    /// Entry text, possibly empty
    #[serde(default)]
    pub content: String,
}

impl JournalEntry {
    /// Create an entry for the given key
    #[must_use]
    pub fn new(user_id: UserId, date_key: DateKey, content: impl Into<String>) -> Self {
        Self {
            user_id,
            date_key,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_uses_remote_column_names() {
        let entry = JournalEntry::new(
            UserId::new("user-1"),
            "2024-05-01".parse().unwrap(),
            "Dear diary",
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["entry_date"], "2024-05-01");
        assert_eq!(json["content"], "Dear diary");
    }

    #[test]
    fn test_entry_missing_content_defaults_empty() {
        let entry: JournalEntry =
            serde_json::from_str(r#"{"user_id":"u","entry_date":"2024-05-01"}"#).unwrap();
        assert!(entry.content.is_empty());
    }
}
