//! Task model

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{DateKey, UserId};

/// Remote-assigned task identifier.
///
/// The `tasks` table may use a numeric or a textual primary key; both are
/// accepted on the wire and held as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a raw identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Self(id.to_string()),
            RawId::Text(id) => Self(id),
        })
    }
}

/// A checklist item for exactly one (user, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Remote-assigned identifier
    pub id: TaskId,
    /// Owner of the task
    pub user_id: UserId,
    /// Day the task belongs to
    #[serde(rename = "task_date")]
    pub date_key: DateKey,
    /// Task text, never empty for created tasks
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub is_completed: bool,
    /// Remote creation timestamp, only used for ordering
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Insert payload for a new task; the remote assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub user_id: UserId,
    #[serde(rename = "task_date")]
    pub date_key: DateKey,
    pub title: String,
    pub is_completed: bool,
}

impl NewTask {
    #[must_use]
    pub fn new(user_id: UserId, date_key: DateKey, title: impl Into<String>) -> Self {
        Self {
            user_id,
            date_key,
            title: title.into(),
            is_completed: false,
        }
    }
}

/// Check if a task title is usable (whitespace-only counts as empty)
#[must_use]
pub fn is_blank_title(title: &str) -> bool {
    title.trim().is_empty()
}
