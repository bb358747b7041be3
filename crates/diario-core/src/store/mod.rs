//! Remote store adapter: keyed reads and writes for journal entries and tasks.

mod supabase;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DateKey, JournalEntry, Task, TaskId, UserId};

pub use supabase::{normalize_rest_url, SupabaseStore, JOURNAL_TABLE, TASKS_TABLE};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No signed-in session is available for remote requests")]
    Unauthenticated,
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Store API error: {0}")]
    Api(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed operations against the `journal_entries` and `tasks` collections.
///
/// Implementations carry no business logic; every per-day call is scoped by
/// `(user_id, date_key)` and task mutations address a single row by id.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch the entry for the key, `None` when it has never been saved.
    async fn get_entry(
        &self,
        user_id: &UserId,
        date_key: DateKey,
    ) -> StoreResult<Option<JournalEntry>>;

    /// Insert or wholesale replace the entry for the key.
    async fn upsert_entry(&self, user_id: &UserId, date_key: DateKey, content: &str)
        -> StoreResult<()>;

    /// Tasks for the key ordered by `created_at` ascending.
    async fn list_tasks(&self, user_id: &UserId, date_key: DateKey) -> StoreResult<Vec<Task>>;

    /// Insert an incomplete task and return the stored representation.
    async fn insert_task(
        &self,
        user_id: &UserId,
        date_key: DateKey,
        title: &str,
    ) -> StoreResult<Vec<Task>>;

    async fn update_task_completion(&self, id: &TaskId, is_completed: bool) -> StoreResult<()>;

    async fn delete_task(&self, id: &TaskId) -> StoreResult<()>;
}
