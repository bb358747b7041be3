//! Date-scoped state synchronization.
//!
//! Every unit operation takes an explicit [`Scope`]. A unit remembers the scope
//! of its latest load and only applies asynchronous results that were
//! dispatched for that same scope; anything else is a stale response.

mod date;
mod journal;
mod tasks;

use serde::Serialize;

use crate::models::{DateKey, UserId};

pub use date::DateSelection;
pub use journal::{JournalStatus, JournalSync, JournalView, SAVED_DISPLAY_INTERVAL};
pub use tasks::{Reconciliation, TaskListSync, TaskListView, TaskView};

/// The `(user_id, date_key)` pair every per-day read and write is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub user_id: UserId,
    pub date_key: DateKey,
}

impl Scope {
    #[must_use]
    pub const fn new(user_id: UserId, date_key: DateKey) -> Self {
        Self { user_id, date_key }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.user_id, self.date_key)
    }
}

/// What happened to an asynchronous load result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The result matched the active scope and replaced local state.
    Applied,
    /// The scope changed while the request was in flight; result dropped.
    Discarded,
}
