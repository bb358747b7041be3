//! Journal sync unit: one free-text entry per (user, date).

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use super::{ApplyOutcome, Scope};
use crate::store::RemoteStore;
use crate::{Error, Result};

/// How long `Saved` stays visible before reverting to `Idle`.
pub const SAVED_DISPLAY_INTERVAL: Duration = Duration::from_secs(2);

/// Journal status lifecycle.
///
/// `Idle → Loading → Idle` on fetch, `Idle → Saving → Saved | Error` on save,
/// with `Saved` reverting to `Idle` after [`SAVED_DISPLAY_INTERVAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalStatus {
    Idle,
    Loading,
    Saving,
    Saved,
    Error,
}

/// Snapshot of the journal unit for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalView {
    pub scope: Option<Scope>,
    pub content: String,
    pub status: JournalStatus,
}

#[derive(Debug)]
struct JournalState {
    active: Option<Scope>,
    content: String,
    status: JournalStatus,
    /// Bumped on every status transition; lets the delayed revert detect
    /// that something newer happened.
    transitions: u64,
    /// Bumped on every load; a load applies only if no newer one started.
    loads: u64,
}

impl JournalState {
    fn set_status(&mut self, status: JournalStatus) -> u64 {
        self.status = status;
        self.transitions += 1;
        self.transitions
    }

    fn is_active(&self, scope: &Scope) -> bool {
        self.active.as_ref() == Some(scope)
    }

    fn begin_load(&mut self, scope: &Scope) -> u64 {
        self.active = Some(scope.clone());
        self.loads += 1;
        self.loads
    }

    fn is_current_load(&self, scope: &Scope, generation: u64) -> bool {
        self.is_active(scope) && self.loads == generation
    }
}

/// Owns the in-memory content buffer and status of the selected day's entry.
pub struct JournalSync<S> {
    store: Arc<S>,
    state: Arc<Mutex<JournalState>>,
    saved_display: Duration,
}

impl<S> Clone for JournalSync<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            saved_display: self.saved_display,
        }
    }
}

impl<S: RemoteStore> JournalSync<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(JournalState {
                active: None,
                content: String::new(),
                status: JournalStatus::Idle,
                transitions: 0,
                loads: 0,
            })),
            saved_display: SAVED_DISPLAY_INTERVAL,
        }
    }

    /// Make `scope` the active one and replace the buffer with its entry.
    ///
    /// A missing entry and a failed read both yield an empty buffer. A result
    /// is dropped when another load started meanwhile, even for the same scope.
    pub async fn load(&self, scope: &Scope) -> ApplyOutcome {
        let generation = {
            let mut state = self.state.lock().await;
            state.set_status(JournalStatus::Loading);
            state.begin_load(scope)
        };

        let content = match self.store.get_entry(&scope.user_id, scope.date_key).await {
            Ok(Some(entry)) => entry.content,
            Ok(None) => String::new(),
            Err(error) => {
                tracing::warn!("Failed to load journal entry for {}: {}", scope, error);
                String::new()
            }
        };

        let mut state = self.state.lock().await;
        if !state.is_current_load(scope, generation) {
            tracing::debug!("Discarding stale journal entry for {}", scope);
            return ApplyOutcome::Discarded;
        }
        state.content = content;
        state.set_status(JournalStatus::Idle);
        ApplyOutcome::Applied
    }

    /// Replace the local buffer. No remote call, status untouched.
    pub async fn edit(&self, text: impl Into<String>) {
        self.state.lock().await.content = text.into();
    }

    /// Upsert the buffer for `scope`.
    ///
    /// On failure the buffer is kept and the status becomes `Error`; calling
    /// `save` again retries. Results for a scope that stopped being active
    /// leave the visible status alone.
    pub async fn save(&self, scope: &Scope) -> Result<()> {
        let content = {
            let mut state = self.state.lock().await;
            if !state.is_active(scope) {
                return Err(Error::StaleScope(scope.to_string()));
            }
            state.set_status(JournalStatus::Saving);
            state.content.clone()
        };

        let result = self
            .store
            .upsert_entry(&scope.user_id, scope.date_key, &content)
            .await;

        let mut state = self.state.lock().await;
        if !state.is_active(scope) {
            tracing::debug!("Save for {} finished after the date changed", scope);
            return result.map_err(Into::into);
        }

        match result {
            Ok(()) => {
                let ticket = state.set_status(JournalStatus::Saved);
                drop(state);
                self.schedule_idle(ticket);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to save journal entry for {}: {}", scope, error);
                state.set_status(JournalStatus::Error);
                Err(error.into())
            }
        }
    }

    fn schedule_idle(&self, ticket: u64) {
        let state = Arc::clone(&self.state);
        let delay = self.saved_display;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock().await;
            if state.transitions == ticket && state.status == JournalStatus::Saved {
                state.set_status(JournalStatus::Idle);
            }
        });
    }

    pub async fn content(&self) -> String {
        self.state.lock().await.content.clone()
    }

    pub async fn status(&self) -> JournalStatus {
        self.state.lock().await.status
    }

    pub async fn snapshot(&self) -> JournalView {
        let state = self.state.lock().await;
        JournalView {
            scope: state.active.clone(),
            content: state.content.clone(),
            status: state.status,
        }
    }
}
