//! Task list sync unit: the ordered checklist of the selected day.
//!
//! Creation is confirm-then-apply. Toggle and delete are optimistic and are
//! never rolled back: a failed remote call leaves the local change in place
//! (marked [`Reconciliation::Diverged`]) until the next load replaces it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::{ApplyOutcome, Scope};
use crate::models::{is_blank_title, Task, TaskId};
use crate::store::RemoteStore;
use crate::{Error, Result};

/// Remote confirmation state of an optimistically mutated task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    Confirmed,
    Pending,
    Diverged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub reconciliation: Reconciliation,
}

/// Snapshot of the task unit for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListView {
    pub scope: Option<Scope>,
    pub tasks: Vec<TaskView>,
    pub draft: String,
}

#[derive(Debug, Default)]
struct TaskListState {
    active: Option<Scope>,
    tasks: Vec<Task>,
    draft: String,
    marks: HashMap<TaskId, Reconciliation>,
    /// Bumped on every load; results of older loads are dropped.
    loads: u64,
}

impl TaskListState {
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

    fn ensure_active(&self, scope: &Scope) -> Result<()> {
        if self.is_active(scope) {
            Ok(())
        } else {
            Err(Error::StaleScope(scope.to_string()))
        }
    }

    fn reconciliation(&self, id: &TaskId) -> Reconciliation {
        self.marks
            .get(id)
            .copied()
            .unwrap_or(Reconciliation::Confirmed)
    }
}

/// Owns the in-memory task sequence (created_at ascending) and input draft.
pub struct TaskListSync<S> {
    store: Arc<S>,
    state: Arc<Mutex<TaskListState>>,
}

impl<S> Clone for TaskListSync<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: RemoteStore> TaskListSync<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(TaskListState::default())),
        }
    }

    /// Make `scope` active and replace the whole sequence with its tasks.
    ///
    /// Read failures yield an empty sequence. A result is dropped when another
    /// load started meanwhile, even for the same scope.
    pub async fn load(&self, scope: &Scope) -> ApplyOutcome {
        let generation = self.state.lock().await.begin_load(scope);

        let tasks = match self.store.list_tasks(&scope.user_id, scope.date_key).await {
            Ok(tasks) => tasks,
            Err(error) => {
                tracing::warn!("Failed to load tasks for {}: {}", scope, error);
                Vec::new()
            }
        };

        let mut state = self.state.lock().await;
        if !state.is_current_load(scope, generation) {
            tracing::debug!("Discarding stale task list for {}", scope);
            return ApplyOutcome::Discarded;
        }
        state.tasks = tasks;
        state.marks.clear();
        ApplyOutcome::Applied
    }

    /// Insert a task and append the remote-confirmed rows.
    ///
    /// Blank titles are rejected before any remote call. On failure nothing
    /// changes locally; on success the draft buffer is cleared.
    pub async fn add(&self, scope: &Scope, title: &str) -> Result<Vec<Task>> {
        if is_blank_title(title) {
            return Err(Error::InvalidInput("Task title cannot be empty".to_string()));
        }

        let inserted = self
            .store
            .insert_task(&scope.user_id, scope.date_key, title)
            .await
            .map_err(|error| {
                tracing::warn!("Failed to add task for {}: {}", scope, error);
                error
            })?;

        let mut state = self.state.lock().await;
        if !state.is_active(scope) {
            tracing::debug!("Task created for {} after the date changed", scope);
            return Ok(inserted);
        }
        for task in &inserted {
            if !state.tasks.iter().any(|listed| listed.id == task.id) {
                state.tasks.push(task.clone());
            }
        }
        state.draft.clear();
        Ok(inserted)
    }

    /// Flip completion locally, then push the new value.
    ///
    /// Returns the new completion value. A remote failure is reported but the
    /// local flip stays.
    pub async fn toggle(&self, scope: &Scope, id: &TaskId) -> Result<bool> {
        let (is_completed, generation) = {
            let mut state = self.state.lock().await;
            state.ensure_active(scope)?;
            let task = state
                .tasks
                .iter_mut()
                .find(|task| &task.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            task.is_completed = !task.is_completed;
            let is_completed = task.is_completed;
            state.marks.insert(id.clone(), Reconciliation::Pending);
            (is_completed, state.loads)
        };

        let result = self.store.update_task_completion(id, is_completed).await;
        self.settle(scope, generation, id, result.is_ok()).await;
        result.map_err(|error| {
            tracing::warn!("Failed to update task {}: {}", id, error);
            error
        })?;
        Ok(is_completed)
    }

    /// Remove the task locally, then delete it remotely.
    pub async fn delete(&self, scope: &Scope, id: &TaskId) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            state.ensure_active(scope)?;
            let before = state.tasks.len();
            state.tasks.retain(|task| &task.id != id);
            if state.tasks.len() == before {
                return Err(Error::TaskNotFound(id.to_string()));
            }
            state.marks.remove(id);
        }

        self.store.delete_task(id).await.map_err(|error| {
            tracing::warn!("Failed to delete task {}: {}", id, error);
            error
        })?;
        Ok(())
    }

    async fn settle(&self, scope: &Scope, generation: u64, id: &TaskId, confirmed: bool) {
        let mut state = self.state.lock().await;
        if !state.is_current_load(scope, generation)
            || !state.tasks.iter().any(|task| &task.id == id)
        {
            return;
        }
        if confirmed {
            state.marks.remove(id);
        } else {
            state.marks.insert(id.clone(), Reconciliation::Diverged);
        }
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.state.lock().await.draft.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }

    pub async fn reconciliation(&self, id: &TaskId) -> Reconciliation {
        self.state.lock().await.reconciliation(id)
    }

    pub async fn snapshot(&self) -> TaskListView {
        let state = self.state.lock().await;
        TaskListView {
            scope: state.active.clone(),
            tasks: state
                .tasks
                .iter()
                .map(|task| TaskView {
                    task: task.clone(),
                    reconciliation: state.reconciliation(&task.id),
                })
                .collect(),
            draft: state.draft.clone(),
        }
    }
}
