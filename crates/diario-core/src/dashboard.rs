//! Per-user dashboard: binds both sync units to the shared date selection.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DateKey, Session, Task, TaskId};
use crate::store::RemoteStore;
use crate::sync::{
    ApplyOutcome, DateSelection, JournalSync, JournalView, Scope, TaskListSync, TaskListView,
};
use crate::Result;

/// Everything a front end renders for the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub greeting: String,
    pub email: Option<String>,
    pub date_key: DateKey,
    pub journal: JournalView,
    pub tasks: TaskListView,
}

/// One user's view of the journal and task list.
///
/// Cheap to clone; clones share the same units and date selection. Every
/// operation derives its scope from the selection at the point of call.
pub struct Dashboard<S> {
    session: Session,
    date: DateSelection,
    journal: JournalSync<S>,
    tasks: TaskListSync<S>,
}

impl<S> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            date: self.date.clone(),
            journal: self.journal.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

impl<S: RemoteStore> Dashboard<S> {
    /// Build a dashboard without loading; call [`Dashboard::reload`] next.
    pub fn new(store: Arc<S>, session: Session, date: DateSelection) -> Self {
        Self {
            journal: JournalSync::new(Arc::clone(&store)),
            tasks: TaskListSync::new(store),
            session,
            date,
        }
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn date(&self) -> &DateSelection {
        &self.date
    }

    pub const fn journal(&self) -> &JournalSync<S> {
        &self.journal
    }

    pub const fn tasks(&self) -> &TaskListSync<S> {
        &self.tasks
    }

    /// Scope of the currently selected date
    pub fn scope(&self) -> Scope {
        Scope::new(self.session.user_id.clone(), self.date.date_key())
    }

    /// Re-fetch the entry and the task list for the selected date.
    pub async fn reload(&self) -> (ApplyOutcome, ApplyOutcome) {
        let scope = self.scope();
        tracing::debug!("Reloading dashboard for {}", scope);
        tokio::join!(self.journal.load(&scope), self.tasks.load(&scope))
    }

    /// Change the selected date and reload both units for it.
    pub async fn select_date(&self, date: NaiveDate) -> (ApplyOutcome, ApplyOutcome) {
        self.date.select(date);
        self.reload().await
    }

    pub async fn edit_entry(&self, text: impl Into<String>) {
        self.journal.edit(text).await;
    }

    pub async fn save_entry(&self) -> Result<()> {
        self.journal.save(&self.scope()).await
    }

    pub async fn add_task(&self, title: &str) -> Result<Vec<Task>> {
        self.tasks.add(&self.scope(), title).await
    }

    pub async fn toggle_task(&self, id: &TaskId) -> Result<bool> {
        self.tasks.toggle(&self.scope(), id).await
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        self.tasks.delete(&self.scope(), id).await
    }

    pub async fn snapshot(&self) -> DashboardView {
        let (journal, tasks) = tokio::join!(self.journal.snapshot(), self.tasks.snapshot());
        DashboardView {
            greeting: format!("Hello, {}", self.session.greeting_name()),
            email: self.session.email.clone(),
            date_key: self.date.date_key(),
            journal,
            tasks,
        }
    }
}
