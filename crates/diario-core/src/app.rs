//! App shell: switches between sign-in and the dashboard as sessions change.

use std::sync::Arc;

use crate::dashboard::Dashboard;
use crate::identity::{IdentityGate, IdentityProvider};
use crate::store::RemoteStore;
use crate::sync::DateSelection;

/// Top-level view for the current session state
pub enum View<'a, S> {
    SignIn,
    Dashboard(&'a Dashboard<S>),
}

pub struct App<S> {
    store: Arc<S>,
    gate: IdentityGate,
    date: DateSelection,
    dashboard: Option<Dashboard<S>>,
}

impl<S: RemoteStore> App<S> {
    /// Resolve the session and, when signed in, load today's dashboard.
    pub async fn start<P: IdentityProvider + ?Sized>(provider: &P, store: Arc<S>) -> Self {
        Self::start_on(provider, store, DateSelection::today()).await
    }

    pub async fn start_on<P: IdentityProvider + ?Sized>(
        provider: &P,
        store: Arc<S>,
        date: DateSelection,
    ) -> Self {
        let gate = IdentityGate::initialize(provider).await;
        let mut app = Self {
            store,
            gate,
            date,
            dashboard: None,
        };
        app.rebuild().await;
        app
    }

    pub fn view(&self) -> View<'_, S> {
        match &self.dashboard {
            Some(dashboard) => View::Dashboard(dashboard),
            None => View::SignIn,
        }
    }

    pub const fn dashboard(&self) -> Option<&Dashboard<S>> {
        self.dashboard.as_ref()
    }

    pub const fn gate(&self) -> &IdentityGate {
        &self.gate
    }

    /// Wait for the next session emission and rebuild the view for it.
    ///
    /// Returns `false` once the provider is gone.
    pub async fn next_session_change(&mut self) -> bool {
        if !self.gate.next_change().await {
            return false;
        }
        self.rebuild().await;
        true
    }

    async fn rebuild(&mut self) {
        self.dashboard = match self.gate.session() {
            Some(session) => {
                tracing::info!("Opening dashboard for {}", session.user_id);
                let dashboard =
                    Dashboard::new(Arc::clone(&self.store), session.clone(), self.date.clone());
                dashboard.reload().await;
                Some(dashboard)
            }
            None => {
                if self.dashboard.is_some() {
                    tracing::info!("Session ended, showing sign-in");
                }
                None
            }
        };
    }
}
