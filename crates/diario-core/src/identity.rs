//! Identity gate: the core's only view of authentication.
//!
//! A provider produces a stable user identifier or nothing; the gate holds the
//! latest value and reports whether the dashboard or the sign-in view applies.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::Session;
use crate::Result;

/// External identity collaborator (sign-in flows live behind it).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the session that is usable right now, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Receive every later session change (sign-in, sign-out, token refresh).
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_out(&self) -> Result<()>;
}

/// Holds the current session as last reported by the provider.
pub struct IdentityGate {
    session: Option<Session>,
    changes: watch::Receiver<Option<Session>>,
}

impl IdentityGate {
    /// Resolve the current session and start listening for changes.
    ///
    /// A failed resolution is treated as "no session"; nothing is retried.
    /// Whatever the provider broadcast while resolving is part of the initial
    /// state, not a later change.
    pub async fn initialize<P: IdentityProvider + ?Sized>(provider: &P) -> Self {
        let mut changes = provider.subscribe();
        let session = match provider.current_session().await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!("Failed to resolve current session: {}", error);
                None
            }
        };
        changes.borrow_and_update();

        Self { session, changes }
    }

    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Wait for the next provider emission and adopt it.
    ///
    /// Returns `false` once the provider has gone away.
    pub async fn next_change(&mut self) -> bool {
        if self.changes.changed().await.is_err() {
            return false;
        }
        self.session = self.changes.borrow_and_update().clone();
        true
    }
}
