//! Supabase-backed identity provider.

use async_trait::async_trait;
use tokio::sync::watch;

use super::{AuthResult, AuthSession, SessionPersistence, SignUpOutcome, SupabaseAuthClient};
use crate::config::SupabaseSettings;
use crate::identity::IdentityProvider;
use crate::models::Session;
use crate::Result;

/// Wraps the auth client and broadcasts every session transition.
///
/// Two channels are kept: the token-free `Session` for the identity gate and
/// the full `AuthSession` for the remote store, which needs the access token.
pub struct SupabaseIdentity<S: SessionPersistence> {
    client: SupabaseAuthClient<S>,
    auth_sessions: watch::Sender<Option<AuthSession>>,
    sessions: watch::Sender<Option<Session>>,
}

impl<S: SessionPersistence> SupabaseIdentity<S> {
    pub fn new(settings: &SupabaseSettings, store: S) -> AuthResult<Self> {
        Ok(Self {
            client: SupabaseAuthClient::new(settings, store)?,
            auth_sessions: watch::channel(None).0,
            sessions: watch::channel(None).0,
        })
    }

    /// Token channel consumed by `SupabaseStore`.
    pub fn tokens(&self) -> watch::Receiver<Option<AuthSession>> {
        self.auth_sessions.subscribe()
    }

    pub fn auth_session(&self) -> Option<AuthSession> {
        self.auth_sessions.borrow().clone()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let session = self.client.sign_in(email, password).await?;
        tracing::info!("Signed in as {}", session.user.id);
        self.publish(Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> AuthResult<SignUpOutcome> {
        let outcome = self.client.sign_up(email, password, full_name).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.publish(Some(session.clone()));
        }
        Ok(outcome)
    }

    fn publish(&self, session: Option<AuthSession>) {
        let identity = session.as_ref().map(AuthSession::to_session);
        self.auth_sessions.send_replace(session);
        self.sessions.send_replace(identity);
    }
}

#[async_trait]
impl<S: SessionPersistence> IdentityProvider for SupabaseIdentity<S> {
    async fn current_session(&self) -> Result<Option<Session>> {
        let restored = self.client.restore_session().await?;
        let identity = restored.as_ref().map(AuthSession::to_session);
        self.publish(restored);
        Ok(identity)
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }

    async fn sign_out(&self) -> Result<()> {
        match self.auth_session() {
            Some(session) => self.client.sign_out(&session.access_token).await?,
            None => self.client.forget_session()?,
        }
        tracing::info!("Signed out");
        self.publish(None);
        Ok(())
    }
}
