//! Supabase auth (GoTrue) client with pluggable session persistence.

mod provider;

use std::fmt;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SupabaseSettings;
use crate::models::{Session, UserId};
use crate::util::{normalize_text_option, parse_api_error, supabase_endpoint, unix_timestamp_now};

pub use provider::SupabaseIdentity;

/// Sessions this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Tokens plus the user they belong to, as persisted between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }

    /// The token-free identity view handed to the rest of the core.
    #[must_use]
    pub fn to_session(&self) -> Session {
        Session {
            user_id: UserId::new(self.user.id.clone()),
            display_name: self.user.full_name.clone(),
            email: self.user.email.clone(),
        }
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Sign-up either signs the user in or waits for email confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where the signed-in session survives between process runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

pub(crate) struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(settings: &SupabaseSettings, store: S) -> AuthResult<Self> {
        let auth_url =
            supabase_endpoint(&settings.url, "/auth/v1").map_err(AuthError::InvalidConfiguration)?;
        let anon_key = normalize_text_option(Some(settings.anon_key.clone())).ok_or(
            AuthError::InvalidConfiguration("Supabase anon key must not be empty"),
        )?;

        Ok(Self {
            auth_url,
            anon_key,
            client: Client::builder().build()?,
            store,
        })
    }

    /// Load the persisted session, refreshing it when it has expired.
    ///
    /// A session whose refresh fails is cleared and reported as absent.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };
        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        let refreshed = self
            .token_grant("refresh_token", json!({ "refresh_token": stored.refresh_token }))
            .await;
        match refreshed {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    /// Register an account; a non-blank `full_name` is stored as user metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> AuthResult<SignUpOutcome> {
        let mut payload = credentials(email, password)?;
        if let Some(full_name) = normalize_text_option(full_name.map(str::to_string)) {
            payload["data"] = json!({ "full_name": full_name });
        }

        let request = self.post("signup").json(&payload);
        match Self::send(request).await?.into_session()? {
            Some(session) => Ok(SignUpOutcome::SignedIn(self.remember(session)?)),
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.token_grant("password", credentials(email, password)?).await
    }

    /// Revoke the access token, then forget the persisted session.
    ///
    /// An already-invalid token (401) still counts as signed out.
    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !(status.is_success() || status == StatusCode::UNAUTHORIZED) {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }
        self.store.clear_session()
    }

    /// Drop the persisted session without contacting the server.
    pub fn forget_session(&self) -> AuthResult<()> {
        self.store.clear_session()
    }

    async fn token_grant(&self, grant_type: &str, payload: Value) -> AuthResult<AuthSession> {
        let request = self
            .post("token")
            .query(&[("grant_type", grant_type)])
            .json(&payload);
        let session = Self::send(request).await?.into_session()?.ok_or_else(|| {
            AuthError::Api(format!(
                "The {grant_type} grant did not return an active session"
            ))
        })?;
        self.remember(session)
    }

    fn remember(&self, session: AuthSession) -> AuthResult<AuthSession> {
        self.store.save_session(&session)?;
        Ok(session)
    }

    /// Anonymous request: the anon key doubles as the bearer token.
    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(request: RequestBuilder) -> AuthResult<GoTrueResponse> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }
        Ok(response.json().await?)
    }
}

fn credentials(email: &str, password: &str) -> AuthResult<Value> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(json!({ "email": email, "password": password }))
}

/// GoTrue answers with session fields at the top level (token grants) or
/// nested under `session` (sign-up); both shapes are merged here.
#[derive(Debug, Deserialize)]
struct GoTrueResponse {
    #[serde(flatten)]
    top: TokenFields,
    #[serde(default)]
    session: Option<TokenFields>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenFields {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<GoTrueUser>,
}

impl TokenFields {
    fn or(self, fallback: Self) -> Self {
        Self {
            access_token: self.access_token.or(fallback.access_token),
            refresh_token: self.refresh_token.or(fallback.refresh_token),
            expires_at: self.expires_at.or(fallback.expires_at),
            expires_in: self.expires_in.or(fallback.expires_in),
            user: self.user.or(fallback.user),
        }
    }

    fn expiry(&self) -> Option<i64> {
        self.expires_at.or_else(|| {
            self.expires_in
                .map(|seconds| unix_timestamp_now().saturating_add(seconds))
        })
    }
}

impl GoTrueResponse {
    /// `Ok(None)` when only a user came back (email confirmation pending).
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let fields = self.top.or(self.session.unwrap_or_default());
        let expires_at = fields.expiry();

        match (fields.access_token, fields.refresh_token, expires_at, fields.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: user.into(),
                }))
            }
            (None, None, None, Some(_)) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
}

impl From<GoTrueUser> for AuthUser {
    fn from(user: GoTrueUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: normalize_text_option(user.user_metadata.and_then(|meta| meta.full_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> GoTrueResponse {
        serde_json::from_str(raw).unwrap()
    }

    fn settings(url: &str, anon_key: &str) -> SupabaseSettings {
        SupabaseSettings {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    #[derive(Clone)]
    struct NoStorage;

    impl SessionPersistence for NoStorage {
        fn load_session(&self) -> AuthResult<Option<AuthSession>> {
            Ok(None)
        }

        fn save_session(&self, _session: &AuthSession) -> AuthResult<()> {
            Ok(())
        }

        fn clear_session(&self) -> AuthResult<()> {
            Ok(())
        }
    }

    #[test]
    fn client_targets_auth_service_path() {
        let client =
            SupabaseAuthClient::new(&settings("https://demo.supabase.co/", " anon "), NoStorage)
                .unwrap();
        assert_eq!(client.auth_url, "https://demo.supabase.co/auth/v1");
        assert_eq!(client.anon_key, "anon");
    }

    #[test]
    fn client_rejects_blank_anon_key() {
        let result = SupabaseAuthClient::new(&settings("https://demo.supabase.co", "  "), NoStorage);
        assert!(matches!(result, Err(AuthError::InvalidConfiguration(_))));
    }

    #[test]
    fn credentials_require_email_and_password() {
        assert!(credentials(" ", "secret").is_err());
        assert!(credentials("ana@example.com", "").is_err());
        assert_eq!(
            credentials("ana@example.com", "secret").unwrap()["email"],
            "ana@example.com"
        );
    }

    #[test]
    fn user_without_tokens_means_confirmation_required() {
        let response = parse(r#"{ "user": { "id": "user", "email": "u@example.com" } }"#);
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn response_carries_full_name_into_session() {
        let response = parse(
            r#"{
                "access_token": "access",
                "refresh_token": "refresh",
                "expires_in": 3600,
                "user": {
                    "id": "user-1",
                    "email": "ana@example.com",
                    "user_metadata": { "full_name": " Ana " }
                }
            }"#,
        );
        let session = response.into_session().unwrap().unwrap();
        assert!(!session.is_expired());

        let identity = session.to_session();
        assert_eq!(identity.user_id, UserId::new("user-1"));
        assert_eq!(identity.display_name.as_deref(), Some("Ana"));
        assert_eq!(identity.greeting_name(), "Ana");
    }

    #[test]
    fn nested_session_fields_are_used() {
        let response = parse(
            r#"{
                "user": { "id": "user-1" },
                "session": {
                    "access_token": "access",
                    "refresh_token": "refresh",
                    "expires_at": 1700000000
                }
            }"#,
        );
        let session = response.into_session().unwrap().unwrap();
        assert_eq!(session.access_token, "access");
        assert_eq!(session.expires_at, 1_700_000_000);
        assert_eq!(session.user.id, "user-1");
    }

    #[test]
    fn partial_session_fields_are_rejected() {
        let response = parse(r#"{ "access_token": "access", "user": { "id": "user-1" } }"#);
        assert!(response.into_session().is_err());
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
                full_name: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
