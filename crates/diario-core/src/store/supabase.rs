//! Supabase PostgREST implementation of `RemoteStore`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tokio::sync::watch;

use super::{RemoteStore, StoreError, StoreResult};
use crate::auth::AuthSession;
use crate::config::SupabaseSettings;
use crate::models::{DateKey, JournalEntry, NewTask, Task, TaskId, UserId};
use crate::util::{parse_api_error, supabase_endpoint};

pub const JOURNAL_TABLE: &str = "journal_entries";
pub const TASKS_TABLE: &str = "tasks";

const ENTRY_CONFLICT_TARGET: &str = "user_id,entry_date";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MINIMAL: &str = "return=minimal";

/// PostgREST client scoped to whichever session the token channel holds.
///
/// The access token is read per request, so refreshed or replaced sessions
/// are picked up without rebuilding the store.
#[derive(Clone)]
pub struct SupabaseStore {
    rest_url: String,
    anon_key: String,
    client: Client,
    tokens: watch::Receiver<Option<AuthSession>>,
}

impl SupabaseStore {
    pub fn new(
        settings: &SupabaseSettings,
        tokens: watch::Receiver<Option<AuthSession>>,
    ) -> StoreResult<Self> {
        let rest_url = normalize_rest_url(&settings.url)?;
        let anon_key = settings.anon_key.trim().to_string();
        if anon_key.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            rest_url,
            anon_key,
            client: Client::builder().build()?,
            tokens,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn authorized(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        let access_token = self
            .tokens
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
            .ok_or(StoreError::Unauthenticated)?;

        Ok(request
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token))
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = self.authorized(request)?.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(parse_api_error(status, &body)));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn get_entry(
        &self,
        user_id: &UserId,
        date_key: DateKey,
    ) -> StoreResult<Option<JournalEntry>> {
        let request = self
            .client
            .get(self.table_url(JOURNAL_TABLE))
            .query(&[("select", "user_id,entry_date,content")])
            .query(&entry_filter(user_id, date_key))
            .query(&[("limit", "1")]);

        let rows = self.send(request).await?.json::<Vec<JournalEntry>>().await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_entry(
        &self,
        user_id: &UserId,
        date_key: DateKey,
        content: &str,
    ) -> StoreResult<()> {
        let row = JournalEntry::new(user_id.clone(), date_key, content);
        let request = self
            .client
            .post(self.table_url(JOURNAL_TABLE))
            .query(&[("on_conflict", ENTRY_CONFLICT_TARGET)])
            .header("Prefer", PREFER_UPSERT)
            .json(&[row]);

        self.send(request).await?;
        Ok(())
    }

    async fn list_tasks(&self, user_id: &UserId, date_key: DateKey) -> StoreResult<Vec<Task>> {
        let request = self
            .client
            .get(self.table_url(TASKS_TABLE))
            .query(&[("select", "*")])
            .query(&task_filter(user_id, date_key))
            .query(&[("order", "created_at.asc")]);

        Ok(self.send(request).await?.json::<Vec<Task>>().await?)
    }

    async fn insert_task(
        &self,
        user_id: &UserId,
        date_key: DateKey,
        title: &str,
    ) -> StoreResult<Vec<Task>> {
        let payload = NewTask::new(user_id.clone(), date_key, title);
        let request = self
            .client
            .post(self.table_url(TASKS_TABLE))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&[payload]);

        Ok(self.send(request).await?.json::<Vec<Task>>().await?)
    }

    async fn update_task_completion(&self, id: &TaskId, is_completed: bool) -> StoreResult<()> {
        #[derive(Serialize)]
        struct CompletionPatch {
            is_completed: bool,
        }

        let request = self
            .client
            .patch(self.table_url(TASKS_TABLE))
            .query(&[("id", eq(id))])
            .header("Prefer", PREFER_MINIMAL)
            .json(&CompletionPatch { is_completed });

        self.send(request).await?;
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        let request = self
            .client
            .delete(self.table_url(TASKS_TABLE))
            .query(&[("id", eq(id))])
            .header("Prefer", PREFER_MINIMAL);

        self.send(request).await?;
        Ok(())
    }
}

/// Derive the PostgREST base (`…/rest/v1`) from a Supabase project URL.
pub fn normalize_rest_url(url: &str) -> StoreResult<String> {
    supabase_endpoint(url, "/rest/v1").map_err(StoreError::InvalidConfiguration)
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn entry_filter(user_id: &UserId, date_key: DateKey) -> [(&'static str, String); 2] {
    [("user_id", eq(user_id)), ("entry_date", eq(date_key))]
}

fn task_filter(user_id: &UserId, date_key: DateKey) -> [(&'static str, String); 2] {
    [("user_id", eq(user_id)), ("task_date", eq(date_key))]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SupabaseSettings {
        SupabaseSettings {
            url: "https://demo.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        }
    }

    #[test]
    fn normalize_rest_url_appends_rest_path() {
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/rest/v1").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
        assert!(normalize_rest_url("demo.supabase.co").is_err());
    }

    #[test]
    fn filters_use_remote_column_names() {
        let user = UserId::new("user-1");
        let date: DateKey = "2024-05-01".parse().unwrap();

        assert_eq!(
            entry_filter(&user, date),
            [
                ("user_id", "eq.user-1".to_string()),
                ("entry_date", "eq.2024-05-01".to_string())
            ]
        );
        assert_eq!(task_filter(&user, date)[1].0, "task_date");
    }

    #[test]
    fn requests_without_session_are_unauthenticated() {
        let (_sender, receiver) = watch::channel(None);
        let store = SupabaseStore::new(&settings(), receiver).unwrap();
        let request = store.client.get(store.table_url(TASKS_TABLE));
        assert!(matches!(
            store.authorized(request),
            Err(StoreError::Unauthenticated)
        ));
    }

    #[test]
    fn table_url_targets_rest_endpoint() {
        let (_sender, receiver) = watch::channel(None);
        let store = SupabaseStore::new(&settings(), receiver).unwrap();
        assert_eq!(
            store.table_url(JOURNAL_TABLE),
            "https://demo.supabase.co/rest/v1/journal_entries"
        );
    }
}
