//! In-memory collaborators for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{watch, Semaphore};

use crate::identity::IdentityProvider;
use crate::models::{DateKey, JournalEntry, Session, Task, TaskId, UserId};
use crate::store::{RemoteStore, StoreError, StoreResult};
use crate::sync::Scope;
use crate::Result;

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn key(raw: &str) -> DateKey {
    raw.parse().unwrap()
}

pub fn scope(user: &str, raw_date: &str) -> Scope {
    Scope::new(UserId::new(user), key(raw_date))
}

pub fn session(user: &str) -> Session {
    Session {
        user_id: UserId::new(user),
        display_name: None,
        email: None,
    }
}

#[derive(Default)]
struct MemoryState {
    entries: HashMap<(UserId, DateKey), String>,
    tasks: Vec<Task>,
    next_id: u64,
}

/// Remote store fake with failure switches and per-date response gates.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    gates: Mutex<HashMap<DateKey, Arc<Semaphore>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Park every dated request for `date_key` until `release` is called.
    pub fn hold(&self, date_key: DateKey) {
        self.gates
            .lock()
            .unwrap()
            .insert(date_key, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, date_key: DateKey) {
        if let Some(gate) = self.detach_gate(date_key) {
            gate.close();
        }
    }

    /// Let new requests for `date_key` through while already parked ones
    /// stay parked until the returned gate is closed.
    pub fn detach_gate(&self, date_key: DateKey) -> Option<Arc<Semaphore>> {
        self.gates.lock().unwrap().remove(&date_key)
    }

    pub fn seed_entry(&self, user: &str, raw_date: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .entries
            .insert((UserId::new(user), key(raw_date)), content.to_string());
    }

    pub fn seed_task(&self, user: &str, raw_date: &str, title: &str) -> Task {
        self.state
            .lock()
            .unwrap()
            .insert(UserId::new(user), key(raw_date), title)
    }

    pub fn remote_entry(&self, user: &str, raw_date: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(&(UserId::new(user), key(raw_date)))
            .cloned()
    }

    pub fn remote_task(&self, id: &TaskId) -> Option<Task> {
        self.state
            .lock()
            .unwrap()
            .tasks
            .iter()
            .find(|task| &task.id == id)
            .cloned()
    }

    async fn wait_gate(&self, date_key: DateKey) {
        let gate = self.gates.lock().unwrap().get(&date_key).cloned();
        if let Some(gate) = gate {
            let _ = gate.acquire().await;
        }
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Api("simulated read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Api("simulated write failure".to_string()));
        }
        Ok(())
    }
}

impl MemoryState {
    fn insert(&mut self, user_id: UserId, date_key: DateKey, title: &str) -> Task {
        self.next_id += 1;
        let task = Task {
            id: TaskId::new(self.next_id.to_string()),
            user_id,
            date_key,
            title: title.to_string(),
            is_completed: false,
            created_at: Some(format!("{:020}", self.next_id)),
        };
        self.tasks.push(task.clone());
        task
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_entry(
        &self,
        user_id: &UserId,
        date_key: DateKey,
    ) -> StoreResult<Option<JournalEntry>> {
        self.wait_gate(date_key).await;
        self.check_read()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .get(&(user_id.clone(), date_key))
            .map(|content| JournalEntry::new(user_id.clone(), date_key, content.clone())))
    }

    async fn upsert_entry(
        &self,
        user_id: &UserId,
        date_key: DateKey,
        content: &str,
    ) -> StoreResult<()> {
        self.wait_gate(date_key).await;
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .entries
            .insert((user_id.clone(), date_key), content.to_string());
        Ok(())
    }

    async fn list_tasks(&self, user_id: &UserId, date_key: DateKey) -> StoreResult<Vec<Task>> {
        self.wait_gate(date_key).await;
        self.check_read()?;
        let state = self.state.lock().unwrap();
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|task| &task.user_id == user_id && task.date_key == date_key)
            .cloned()
            .collect();
        tasks.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        Ok(tasks)
    }

    async fn insert_task(
        &self,
        user_id: &UserId,
        date_key: DateKey,
        title: &str,
    ) -> StoreResult<Vec<Task>> {
        self.wait_gate(date_key).await;
        self.check_write()?;
        let task = self
            .state
            .lock()
            .unwrap()
            .insert(user_id.clone(), date_key, title);
        Ok(vec![task])
    }

    async fn update_task_completion(&self, id: &TaskId, is_completed: bool) -> StoreResult<()> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        if let Some(task) = state.tasks.iter_mut().find(|task| &task.id == id) {
            task.is_completed = is_completed;
        }
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .tasks
            .retain(|task| &task.id != id);
        Ok(())
    }
}

/// Identity provider fake driven directly by tests.
pub struct FakeIdentity {
    sessions: watch::Sender<Option<Session>>,
    fail_resolution: bool,
    /// Session broadcast from `current_session`, like a provider that
    /// restores persisted state on first use.
    restores: Option<Session>,
}

impl FakeIdentity {
    pub fn signed_out() -> Self {
        Self {
            sessions: watch::channel(None).0,
            fail_resolution: false,
            restores: None,
        }
    }

    pub fn signed_in(user: &str) -> Self {
        Self {
            sessions: watch::channel(Some(session(user))).0,
            fail_resolution: false,
            restores: None,
        }
    }

    pub fn restoring(user: &str) -> Self {
        Self {
            sessions: watch::channel(None).0,
            fail_resolution: false,
            restores: Some(session(user)),
        }
    }

    pub fn failing() -> Self {
        Self {
            sessions: watch::channel(Some(session("unreachable"))).0,
            fail_resolution: true,
            restores: None,
        }
    }

    pub fn emit(&self, session: Option<Session>) {
        self.sessions.send_replace(session);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_session(&self) -> Result<Option<Session>> {
        if self.fail_resolution {
            return Err(crate::Error::Config("simulated resolution failure".to_string()));
        }
        if let Some(restored) = &self.restores {
            self.sessions.send_replace(Some(restored.clone()));
        }
        Ok(self.sessions.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }

    async fn sign_out(&self) -> Result<()> {
        self.emit(None);
        Ok(())
    }
}
