//! diario-core - Core library for Diario
//!
//! This crate contains the models, Supabase auth and store adapters, and the
//! date-scoped sync engine shared by every Diario front end.

pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod models;
pub mod store;
pub mod sync;
pub mod util;

#[cfg(test)]
mod testing;

pub use app::{App, View};
pub use dashboard::{Dashboard, DashboardView};
pub use error::{Error, Result};
pub use models::{DateKey, JournalEntry, Session, Task, TaskId, UserId};
