//! Data models for Diario

mod date_key;
mod entry;
mod task;
mod user;

pub use date_key::DateKey;
pub use entry::JournalEntry;
pub use task::{is_blank_title, NewTask, Task, TaskId};
pub use user::{Session, UserId};
