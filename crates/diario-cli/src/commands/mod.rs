pub mod auth_cmd;
pub mod common;
pub mod config;
pub mod entry;
pub mod task;
