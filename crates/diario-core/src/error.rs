//! Error types for diario-core

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Result type alias using diario-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in diario-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store error
    #[error("Remote store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation addressed a (user, date) scope that is no longer displayed
    #[error("Scope {0} is no longer the active view")]
    StaleScope(String),

    /// Task not present in the current view
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
