//! Error kinds surfaced by the assistant pipeline and the credential store.

use thiserror::Error;

/// Typed failures of a turn, a database binding or an account operation.
///
/// None of these is retried internally; every variant is terminal for the
/// operation that produced it.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The database could not be opened or a pooled connection was lost
    #[error("Database connection error: {0}")]
    Connection(String),

    /// The language model call failed (network, auth, quota, malformed reply)
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// The database engine rejected a generated statement
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    /// Account creation with a username that is already taken
    #[error("Username '{0}' already exists.")]
    DuplicateAccount(String),

    /// Login credential mismatch or missing credentials
    #[error("{0}")]
    Authentication(String),

    /// A turn was submitted while no database is bound to the session
    #[error("No database connected. Connect to a database first.")]
    NotConnected,

    /// An instruction template failed to render
    #[error("Prompt template error: {0}")]
    Template(String),

    /// Account data outside the accepted ranges
    #[error("Invalid account data: {0}")]
    Validation(String),

    /// Credential store read/write failure
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, AssistantError>;

impl AssistantError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    pub fn query_execution(message: impl Into<String>) -> Self {
        Self::QueryExecution(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Whether the failure came from the engine rejecting a statement, as
    /// opposed to the database being unreachable.
    pub fn is_query_execution(&self) -> bool {
        matches!(self, Self::QueryExecution(_))
    }
}

impl From<r2d2::Error> for AssistantError {
    fn from(e: r2d2::Error) -> Self {
        AssistantError::Connection(format!("Failed to get connection from pool: {}", e))
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(e: reqwest::Error) -> Self {
        AssistantError::ModelUnavailable(e.to_string())
    }
}

impl From<minijinja::Error> for AssistantError {
    fn from(e: minijinja::Error) -> Self {
        AssistantError::Template(e.to_string())
    }
}
