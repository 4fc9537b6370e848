// sql-assistant/crates/sql-assistant/src/lib.rs

pub mod accounts;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod pipeline;
pub mod profile;
pub mod prompts;
pub mod sanitizer;
pub mod sql_database;
pub mod telemetry;
pub mod utils;

// Public API exports
pub use accounts::{CredentialStore, NewAccount};
pub use config::Config;
pub use error::{AssistantError, Result};
pub use llm::{ChatCompletionClient, LanguageModel};
pub use memory::{ConversationHistory, Message, Role};
pub use pipeline::{
    ConnectionState, ExecutionResult, OrchestratorConfig, SessionContext, SqlErrorPolicy,
    TurnOrchestrator, TurnOutcome,
};
pub use profile::{ProfileAttributes, Transport, UserProfile};
pub use sanitizer::sanitize;
pub use sql_database::{SqlBackend, SqlDatabase};
