//! Turn pipeline - schema fetch, SQL synthesis, sanitizing, execution and answer composition

pub mod composer;
pub mod orchestrator;
pub mod session;
pub mod synthesizer;

pub use composer::{CompositionInput, ResponseComposer};
pub use orchestrator::{
    ExecutionResult, OrchestratorConfig, TurnOrchestrator, TurnOutcome, DEFAULT_GREETING,
};
pub use session::{ConnectionState, SessionContext};
pub use synthesizer::QuerySynthesizer;

use std::fmt;
use std::str::FromStr;

/// What a turn does when the database rejects the generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlErrorPolicy {
    /// Hand the error text to the composer as the execution result.
    #[default]
    PassThrough,
    /// Fail the turn and leave history untouched.
    Abort,
}

impl FromStr for SqlErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass-through" | "passthrough" | "pass_through" => Ok(SqlErrorPolicy::PassThrough),
            "abort" => Ok(SqlErrorPolicy::Abort),
            other => Err(format!("unknown SQL error policy '{}', expected 'pass-through' or 'abort'", other)),
        }
    }
}

impl fmt::Display for SqlErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlErrorPolicy::PassThrough => f.write_str("pass-through"),
            SqlErrorPolicy::Abort => f.write_str("abort"),
        }
    }
}
