//! Language model capability - text in, text out
pub mod chat_client;

pub use chat_client::ChatCompletionClient;

use async_trait::async_trait;

use crate::error::Result;

/// A hosted or local model that turns one rendered instruction into text.
///
/// Failures surface as [`crate::AssistantError::ModelUnavailable`]; callers
/// do not retry.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
