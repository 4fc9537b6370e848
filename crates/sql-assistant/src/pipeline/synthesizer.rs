//! Query Synthesizer - natural-language question to candidate SQL text

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::memory::ConversationHistory;
use crate::profile::ProfileAttributes;
use crate::prompts::{PromptLibrary, SqlQueryPrompt};

pub struct QuerySynthesizer {
    model: Arc<dyn LanguageModel>,
    prompts: Arc<PromptLibrary>,
}

impl QuerySynthesizer {
    pub fn new(model: Arc<dyn LanguageModel>, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    /// Render the SQL-writing instruction and return the model's raw reply.
    ///
    /// The reply is not cleaned here; it may still carry code fences.
    pub async fn synthesize(
        &self,
        question: &str,
        history: &ConversationHistory,
        schema: &str,
        profile: Option<&ProfileAttributes>,
        model_id: &str,
    ) -> Result<String> {
        let chat_history = history.render();
        let prompt = self.prompts.render_sql_query(&SqlQueryPrompt {
            schema,
            chat_history: &chat_history,
            question,
            profile,
        })?;

        debug!("SQL prompt rendered ({} chars) for {}", prompt.len(), self.model.name());
        let raw = self.model.complete(&prompt, model_id).await?;
        debug!("Raw SQL reply: {}", raw);
        Ok(raw)
    }
}
