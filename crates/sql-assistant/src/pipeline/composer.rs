//! Response Composer - query results to a natural-language answer

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::memory::ConversationHistory;
use crate::profile::ProfileAttributes;
use crate::prompts::{AnswerPrompt, PromptLibrary};

pub struct ResponseComposer {
    model: Arc<dyn LanguageModel>,
    prompts: Arc<PromptLibrary>,
    language: String,
}

/// Everything the answer prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInput<'a> {
    pub question: &'a str,
    pub schema: &'a str,
    pub query: &'a str,
    pub execution_result: &'a str,
    pub history: &'a ConversationHistory,
    pub profile: Option<&'a ProfileAttributes>,
}

impl ResponseComposer {
    pub fn new(model: Arc<dyn LanguageModel>, prompts: Arc<PromptLibrary>, language: impl Into<String>) -> Self {
        Self {
            model,
            prompts,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// The model's reply is the user-visible answer, returned unmodified.
    pub async fn compose(&self, input: CompositionInput<'_>, model_id: &str) -> Result<String> {
        let chat_history = input.history.render();
        let prompt = self.prompts.render_answer(&AnswerPrompt {
            schema: input.schema,
            chat_history: &chat_history,
            question: input.question,
            query: input.query,
            response: input.execution_result,
            language: &self.language,
            profile: input.profile,
        })?;

        debug!("Answer prompt rendered ({} chars)", prompt.len());
        self.model.complete(&prompt, model_id).await
    }
}
