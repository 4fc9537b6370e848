//! Turn Orchestrator - sequences one question through the whole pipeline.
//!
//! A turn reads the schema once, asks the model for SQL, cleans it, runs it,
//! asks the model for an answer and only then appends the exchange to the
//! session history. Any failure before that point leaves history untouched.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::composer::{CompositionInput, ResponseComposer};
use super::session::SessionContext;
use super::synthesizer::QuerySynthesizer;
use super::SqlErrorPolicy;
use crate::config::Config;
use crate::error::{AssistantError, Result};
use crate::llm::LanguageModel;
use crate::prompts::PromptLibrary;
use crate::sanitizer::sanitize;
use crate::sql_database::SqlBackend;

pub const DEFAULT_GREETING: &str = "Hello! I'm a SQL assistant. Ask me anything about your database.";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Language the composed answer is written in.
    pub language: String,
    pub sql_error_policy: SqlErrorPolicy,
    /// Opening assistant message for sessions without a profile.
    pub greeting: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            language: "German".to_string(),
            sql_error_policy: SqlErrorPolicy::default(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.answer_language.clone(),
            sql_error_policy: config.sql_error_policy,
            ..Self::default()
        }
    }
}

/// Outcome of running the sanitized statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Rows(String),
    /// Engine rejection carried forward under [`SqlErrorPolicy::PassThrough`].
    Failed(String),
}

impl ExecutionResult {
    /// Text handed to the composer as the SQL response.
    pub fn prompt_text(&self) -> String {
        match self {
            ExecutionResult::Rows(rows) => rows.clone(),
            ExecutionResult::Failed(message) => format!("Error: {}", message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Sanitized statement that was executed.
    pub query: String,
    pub execution: ExecutionResult,
    pub answer: String,
}

pub struct TurnOrchestrator {
    synthesizer: QuerySynthesizer,
    composer: ResponseComposer,
    config: OrchestratorConfig,
}

impl TurnOrchestrator {
    pub fn new(model: Arc<dyn LanguageModel>, config: OrchestratorConfig) -> Result<Self> {
        let prompts = Arc::new(PromptLibrary::new()?);
        info!("Turn orchestrator initialized with model provider {}", model.name());
        Ok(Self {
            synthesizer: QuerySynthesizer::new(Arc::clone(&model), Arc::clone(&prompts)),
            composer: ResponseComposer::new(model, prompts, config.language.clone()),
            config,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Fresh session for the plain database assistant, opened with the greeting.
    pub fn new_session(&self, model: impl Into<String>) -> SessionContext {
        SessionContext::new(model).with_greeting(self.config.greeting.clone())
    }

    /// Run one question to completion against the session's database.
    pub async fn run_turn(&self, ctx: &mut SessionContext, question: &str) -> Result<TurnOutcome> {
        let database = ctx.database()?;
        let model_id = ctx.model().to_string();
        let profile = ctx.profile_attributes();

        let schema = blocking({
            let database = Arc::clone(&database);
            move || database.get_table_info()
        })
        .await?;
        debug!("Schema fetched: {} bytes", schema.len());

        let raw = self
            .synthesizer
            .synthesize(question, ctx.history(), &schema, profile.as_ref(), &model_id)
            .await?;
        let query = sanitize(&raw);
        debug!("Sanitized SQL: {}", query);

        let execution = self.execute(database, &query).await?;

        let execution_text = execution.prompt_text();
        let answer = self
            .composer
            .compose(
                CompositionInput {
                    question,
                    schema: &schema,
                    query: &query,
                    execution_result: &execution_text,
                    history: ctx.history(),
                    profile: profile.as_ref(),
                },
                &model_id,
            )
            .await?;

        ctx.record_turn(question, &answer);
        info!("Turn completed; history now holds {} messages", ctx.history().len());

        Ok(TurnOutcome { query, execution, answer })
    }

    async fn execute(&self, database: Arc<dyn SqlBackend>, query: &str) -> Result<ExecutionResult> {
        let statement = query.to_string();
        match blocking(move || database.run(&statement)).await {
            Ok(rows) => {
                info!("Query executed successfully");
                Ok(ExecutionResult::Rows(rows))
            }
            Err(AssistantError::QueryExecution(message))
                if self.config.sql_error_policy == SqlErrorPolicy::PassThrough =>
            {
                warn!("Query failed, passing error to composer: {}", message);
                Ok(ExecutionResult::Failed(message))
            }
            Err(e) => Err(e),
        }
    }
}

/// SQLite calls block; keep them off the async workers.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AssistantError::connection(format!("Database task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;
    use crate::profile::{Transport, UserProfile};
    use crate::sql_database::SqlDatabase;

    fn create_test_database() -> Arc<dyn SqlBackend> {
        let db = SqlDatabase::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE Artist (ArtistId INTEGER PRIMARY KEY, Name TEXT);
             INSERT INTO Artist (Name) VALUES ('AC/DC'), ('Accept'), ('Aerosmith'), ('Alanis Morissette'), ('Alice In Chains'), ('Antônio Carlos Jobim');",
        )
        .unwrap();
        Arc::new(db)
    }

    fn create_test_orchestrator(model: Arc<ScriptedModel>, policy: SqlErrorPolicy) -> TurnOrchestrator {
        TurnOrchestrator::new(
            model,
            OrchestratorConfig {
                sql_error_policy: policy,
                ..OrchestratorConfig::default()
            },
        )
        .unwrap()
    }

    fn create_test_session(orchestrator: &TurnOrchestrator) -> SessionContext {
        let mut ctx = orchestrator.new_session("gpt-4o");
        ctx.connect(create_test_database());
        ctx
    }

    // ===== Happy Path Tests =====

    #[tokio::test]
    async fn test_turn_returns_composer_output_and_appends_history() {
        let model = Arc::new(ScriptedModel::replying(&[
            "SELECT Name FROM Artist LIMIT 5;",
            "Hier sind 5 Künstler: AC/DC, Accept, Aerosmith, Alanis Morissette, Alice In Chains.",
        ]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        let outcome = orchestrator.run_turn(&mut ctx, "Nenne mir 5 Künstler.").await.unwrap();

        assert_eq!(
            outcome.answer,
            "Hier sind 5 Künstler: AC/DC, Accept, Aerosmith, Alanis Morissette, Alice In Chains."
        );
        assert_eq!(
            outcome.execution,
            ExecutionResult::Rows(
                "[('AC/DC',), ('Accept',), ('Aerosmith',), ('Alanis Morissette',), ('Alice In Chains',)]".to_string()
            )
        );
        assert_eq!(ctx.history().len(), 3);
        assert_eq!(ctx.history().messages()[1].content, "Nenne mir 5 Künstler.");
        assert_eq!(ctx.history().messages()[2].content, outcome.answer);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fenced_sql_is_cleaned_before_execution() {
        let model = Arc::new(ScriptedModel::replying(&["```sql\nSELECT Name FROM Artist LIMIT 1;\n```", "AC/DC"]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        let outcome = orchestrator.run_turn(&mut ctx, "Ein Künstler?").await.unwrap();

        assert_eq!(outcome.query, "SELECT Name FROM Artist LIMIT 1;");
        assert_eq!(outcome.execution, ExecutionResult::Rows("[('AC/DC',)]".to_string()));
        assert!(model.prompt(1).contains("<SQL>SELECT Name FROM Artist LIMIT 1;</SQL>"));
    }

    #[tokio::test]
    async fn test_both_prompts_see_schema_and_prior_history() {
        let model = Arc::new(ScriptedModel::replying(&[
            "SELECT Name FROM Artist LIMIT 1;",
            "AC/DC",
            "SELECT COUNT(*) FROM Artist;",
            "Es gibt 6 Künstler.",
        ]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        orchestrator.run_turn(&mut ctx, "Ein Künstler?").await.unwrap();
        let outcome = orchestrator.run_turn(&mut ctx, "Wie viele?").await.unwrap();

        assert_eq!(outcome.execution, ExecutionResult::Rows("[(6,)]".to_string()));
        let second_sql_prompt = model.prompt(2);
        assert!(second_sql_prompt.contains("CREATE TABLE Artist"));
        assert!(second_sql_prompt.contains("Human: Ein Künstler?\nAI: AC/DC"));
        assert!(!second_sql_prompt.contains("Human: Wie viele?"));
        assert_eq!(ctx.history().len(), 5);
    }

    #[tokio::test]
    async fn test_identical_runs_are_deterministic() {
        let mut answers = Vec::new();
        for _ in 0..2 {
            let model = Arc::new(ScriptedModel::replying(&["SELECT Name FROM Artist LIMIT 2;", "AC/DC, Accept"]));
            let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
            let mut ctx = create_test_session(&orchestrator);
            let outcome = orchestrator.run_turn(&mut ctx, "Zwei Künstler").await.unwrap();
            answers.push((outcome.answer, model.prompt(0), model.prompt(1)));
        }
        assert_eq!(answers[0], answers[1]);
    }

    // ===== Failure Tests =====

    #[tokio::test]
    async fn test_idle_session_is_not_connected() {
        let model = Arc::new(ScriptedModel::replying(&["SELECT 1;", "1"]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = orchestrator.new_session("gpt-4o");

        let result = orchestrator.run_turn(&mut ctx, "q").await;

        assert!(matches!(result, Err(AssistantError::NotConnected)));
        assert_eq!(model.call_count(), 0);
        assert_eq!(ctx.history().len(), 1);
    }

    #[tokio::test]
    async fn test_synthesizer_failure_leaves_history_unchanged() {
        let model = Arc::new(ScriptedModel::new(vec![Err(AssistantError::model_unavailable("network"))]));
        let orchestrator = create_test_orchestrator(model, SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        let result = orchestrator.run_turn(&mut ctx, "q").await;

        assert!(matches!(result, Err(AssistantError::ModelUnavailable(_))));
        assert_eq!(ctx.history().len(), 1);
    }

    #[tokio::test]
    async fn test_composer_failure_leaves_history_unchanged() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("SELECT Name FROM Artist LIMIT 1;".to_string()),
            Err(AssistantError::model_unavailable("quota")),
        ]));
        let orchestrator = create_test_orchestrator(model, SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        assert!(orchestrator.run_turn(&mut ctx, "q").await.is_err());
        assert_eq!(ctx.history().len(), 1);
    }

    #[tokio::test]
    async fn test_pass_through_hands_error_to_composer() {
        let model = Arc::new(ScriptedModel::replying(&[
            "SELECT Nope FROM Artist;",
            "Die Abfrage ist fehlgeschlagen.",
        ]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        let outcome = orchestrator.run_turn(&mut ctx, "q").await.unwrap();

        assert!(matches!(outcome.execution, ExecutionResult::Failed(ref m) if m.contains("Nope")));
        assert!(model.prompt(1).contains("SQL Response: Error: "));
        assert_eq!(outcome.answer, "Die Abfrage ist fehlgeschlagen.");
        assert_eq!(ctx.history().len(), 3);
    }

    #[tokio::test]
    async fn test_fence_only_reply_reaches_composer_as_empty_statement() {
        let model = Arc::new(ScriptedModel::replying(&["```sql\n```", "Keine Abfrage erzeugt."]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = create_test_session(&orchestrator);

        let outcome = orchestrator.run_turn(&mut ctx, "q").await.unwrap();

        assert_eq!(outcome.query, "");
        assert_eq!(outcome.execution, ExecutionResult::Failed("empty SQL statement".to_string()));
        assert!(model.prompt(1).contains("SQL Response: Error: empty SQL statement"));
    }

    #[tokio::test]
    async fn test_abort_policy_propagates_and_keeps_history() {
        let model = Arc::new(ScriptedModel::replying(&["DROP TABLE Missing;", "never used"]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::Abort);
        let mut ctx = create_test_session(&orchestrator);

        let result = orchestrator.run_turn(&mut ctx, "q").await;

        assert!(matches!(result, Err(AssistantError::QueryExecution(_))));
        assert_eq!(model.call_count(), 1);
        assert_eq!(ctx.history().len(), 1);
    }

    // ===== Profile Tests =====

    #[tokio::test]
    async fn test_profile_reaches_both_prompts() {
        let model = Arc::new(ScriptedModel::replying(&["SELECT Name FROM Artist LIMIT 1;", "Hallo Max!"]));
        let orchestrator = create_test_orchestrator(model.clone(), SqlErrorPolicy::PassThrough);
        let mut ctx = SessionContext::new("gpt-4o").with_profile(UserProfile {
            name: "Max".to_string(),
            city: "Berlin".to_string(),
            preferences: "Bio".to_string(),
            transport: Transport::Many(vec!["Car".to_string(), "Bicycle".to_string()]),
            age: 30,
            budget: 50.0,
        });
        ctx.connect(create_test_database());

        orchestrator.run_turn(&mut ctx, "Zutaten für Carbonara?").await.unwrap();

        let sql_prompt = model.prompt(0);
        let answer_prompt = model.prompt(1);
        assert!(sql_prompt.contains("Berlin"));
        assert!(sql_prompt.contains("Car, Bicycle"));
        assert!(answer_prompt.contains("Name: Max"));
        assert!(answer_prompt.contains("Budget: 50.0"));
    }

    #[test]
    fn test_execution_result_prompt_text() {
        assert_eq!(ExecutionResult::Rows(String::new()).prompt_text(), "");
        assert_eq!(
            ExecutionResult::Failed("no such column: Nope".to_string()).prompt_text(),
            "Error: no such column: Nope"
        );
    }
}
