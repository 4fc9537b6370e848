//! Prompt rendering for the two model calls of a turn.
//!
//! Which template pair is used follows from the profile: none selects the
//! plain database assistant, a profile selects the grocery assistant.
pub mod answer;
pub mod sql_query;

use minijinja::{context, Environment, UndefinedBehavior};

use crate::error::Result;
use crate::profile::ProfileAttributes;

const SQL_QUERY_BASE: &str = "sql_query/base";
const SQL_QUERY_GROCERY: &str = "sql_query/grocery";
const ANSWER_BASE: &str = "answer/base";
const ANSWER_GROCERY: &str = "answer/grocery";

/// Inputs of the SQL-writing prompt.
#[derive(Debug, Clone, Copy)]
pub struct SqlQueryPrompt<'a> {
    pub schema: &'a str,
    pub chat_history: &'a str,
    pub question: &'a str,
    pub profile: Option<&'a ProfileAttributes>,
}

/// Inputs of the answer-writing prompt.
#[derive(Debug, Clone, Copy)]
pub struct AnswerPrompt<'a> {
    pub schema: &'a str,
    pub chat_history: &'a str,
    pub question: &'a str,
    pub query: &'a str,
    pub response: &'a str,
    pub language: &'a str,
    pub profile: Option<&'a ProfileAttributes>,
}

pub struct PromptLibrary {
    env: Environment<'static>,
}

impl PromptLibrary {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(SQL_QUERY_BASE, sql_query::BASE)?;
        env.add_template(SQL_QUERY_GROCERY, sql_query::GROCERY)?;
        env.add_template(ANSWER_BASE, answer::BASE)?;
        env.add_template(ANSWER_GROCERY, answer::GROCERY)?;
        Ok(Self { env })
    }

    pub fn render_sql_query(&self, prompt: &SqlQueryPrompt<'_>) -> Result<String> {
        let rendered = match prompt.profile {
            None => self.env.get_template(SQL_QUERY_BASE)?.render(context! {
                schema => prompt.schema,
                chat_history => prompt.chat_history,
                question => prompt.question,
            })?,
            Some(profile) => self.env.get_template(SQL_QUERY_GROCERY)?.render(context! {
                schema => prompt.schema,
                chat_history => prompt.chat_history,
                question => prompt.question,
                city => profile.city_or("Unknown"),
                transport => profile.transport_or("Unknown"),
                goal => profile.preferences_or("Unknown"),
                user_info => &profile.as_string,
            })?,
        };
        Ok(rendered)
    }

    pub fn render_answer(&self, prompt: &AnswerPrompt<'_>) -> Result<String> {
        let rendered = match prompt.profile {
            None => self.env.get_template(ANSWER_BASE)?.render(context! {
                schema => prompt.schema,
                chat_history => prompt.chat_history,
                question => prompt.question,
                query => prompt.query,
                response => prompt.response,
                language => prompt.language,
            })?,
            Some(profile) => self.env.get_template(ANSWER_GROCERY)?.render(context! {
                schema => prompt.schema,
                chat_history => prompt.chat_history,
                question => prompt.question,
                query => prompt.query,
                response => prompt.response,
                language => prompt.language,
                name => profile.name_or("N/A"),
                city => profile.city_or("N/A"),
                transport => profile.transport_or("N/A"),
                preferences => profile.preferences_or("N/A"),
                budget => &profile.budget,
                user_info => &profile.as_string,
            })?,
        };
        Ok(rendered)
    }
}
