// sql-assistant/crates/sql-assistant/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::pipeline::SqlErrorPolicy;
use crate::sql_database::resolve_database_path;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
    pub database_path: String,
    pub credentials_path: String,
    pub answer_language: String,
    pub sql_error_policy: SqlErrorPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            warn!("Failed to load .env file: {}. Using system environment variables.", e);
        } else {
            info!("Loaded environment variables from .env file");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let model_base_url = var("OPENAI_BASE_URL", DEFAULT_BASE_URL);
        let api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

        let sql_error_policy = var("SQL_ERROR_POLICY", "pass-through");

        Ok(Self {
            api_key,
            model_base_url,
            model_name: var("MODEL_NAME", "gpt-4o"),
            temperature: var("MODEL_TEMPERATURE", "0.0")
                .parse()
                .context("MODEL_TEMPERATURE must be a number")?,
            request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS", "120")
                .parse()
                .context("REQUEST_TIMEOUT_SECONDS must be a whole number of seconds")?,
            database_path: var("DATABASE_PATH", "./chinook.db"),
            credentials_path: var("CREDENTIALS_PATH", "./users.db"),
            answer_language: var("ANSWER_LANGUAGE", "German"),
            sql_error_policy: sql_error_policy
                .parse::<SqlErrorPolicy>()
                .map_err(|e| anyhow::anyhow!("Invalid SQL_ERROR_POLICY: {}", e))?,
        })
    }

    /// The hosted endpoint needs a key; local OpenAI-compatible servers
    /// usually run without one.
    pub fn require_model_credentials(&self) -> Result<()> {
        if self.api_key.is_none() && self.model_base_url.trim_end_matches('/') == DEFAULT_BASE_URL {
            return Err(anyhow::anyhow!(
                "OPENAI_API_KEY environment variable not set. Please set it in your .env file"
            ));
        }
        Ok(())
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- Model: {}", self.model_name);
        info!("- Model Backend: {}", self.model_base_url);
        info!("- API Key: {}", if self.api_key.is_some() { "<set>" } else { "<none>" });
        info!("- Temperature: {}", self.temperature);
        info!("- Request Timeout: {}s", self.request_timeout_seconds);
        info!("- Database: {}", self.database_path);
        info!("- Credentials: {}", self.credentials_path);
        info!("- Answer Language: {}", self.answer_language);
        info!("- SQL Error Policy: {}", self.sql_error_policy);
    }

    pub fn database_file(&self) -> PathBuf {
        resolve_database_path(&self.database_path)
    }

    pub fn credentials_file(&self) -> PathBuf {
        PathBuf::from(&self.credentials_path)
    }
}
