use std::env;
use std::path::PathBuf;

use crate::storage::default_db_path;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings, read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the task snapshot lives.
    pub db_path: PathBuf,
    /// Key for the summary service. `None` disables summaries.
    pub api_key: Option<String>,
    pub model: String,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Config {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Config {
            db_path: default_db_path(),
            api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY")),
            model: non_empty_var("DRILLBOARD_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            log_filter: non_empty_var("DRILLBOARD_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
