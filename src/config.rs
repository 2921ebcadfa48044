use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RESEARCH_LIMIT: usize = 5;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: String,
    pub github_api_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub search_api_key: Option<String>,
    pub search_url: String,
    pub research_limit: usize,
    pub http_timeout: Duration,
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F, overrides: &ConfigOverrides) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let github_token = read("GITHUB_TOKEN").ok_or_else(|| {
            AppError::Configuration(
                "GITHUB_TOKEN is not set (environment or .env file)".to_string(),
            )
        })?;
        let openai_api_key = read("OPENAI_API_KEY").ok_or_else(|| {
            AppError::Configuration(
                "OPENAI_API_KEY is not set (environment or .env file)".to_string(),
            )
        })?;

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => parse_number(read("SCRIBE_HTTP_TIMEOUT_SECS"), "SCRIBE_HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(AppError::Configuration(
                "HTTP timeout must be at least one second".to_string(),
            ));
        }

        let research_limit = parse_number(read("SCRIBE_RESEARCH_LIMIT"), "SCRIBE_RESEARCH_LIMIT")?
            .unwrap_or(DEFAULT_RESEARCH_LIMIT);

        let model = overrides
            .model
            .clone()
            .or_else(|| read("SCRIBE_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            github_token,
            github_api_url: read("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            openai_api_key,
            openai_base_url: read("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            search_api_key: read("BRAVE_SEARCH_API_KEY"),
            search_url: read("BRAVE_SEARCH_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            research_limit,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, key: &str) -> AppResult<Option<T>> {
    value
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                AppError::Configuration(format!(
                    "{key} must be a non-negative integer, got '{raw}'"
                ))
            })
        })
        .transpose()
}
