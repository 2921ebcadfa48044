pub mod config;
pub mod document;

use std::sync::Arc;

use crate::config::{AppConfig, ConfigOverrides};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::brave::BraveSearchClient;
use crate::infra::github::GitHubClient;
use crate::infra::http_client;
use crate::infra::openai::OpenAiClient;

/// Loads configuration and only then hands it to `connect`, so a missing
/// credential fails before any remote client exists.
pub fn prepare_context<L, C>(
    lookup: L,
    overrides: &ConfigOverrides,
    connect: C,
) -> AppResult<AppContext>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(AppConfig) -> AppResult<AppContext>,
{
    let config = AppConfig::from_lookup(lookup, overrides)?;
    connect(config)
}

pub fn connect(config: AppConfig) -> AppResult<AppContext> {
    let http = http_client(config.http_timeout)?;

    let version_control = Arc::new(GitHubClient::new(
        http.clone(),
        config.github_api_url.clone(),
        config.github_token.clone(),
    ));
    let web_search = Arc::new(BraveSearchClient::new(
        http.clone(),
        config.search_url.clone(),
        config.search_api_key.clone(),
    ));
    let language_model = Arc::new(OpenAiClient::new(
        http,
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.model.clone(),
        config.max_tokens,
        config.temperature,
    ));

    Ok(AppContext::new(config, version_control, web_search, language_model))
}
