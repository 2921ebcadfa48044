pub mod brave;
pub mod github;
pub mod openai;

use std::time::Duration;

use reqwest::Client;

use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared client settings: every remote call is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))
}
