use std::env;

use clap::{Args, Subcommand};

use crate::config::{
    AppConfig, ConfigOverrides, DEFAULT_GITHUB_API_URL, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_SEARCH_URL,
};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the resolved configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand, overrides: &ConfigOverrides) -> AppResult<()> {
    match command {
        ConfigCommand::Show => {
            for line in render_show(|key| env::var(key).ok(), overrides) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn render_show<F>(lookup: F, overrides: &ConfigOverrides) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let or_default = |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

    let mut lines = vec![
        format!("GitHub token: {}", mask_secret(&value("GITHUB_TOKEN"))),
        format!(
            "GitHub API URL: {}",
            or_default("GITHUB_API_URL", DEFAULT_GITHUB_API_URL)
        ),
        format!("OpenAI API key: {}", mask_secret(&value("OPENAI_API_KEY"))),
        format!(
            "OpenAI base URL: {}",
            or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
        ),
        format!(
            "Model: {}",
            overrides
                .model
                .clone()
                .unwrap_or_else(|| or_default("SCRIBE_MODEL", DEFAULT_MODEL))
        ),
        format!(
            "Brave Search API key: {}",
            mask_secret(&value("BRAVE_SEARCH_API_KEY"))
        ),
        format!(
            "Brave Search URL: {}",
            or_default("BRAVE_SEARCH_URL", DEFAULT_SEARCH_URL)
        ),
        format!(
            "HTTP timeout (s): {}",
            overrides
                .timeout_secs
                .map(|secs| secs.to_string())
                .unwrap_or_else(|| display_value(&value("SCRIBE_HTTP_TIMEOUT_SECS"), "60"))
        ),
        format!(
            "Research limit: {}",
            display_value(&value("SCRIBE_RESEARCH_LIMIT"), "5")
        ),
    ];

    match AppConfig::from_lookup(&lookup, overrides) {
        Ok(_) => lines.push("Status: ready".to_string()),
        Err(err) => lines.push(format!("Status: {err}")),
    }
    lines
}

fn display_value(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("{default} (default)"))
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix: String = token.chars().take(3).collect();
            let suffix: String = token
                .chars()
                .rev()
                .take(3)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{prefix}***{suffix}")
        }
        Some(_) => "***".to_string(),
        None => "<not set>".to_string(),
    }
}
