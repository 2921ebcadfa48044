use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;
use tracing::debug;

use crate::domain::research::ResearchResult;
use crate::error::{AppError, AppResult};
use crate::services::WebSearchService;

const TOKEN_HEADER: &str = "X-Subscription-Token";
// The API rejects larger page sizes.
const MAX_COUNT: usize = 20;

pub struct BraveSearchClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl BraveSearchClient {
    pub fn new(http: Client, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl WebSearchService for BraveSearchClient {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<ResearchResult>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::SearchUnavailable("BRAVE_SEARCH_API_KEY not configured".to_string())
        })?;
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let count = limit.min(MAX_COUNT).to_string();
        debug!(query, limit, "Searching the web");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query), ("count", count.as_str())])
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, api_key)
            .send()
            .await
            .map_err(|err| {
                AppError::SearchUnavailable(format!("failed to call search API: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::SearchUnavailable(format!(
                "search API responded with {status}"
            )));
        }

        let payload: SearchResponse = response.json().await.map_err(|err| {
            AppError::SearchUnavailable(format!("failed to parse search response: {err}"))
        })?;
        Ok(payload.into_results(limit))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Deserialize)]
struct WebResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl SearchResponse {
    fn into_results(self, limit: usize) -> Vec<ResearchResult> {
        self.web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(|result| ResearchResult {
                title: result.title,
                url: result.url,
                snippet: result.description,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_limit() {
        let json = r#"{"web": {"results": [
            {"title": "One", "url": "https://one.example", "description": "first"},
            {"title": "Two", "url": "https://two.example"},
            {"title": "Three", "url": "https://three.example", "description": "third"}
        ]}}"#;
        let payload: SearchResponse = serde_json::from_str(json).unwrap();
        let results = payload.into_results(2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "One");
        assert_eq!(results[0].snippet, "first");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn missing_web_section_is_empty() {
        let payload: SearchResponse = serde_json::from_str(r#"{"type": "search"}"#).unwrap();
        assert!(payload.into_results(5).is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let client = BraveSearchClient::new(Client::new(), "http://127.0.0.1:9".to_string(), None);
        let err = client.search("rust parser", 5).await.unwrap_err();
        assert!(matches!(err, AppError::SearchUnavailable(_)));
    }
}
