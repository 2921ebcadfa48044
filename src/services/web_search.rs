use async_trait::async_trait;

use crate::domain::change_request::ChangeRequest;
use crate::domain::diff::DiffStat;
use crate::domain::research::ResearchResult;
use crate::error::AppResult;

const QUERY_EXTENSIONS: usize = 3;

#[async_trait]
pub trait WebSearchService: Send + Sync {
    /// Returns at most `limit` results in the order the backend ranked them.
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<ResearchResult>>;
}

/// Builds a short query from the change title and its most touched extensions.
pub fn research_query(change: &ChangeRequest, stats: &DiffStat) -> String {
    let mut query = change.title.trim().to_string();
    for ext in stats.top_extensions(QUERY_EXTENSIONS) {
        query.push(' ');
        query.push_str(ext);
    }
    query
}
