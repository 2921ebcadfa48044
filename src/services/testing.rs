//! In-memory stand-ins for the remote services, recording every call.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::{AppConfig, ConfigOverrides};
use crate::context::AppContext;
use crate::domain::change_request::{
    ChangeRequest, ChangeRequestId, CommitSummary, RepoId, SourceBundle,
};
use crate::domain::diff::DiffStat;
use crate::domain::research::ResearchResult;
use crate::error::{AppError, AppResult};
use crate::services::{LanguageModelService, Prompt, VersionControlService, WebSearchService};

pub const SAMPLE_DIFF: &str = "\
diff --git a/src/parser.rs b/src/parser.rs
--- a/src/parser.rs
+++ b/src/parser.rs
@@ -1,2 +1,4 @@
 pub struct Parser;
-fn parse() {}
+fn parse_chunk() {}
+fn parse_stream() {}
+fn flush() {}
";

pub fn sample_bundle(repo: &str, number: u64) -> SourceBundle {
    let repo: RepoId = repo.parse().expect("valid repo");
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    SourceBundle {
        change: ChangeRequest {
            id: ChangeRequestId { repo, number },
            title: "Add streaming parser".to_string(),
            description: "Parses input incrementally.".to_string(),
            author: "octocat".to_string(),
            created_at: timestamp,
            updated_at: timestamp,
            url: format!("https://github.com/example/pull/{number}"),
            state: "open".to_string(),
            base_ref: "main".to_string(),
            head_ref: "streaming".to_string(),
        },
        commits: vec![
            CommitSummary {
                short_id: "a1b2c3d".to_string(),
                author: "Octo Cat".to_string(),
                message: "Introduce chunked parsing\n\nDetails".to_string(),
            },
            CommitSummary {
                short_id: "e4f5a6b".to_string(),
                author: "Octo Cat".to_string(),
                message: "Flush on end of input".to_string(),
            },
        ],
        diff: SAMPLE_DIFF.to_string(),
        stats: DiffStat::parse(SAMPLE_DIFF),
    }
}

pub fn sample_results(count: usize) -> Vec<ResearchResult> {
    (1..=count)
        .map(|i| ResearchResult {
            title: format!("Streaming parsers part {i}"),
            url: format!("https://example.com/{i}"),
            snippet: format!("Snippet {i}"),
        })
        .collect()
}

#[derive(Default)]
pub struct FakeVersionControl {
    pub missing: bool,
    pub requests: Mutex<Vec<ChangeRequestId>>,
}

impl FakeVersionControl {
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl VersionControlService for FakeVersionControl {
    async fn fetch_change_request(&self, id: &ChangeRequestId) -> AppResult<SourceBundle> {
        self.requests.lock().unwrap().push(id.clone());
        if self.missing {
            return Err(AppError::NotFound(format!("pull request {id}")));
        }
        Ok(sample_bundle(&id.repo.to_string(), id.number))
    }
}

#[derive(Default)]
pub struct FakeSearch {
    pub results: Vec<ResearchResult>,
    pub offline: bool,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn returning(results: Vec<ResearchResult>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WebSearchService for FakeSearch {
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<ResearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.offline {
            return Err(AppError::SearchUnavailable("connection refused".to_string()));
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

pub struct FakeModel {
    pub reply: String,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModelService for FakeModel {
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.reply.clone())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(
        |key| match key {
            "GITHUB_TOKEN" => Some("ghp_test".to_string()),
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        },
        &ConfigOverrides::default(),
    )
    .expect("test config")
}

pub fn test_context(
    version_control: Arc<FakeVersionControl>,
    web_search: Arc<FakeSearch>,
    language_model: Arc<FakeModel>,
) -> AppContext {
    AppContext::new(test_config(), version_control, web_search, language_model)
}
