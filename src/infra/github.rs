use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap},
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::change_request::{ChangeRequest, ChangeRequestId, CommitSummary, SourceBundle};
use crate::domain::diff::DiffStat;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const API_VERSION: &str = "2022-11-28";
const COMMITS_PER_PAGE: usize = 100;
// GitHub stops listing pull request commits after 250.
const MAX_COMMIT_PAGES: usize = 3;
const SHORT_ID_LEN: usize = 7;

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(http: Client, api_url: String, token: String) -> Self {
        Self {
            http,
            api_url,
            token,
        }
    }

    fn pull_endpoint(&self, id: &ChangeRequestId) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url.trim_end_matches('/'),
            id.repo.owner,
            id.repo.name,
            id.number
        )
    }

    async fn get(&self, url: &str, accept: &str, subject: &str) -> AppResult<Response> {
        debug!(url, accept, "GitHub request");
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to call GitHub: {err}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(status_error(status, &headers, &body, subject))
    }

    async fn fetch_pull(&self, id: &ChangeRequestId) -> AppResult<ChangeRequest> {
        let subject = format!("pull request {id}");
        let payload: PullResponse = self
            .get(&self.pull_endpoint(id), JSON_MEDIA_TYPE, &subject)
            .await?
            .json()
            .await
            .map_err(|err| {
                AppError::VersionControl(format!("failed to parse pull request: {err}"))
            })?;
        payload.into_change_request(id)
    }

    async fn fetch_commits(&self, id: &ChangeRequestId) -> AppResult<Vec<CommitSummary>> {
        let subject = format!("commits of {id}");
        let mut commits = Vec::new();
        for page in 1..=MAX_COMMIT_PAGES {
            let url = format!(
                "{}/commits?per_page={COMMITS_PER_PAGE}&page={page}",
                self.pull_endpoint(id)
            );
            let entries: Vec<CommitEntry> = self
                .get(&url, JSON_MEDIA_TYPE, &subject)
                .await?
                .json()
                .await
                .map_err(|err| {
                    AppError::VersionControl(format!("failed to parse commit list: {err}"))
                })?;
            let count = entries.len();
            commits.extend(entries.into_iter().map(CommitEntry::into_summary));
            if count < COMMITS_PER_PAGE {
                break;
            }
        }
        Ok(commits)
    }

    async fn fetch_diff(&self, id: &ChangeRequestId) -> AppResult<String> {
        let subject = format!("diff of {id}");
        self.get(&self.pull_endpoint(id), DIFF_MEDIA_TYPE, &subject)
            .await?
            .text()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to read diff: {err}")))
    }
}

#[async_trait]
impl VersionControlService for GitHubClient {
    async fn fetch_change_request(&self, id: &ChangeRequestId) -> AppResult<SourceBundle> {
        let change = self.fetch_pull(id).await?;
        let commits = self.fetch_commits(id).await?;
        let diff = self.fetch_diff(id).await?;
        let stats = DiffStat::parse(&diff);

        info!(
            change = %id,
            commits = commits.len(),
            files = stats.files_changed,
            additions = stats.additions,
            deletions = stats.deletions,
            "Fetched pull request"
        );

        Ok(SourceBundle {
            change,
            commits,
            diff,
            stats,
        })
    }
}

fn status_error(status: StatusCode, headers: &HeaderMap, body: &str, subject: &str) -> AppError {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let retry_after = header("retry-after");
    let throttled = match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        // Secondary limits keep quota left but send retry-after or say so in the body.
        StatusCode::FORBIDDEN => {
            header("x-ratelimit-remaining") == Some("0")
                || retry_after.is_some()
                || body.to_ascii_lowercase().contains("rate limit")
        }
        _ => false,
    };

    if throttled {
        if let Some(secs) = retry_after {
            return AppError::RateLimited(format!("{subject}, retry after {secs}s"));
        }
        let reset = header("x-ratelimit-reset")
            .and_then(|value| value.parse::<i64>().ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        return match reset {
            Some(at) => AppError::RateLimited(format!("{subject}, resets at {}", at.to_rfc3339())),
            None => AppError::RateLimited(subject.to_string()),
        };
    }

    match status {
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::NotFound(format!(
                "{subject} does not exist or the token cannot access it ({status})"
            ))
        }
        _ => AppError::VersionControl(format!("GitHub responded with {status}: {body}")),
    }
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    body: Option<String>,
    user: Option<Account>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    html_url: String,
    state: String,
    base: BranchRef,
    head: BranchRef,
}

impl PullResponse {
    fn into_change_request(self, id: &ChangeRequestId) -> AppResult<ChangeRequest> {
        if self.number != id.number {
            return Err(AppError::VersionControl(format!(
                "GitHub returned pull request #{} when #{} was requested",
                self.number, id.number
            )));
        }
        Ok(ChangeRequest {
            id: id.clone(),
            title: self.title,
            description: self.body.unwrap_or_default(),
            author: self
                .user
                .map(|user| user.login)
                .unwrap_or_else(|| "unknown".to_string()),
            created_at: self.created_at,
            updated_at: self.updated_at,
            url: self.html_url,
            state: self.state,
            base_ref: self.base.name,
            head_ref: self.head.name,
        })
    }
}

#[derive(Deserialize)]
struct Account {
    login: String,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
    author: Option<Account>,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<GitSignature>,
}

#[derive(Deserialize)]
struct GitSignature {
    name: Option<String>,
}

impl CommitEntry {
    fn into_summary(self) -> CommitSummary {
        let author = self
            .commit
            .author
            .and_then(|signature| signature.name)
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.author.map(|account| account.login))
            .unwrap_or_else(|| "unknown".to_string());
        CommitSummary {
            short_id: self.sha.chars().take(SHORT_ID_LEN).collect(),
            author,
            message: self.commit.message,
        }
    }
}
