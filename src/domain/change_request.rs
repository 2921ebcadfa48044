use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::diff::DiffStat;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = AppError;

    /// Accepts `owner/name`, `https://github.com/owner/name[.git]` and
    /// `git@github.com:owner/name.git`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let path = if let Some(rest) = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
        {
            rest.split_once('/').map(|(_, path)| path).unwrap_or("")
        } else if let Some(rest) = trimmed.strip_prefix("git@") {
            rest.split_once(':').map(|(_, path)| path).unwrap_or("")
        } else {
            trimmed
        };

        let path = path.trim_matches('/').trim_end_matches(".git");
        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(AppError::Configuration(format!(
                "invalid repository '{value}', expected owner/name"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequestId {
    pub repo: RepoId,
    pub number: u64,
}

impl fmt::Display for ChangeRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

#[derive(Debug, Clone)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    pub state: String,
    pub base_ref: String,
    pub head_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub short_id: String,
    pub author: String,
    pub message: String,
}

impl CommitSummary {
    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

/// Everything fetched for one change request in a single pass.
#[derive(Debug, Clone)]
pub struct SourceBundle {
    pub change: ChangeRequest,
    pub commits: Vec<CommitSummary>,
    pub diff: String,
    pub stats: DiffStat,
}
