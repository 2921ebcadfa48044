use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
    #[error("rate limited by GitHub: {0}")]
    RateLimited(String),
    #[error("web search unavailable: {0}")]
    SearchUnavailable(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("version control error: {0}")]
    VersionControl(String),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
