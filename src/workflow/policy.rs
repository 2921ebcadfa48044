use tracing::warn;

use crate::error::{AppError, AppResult};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadDocument,
    FetchSource,
    Research,
    Generate,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ReadDocument => "read-document",
            Stage::FetchSource => "fetch-source",
            Stage::Research => "research",
            Stage::Generate => "generate",
            Stage::Write => "write",
        }
    }
}

/// Outcome of one remote call after the failure policy has been applied.
#[derive(Debug)]
pub enum Settled<T> {
    Success(T),
    Degraded(AppError),
    Fatal(AppError),
}

impl<T> Settled<T> {
    /// Degraded outcomes become `None`; fatal ones become the error.
    pub fn into_optional(self) -> AppResult<Option<T>> {
        match self {
            Settled::Success(value) => Ok(Some(value)),
            Settled::Degraded(_) => Ok(None),
            Settled::Fatal(err) => Err(err),
        }
    }

    pub fn into_required(self) -> AppResult<T> {
        match self {
            Settled::Success(value) => Ok(value),
            Settled::Degraded(err) | Settled::Fatal(err) => Err(err),
        }
    }
}

/// The single place deciding which failures the pipeline survives.
pub fn is_recoverable(stage: Stage, error: &AppError) -> bool {
    matches!((stage, error), (Stage::Research, AppError::SearchUnavailable(_)))
}

pub fn settle<T>(stage: Stage, result: AppResult<T>) -> Settled<T> {
    match result {
        Ok(value) => Settled::Success(value),
        Err(err) if is_recoverable(stage, &err) => {
            warn!(stage = stage.as_str(), error = %err, "Continuing without this stage");
            Settled::Degraded(err)
        }
        Err(err) => Settled::Fatal(err),
    }
}
