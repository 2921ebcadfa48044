use async_trait::async_trait;

use crate::domain::change_request::{ChangeRequestId, SourceBundle};
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Fetches metadata, commits and the unified diff of one change request.
    async fn fetch_change_request(&self, id: &ChangeRequestId) -> AppResult<SourceBundle>;
}
