//! Hand-off from an accepted delivery to the repository sync action.
//!
//! The git operation itself lives outside this crate. [`SyncAction`] is the
//! seam: the pipeline builds a [`SyncRequest`] for every accepted push that
//! targets the tracked branch and passes it on exactly once.

use hooksync_registry::RepositoryRecord;
use thiserror::Error;
use tracing::info;

/// Everything the sync action needs to bring one repository up to date.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// The resolved record, including credentials.
    pub record: RepositoryRecord,

    /// Commit before the push.
    pub commit_before: String,

    /// Commit after the push; the checkout target.
    pub commit_after: String,

    /// Provider delivery id, for correlating logs.
    pub delivery_id: String,
}

/// Errors reported by a sync action.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The action cannot take work right now.
    #[error("sync action unavailable: {0}")]
    Unavailable(String),

    /// The action refused or failed the request.
    #[error("sync action failed: {0}")]
    Failed(String),
}

/// Receives accepted pushes.
///
/// Implementations must not block for long; queue the work and return.
pub trait SyncAction: Send + Sync {
    /// Accepts one sync request.
    fn request_sync(&self, request: SyncRequest) -> Result<(), SyncError>;
}

/// Sync action that only records the hand-off in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSync;

impl SyncAction for LogSync {
    fn request_sync(&self, request: SyncRequest) -> Result<(), SyncError> {
        let branch = match request.record.branch() {
            "" => "<default>",
            b => b,
        };
        info!(
            repository = %request.record.name(),
            url = %request.record.url(),
            branch,
            before = %request.commit_before,
            after = %request.commit_after,
            delivery = %request.delivery_id,
            "sync requested"
        );
        Ok(())
    }
}
