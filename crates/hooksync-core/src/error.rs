//! Error types for hooksync core.

use thiserror::Error;

/// Core error type.
///
/// Authentication outcomes are not errors; they are reported as a
/// [`crate::Decision`]. These variants cover requests that cannot be
/// evaluated at all and failures outside the trust decision.
#[derive(Debug, Error)]
pub enum HooksyncError {
    /// The request body is not a usable notification.
    #[error("Malformed notification: {0}")]
    Notification(String),

    /// The accepted delivery could not be handed to the sync action.
    #[error("Sync hand-off failed: {0}")]
    Sync(#[from] crate::sync::SyncError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registry error passthrough.
    #[error("Registry error: {0}")]
    Registry(#[from] hooksync_registry::RegistryError),
}
