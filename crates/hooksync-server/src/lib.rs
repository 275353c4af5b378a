//! # Hooksync Server
//!
//! HTTP front end for the hooksync trust pipeline.
//!
//! ```text
//!   provider ──POST /webhook──▶ ┌────────────┐   evaluate   ┌────────────┐
//!                               │  http_api  │─────────────▶│ Gatekeeper │
//!   kubelet ──GET /_ready ────▶ │  (axum)    │              └────────────┘
//!           ──GET /_alive ────▶ └────────────┘
//!
//!   SIGHUP ──▶ RegistryHandle::reload      SIGTERM/SIGINT ──▶ graceful shutdown
//! ```

pub mod http_api;
pub mod signals;

use std::sync::Arc;

use hooksync_core::{Gatekeeper, HooksyncConfig, HooksyncError, Registry, RegistryHandle, SyncAction};
use thiserror::Error;
use tracing::info;

pub use http_api::{create_router, serve, HttpState, DELIVERY_HEADER, EVENT_HEADER};
pub use signals::{shutdown_signal, spawn_reload_on_hangup};

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration or record source rejected.
    #[error("startup failed: {0}")]
    Startup(#[from] HooksyncError),

    /// Socket or signal registration failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the server crate.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Loads the record source, then serves until a shutdown signal.
pub async fn run(config: HooksyncConfig, sync: Arc<dyn SyncAction>) -> Result<()> {
    config.validate()?;

    let registry = Registry::load(&config.repo_source).map_err(HooksyncError::from)?;
    info!(
        "Loaded {} repositories from {}",
        registry.len(),
        config.repo_source.display()
    );

    let handle = RegistryHandle::new(registry);
    let _reloader = spawn_reload_on_hangup(handle.clone(), config.repo_source.clone())?;

    let state = HttpState {
        gatekeeper: Gatekeeper::new(handle, sync),
        repo_root: config.repo_root.clone(),
    };

    serve(&config, state, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooksync_core::LogSync;

    #[tokio::test]
    async fn test_run_rejects_route_syntax_in_endpoint() {
        let config = HooksyncConfig {
            endpoint_path: "/hooks/{".to_string(),
            ..HooksyncConfig::default()
        };

        let result = run(config, Arc::new(LogSync)).await;
        assert!(matches!(
            result,
            Err(ServerError::Startup(HooksyncError::Config(_)))
        ));
    }
}
