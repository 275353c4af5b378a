//! Process signals: graceful shutdown and registry reload.

use std::path::{Path, PathBuf};

use hooksync_core::RegistryHandle;
use tracing::{error, info, warn};

/// Resolves on SIGTERM or SIGINT (Ctrl-C elsewhere).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("could not register SIGTERM/SIGINT handlers, falling back to ctrl_c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}

/// Reloads the registry from `source` every time SIGHUP arrives.
///
/// Each reload reads the directory on the blocking pool. A failed reload
/// keeps the previous snapshot.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(
    registry: RegistryHandle,
    source: PathBuf,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading {}", source.display());
            reload_off_runtime(&registry, &source).await;
        }
    }))
}

/// Runs a reload on the blocking pool. Returns the new record count.
///
/// The reload outcome is logged by `RegistryHandle::reload`.
pub(crate) async fn reload_off_runtime(registry: &RegistryHandle, source: &Path) -> Option<usize> {
    let registry = registry.clone();
    let source = source.to_path_buf();
    match tokio::task::spawn_blocking(move || registry.reload(&source)).await {
        Ok(result) => result.ok(),
        Err(e) => {
            error!("registry reload task failed: {}", e);
            None
        }
    }
}

/// SIGHUP does not exist here; reloads are only available via the API.
#[cfg(not(unix))]
pub fn spawn_reload_on_hangup(
    _registry: RegistryHandle,
    _source: PathBuf,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    Ok(tokio::spawn(async {}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooksync_core::Registry;
    use std::fs;

    #[tokio::test]
    async fn test_reload_off_runtime_swaps_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let handle = RegistryHandle::new(Registry::default());

        fs::write(
            dir.path().join("widgets.yaml"),
            "url: https://github.com/acme/widgets.git\nwebhook_secret: s3cr3t\n",
        )
        .unwrap();

        assert_eq!(reload_off_runtime(&handle, dir.path()).await, Some(1));
        assert_eq!(handle.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_off_runtime_keeps_snapshot_on_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("orphan.yaml"), "webhook_secret: s3cr3t\n").unwrap();
        let handle = RegistryHandle::new(Registry::default());

        assert_eq!(reload_off_runtime(&handle, dir.path()).await, None);
        assert!(handle.snapshot().is_empty());
    }
}
