//! # Registry - Immutable Snapshot and Reload Handle
//!
//! [`Registry`] is an immutable, validated collection of
//! [`RepositoryRecord`]s. It is built once and shared by reference; nothing
//! mutates a record after load.
//!
//! [`RegistryHandle`] owns the current snapshot for a running process. A
//! reload builds a complete new `Registry` first and only then swaps it in,
//! so readers see either the old snapshot or the new one, never a mix.
//!
//! ```text
//!   load(dir) ──▶ Registry ──▶ Arc<Registry> ──▶ RegistryHandle
//!                                                     │
//!                           snapshot() ◀──────────────┤ (per request)
//!                           reload(dir) ─── swap ─────┘ (whole snapshot)
//! ```

use crate::loader::load_dir;
use crate::models::{RepositoryRecord, Result};
use crate::resolver::{resolve, RepositoryRef, Resolution};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// An immutable set of tracked repositories.
///
/// # Example
///
/// ```rust
/// use hooksync_registry::{Registry, RepositoryRecord, RepositoryRef, Secret};
///
/// let registry = Registry::from_records(vec![
///     RepositoryRecord::new("https://github.com/acme/widgets.git")
///         .with_secret(Secret::new("s3cr3t")),
/// ])
/// .unwrap();
///
/// let target = RepositoryRef::new("https://github.com/acme/widgets.git", "");
/// assert!(registry.resolve(&target).record().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: Vec<RepositoryRecord>,
}

impl Registry {
    /// Builds a registry from records, validating every one of them.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidRecord` for the first invalid record.
    pub fn from_records(records: Vec<RepositoryRecord>) -> Result<Self> {
        for record in &records {
            record.validate()?;
        }

        for record in records.iter().filter(|r| !r.secret_required()) {
            warn!(
                repository = %record.name(),
                url = %record.url(),
                "webhook signatures are NOT required for this repository; any request naming it is trusted"
            );
        }

        Ok(Registry { records })
    }

    /// Loads a registry from a directory of YAML records.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be read or any record is invalid.
    pub fn load<P: AsRef<Path>>(source: P) -> Result<Self> {
        Self::from_records(load_dir(source)?)
    }

    /// Iterates records in source order.
    pub fn candidates(&self) -> impl Iterator<Item = &RepositoryRecord> {
        self.records.iter()
    }

    /// Resolves a notification's repository identity.
    pub fn resolve(&self, target: &RepositoryRef<'_>) -> Resolution<'_> {
        resolve(self.candidates(), target)
    }

    /// Number of tracked repositories.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no repositories are tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Process-wide owner of the current registry snapshot.
///
/// Cloning the handle is cheap; all clones observe the same snapshot.
#[derive(Clone)]
pub struct RegistryHandle {
    current: Arc<watch::Sender<Arc<Registry>>>,
}

impl RegistryHandle {
    /// Wraps an initial snapshot.
    pub fn new(registry: Registry) -> Self {
        let (sender, _) = watch::channel(Arc::new(registry));
        RegistryHandle {
            current: Arc::new(sender),
        }
    }

    /// Returns the current snapshot.
    ///
    /// The returned `Arc` stays valid across later reloads.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.current.borrow().clone()
    }

    /// Swaps in a new snapshot.
    pub fn replace(&self, registry: Registry) {
        self.current.send_replace(Arc::new(registry));
    }

    /// Reloads from a source directory.
    ///
    /// The new registry is swapped in only if the whole load succeeds; on
    /// failure the current snapshot stays in place.
    ///
    /// # Returns
    ///
    /// The number of records in the new snapshot.
    pub fn reload<P: AsRef<Path>>(&self, source: P) -> Result<usize> {
        let source = source.as_ref();
        match Registry::load(source) {
            Ok(registry) => {
                let count = registry.len();
                self.replace(registry);
                info!(source = %source.display(), repositories = count, "registry reloaded");
                Ok(count)
            }
            Err(err) => {
                warn!(source = %source.display(), error = %err, "registry reload failed; keeping previous snapshot");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("repositories", &self.snapshot().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Secret;

    fn signed(url: &str) -> RepositoryRecord {
        RepositoryRecord::new(url).with_secret(Secret::new("s"))
    }

    #[test]
    fn test_from_records_rejects_invalid() {
        let result = Registry::from_records(vec![
            signed("https://x/a.git"),
            RepositoryRecord::new("https://x/b.git"),
        ]);
        assert!(result.is_err());
    }

    fn tracks(registry: &Registry, url: &str) -> bool {
        registry.resolve(&RepositoryRef::new(url, "")).record().is_some()
    }

    #[test]
    fn test_resolve_and_len() {
        let registry =
            Registry::from_records(vec![signed("https://x/a.git"), signed("https://x/b.git")])
                .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(tracks(&registry, "https://x/b.git"));
        assert!(!tracks(&registry, "https://x/c.git"));
    }

    #[test]
    fn test_duplicate_names_do_not_resolve_by_name() {
        // Both derive the name "y"; only the exact URL picks one.
        let registry =
            Registry::from_records(vec![signed("https://x/y.git"), signed("https://z/y.git")])
                .unwrap();

        let record = registry
            .resolve(&RepositoryRef::new("https://z/y.git", ""))
            .record()
            .map(RepositoryRecord::url);
        assert_eq!(record, Some("https://z/y.git"));
    }

    #[test]
    fn test_handle_replace_keeps_old_snapshot_alive() {
        let handle = RegistryHandle::new(Registry::from_records(vec![signed("https://x/a.git")]).unwrap());
        let before = handle.snapshot();

        handle.replace(Registry::from_records(vec![signed("https://x/b.git")]).unwrap());
        let after = handle.snapshot();

        assert!(tracks(&before, "https://x/a.git"));
        assert!(!tracks(&after, "https://x/a.git"));
        assert!(tracks(&after, "https://x/b.git"));
    }
}
