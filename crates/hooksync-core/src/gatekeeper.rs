//! The delivery gatekeeper.
//!
//! This module provides the main entry point for evaluating a webhook
//! delivery. The [`Gatekeeper`] runs the resolver and verifier against the
//! current registry snapshot and, for accepted pushes, hands off to the sync
//! action.

use crate::{
    decision::{Action, Decision, Unresolved},
    notification::{EventKind, InboundNotification},
    sync::{SyncAction, SyncRequest},
    Result,
};

use hooksync_registry::{RegistryHandle, RepositoryRecord, Resolution};
use hooksync_verify::{verify, Verification};

use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One inbound delivery as seen by the HTTP layer.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    /// Exact request body bytes.
    pub raw_body: &'a [u8],

    /// Raw signature header value, if any.
    pub signature: Option<&'a str>,

    /// Event named by the provider.
    pub event: &'a EventKind,

    /// Provider delivery id.
    pub delivery_id: &'a str,
}

/// Evaluates deliveries against the tracked repositories.
///
/// # Security Model
///
/// The pipeline is:
/// 1. Parse the notification envelope (malformed bodies are errors)
/// 2. Resolve it to exactly one record (otherwise `Unresolved`)
/// 3. Verify the signature against that record's secrets
/// 4. Hand accepted pushes on the tracked branch to the sync action
///
/// Nothing is handed off unless both resolution and verification succeed.
/// Each delivery is evaluated exactly once; there are no retries.
///
/// # Example
///
/// ```rust,ignore
/// let gatekeeper = Gatekeeper::new(handle, Arc::new(LogSync));
///
/// let decision = gatekeeper.evaluate(&Delivery {
///     raw_body: &body,
///     signature: headers.signature(),
///     event: &EventKind::Push,
///     delivery_id: "c2690c8c-0ddf-11e8-83b2-75793281676e",
/// })?;
///
/// if decision.is_accepted() {
///     // 200
/// }
/// ```
#[derive(Clone)]
pub struct Gatekeeper {
    /// Current registry snapshot owner.
    registry: RegistryHandle,

    /// Receiver for accepted pushes.
    sync: Arc<dyn SyncAction>,
}

impl Gatekeeper {
    /// Create a new gatekeeper.
    pub fn new(registry: RegistryHandle, sync: Arc<dyn SyncAction>) -> Self {
        let repositories = registry.snapshot().len();
        info!("Gatekeeper initialized with {} tracked repositories", repositories);
        Self { registry, sync }
    }

    /// The registry handle, for reloads.
    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Evaluate one delivery.
    ///
    /// # Errors
    ///
    /// - `HooksyncError::Notification` if the body is not a usable notification
    /// - `HooksyncError::Sync` if an accepted push could not be handed off
    pub fn evaluate(&self, delivery: &Delivery<'_>) -> Result<Decision> {
        let notification = InboundNotification::from_slice(delivery.raw_body)?;
        debug!("Evaluating {} delivery: {}", delivery.event, notification);

        // Phase 1: resolution against one consistent snapshot
        let snapshot = self.registry.snapshot();
        let record = match snapshot.resolve(&notification.repository_ref()) {
            Resolution::Resolved(record) => record,
            Resolution::NotFound => {
                warn!(
                    full_name = %notification.repository_full_name,
                    "delivery for untracked repository"
                );
                return Ok(Decision::Unresolved(Unresolved::NotFound));
            }
            Resolution::Ambiguous { candidates } => {
                error!(
                    full_name = %notification.repository_full_name,
                    candidates = ?candidates,
                    "several tracked records match this repository; fix the record source"
                );
                return Ok(Decision::Unresolved(Unresolved::Ambiguous {
                    candidates: candidates.into_iter().map(str::to_string).collect(),
                }));
            }
        };

        // Phase 2: signature verification
        let acceptance = match verify(record, delivery.raw_body, delivery.signature) {
            Verification::Accepted(acceptance) => acceptance,
            Verification::Rejected(reason) => {
                warn!(repository = %record.name(), "delivery rejected: {}", reason);
                return Ok(Decision::Rejected {
                    repository: record.name().to_string(),
                    reason,
                });
            }
        };

        // Phase 3: act on the verified event
        let action = match delivery.event {
            EventKind::Push => self.dispatch_push(record, &notification, delivery.delivery_id)?,
            EventKind::Ping => Action::Pong,
            EventKind::Other(event) => {
                debug!(repository = %record.name(), "Ignoring {} event", event);
                Action::Ignored {
                    event: event.clone(),
                }
            }
        };

        info!(repository = %record.name(), "Delivery accepted ({:?})", action);
        Ok(Decision::Accepted {
            repository: record.name().to_string(),
            acceptance,
            action,
        })
    }

    /// Apply the branch filter and hand a push to the sync action.
    fn dispatch_push(
        &self,
        record: &RepositoryRecord,
        notification: &InboundNotification,
        delivery_id: &str,
    ) -> Result<Action> {
        let tracked = record.branch();
        if !tracked.is_empty() {
            let pushed = notification.pushed_branch();
            if pushed != Some(tracked) {
                let pushed = notification.git_ref.clone().unwrap_or_default();
                debug!(repository = %record.name(), "Push to '{}' does not touch '{}'", pushed, tracked);
                return Ok(Action::SkippedBranch {
                    tracked: tracked.to_string(),
                    pushed,
                });
            }
        }

        self.sync.request_sync(SyncRequest {
            record: record.clone(),
            commit_before: notification.commit_before.clone(),
            commit_after: notification.commit_after.clone(),
            delivery_id: delivery_id.to_string(),
        })?;

        Ok(Action::SyncRequested)
    }
}

impl std::fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("registry", &self.registry)
            .finish()
    }
}
