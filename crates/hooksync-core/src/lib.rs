//! # Hooksync Core
//!
//! Trust pipeline for repository-push webhooks.
//! Orchestrates the Repository Registry, the Signature Verifier, and the
//! hand-off to the sync action.
//!
//! ## Threat Coverage
//!
//! | Stage | Component | Threats Blocked |
//! |-------|-----------|-----------------|
//! | Identity | Resolver | Untracked repositories, ambiguous registry entries |
//! | Authenticity | Verifier | Forged deliveries, timing oracles, key probing |
//! | Action | Gatekeeper | Syncing on unverified or off-branch pushes |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HOOKSYNC CORE                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   raw body + headers                                            │
//! │          │                                                      │
//! │          ▼                                                      │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐         │
//! │   │Notification │───▶│  Resolver   │───▶│  Verifier   │         │
//! │   │  envelope   │    │ (registry)  │    │ (secrets)   │         │
//! │   └─────────────┘    └──────┬──────┘    └──────┬──────┘         │
//! │                             │                  │                │
//! │                        Unresolved     Rejected │ Accepted       │
//! │                                                ▼                │
//! │                                        ┌─────────────┐          │
//! │                                        │ SyncAction  │          │
//! │                                        └─────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hooksync_core::{Delivery, EventKind, Gatekeeper, LogSync};
//!
//! let gatekeeper = Gatekeeper::new(RegistryHandle::new(registry), Arc::new(LogSync));
//! let decision = gatekeeper.evaluate(&delivery)?;
//! match decision {
//!     Decision::Accepted { .. } => ok(),
//!     Decision::Rejected { .. } | Decision::Unresolved(_) => unauthorized(),
//! }
//! ```
//!
//! ## Security Notes
//!
//! - Stages run in order; a delivery that fails one never reaches the next
//! - Verification always uses the exact request bytes
//! - Records with `webhook_secret_required: false` skip verification and are
//!   logged at `warn` on every delivery

mod config;
mod decision;
mod error;
mod gatekeeper;
mod notification;
mod sync;

pub use config::{HooksyncConfig, RESERVED_PATHS};
pub use decision::{Action, Decision, Unresolved};
pub use error::HooksyncError;
pub use gatekeeper::{Delivery, Gatekeeper};
pub use notification::{EventKind, InboundNotification};
pub use sync::{LogSync, SyncAction, SyncError, SyncRequest};

// Re-export component types for convenience
pub use hooksync_registry::{Registry, RegistryHandle, RepositoryRecord, Secret};
pub use hooksync_verify::{Acceptance, Rejection, SignatureAlgorithm};

/// Core result type for hooksync operations.
pub type Result<T> = std::result::Result<T, HooksyncError>;

#[cfg(test)]
mod tests;
