//! # Hooksync Registry - Tracked Repository Records
//!
//! The registry holds the set of repositories this process tracks, together
//! with the metadata needed to match an inbound webhook to one of them and to
//! verify it: clone URL, target branch, webhook secrets and whether a
//! signature is required at all.
//!
//! ## Purpose
//!
//! This crate implements three capabilities:
//!
//! 1. **Record Model** - [`RepositoryRecord`], with `name` and `protocol`
//!    always derived from `url`.
//!
//! 2. **Loading** - one YAML record per file, validated all-or-nothing into an
//!    immutable [`Registry`] snapshot, with [`RegistryHandle`] for atomic
//!    reloads.
//!
//! 3. **Resolution** - exact URL matching of a notification onto at most one
//!    record, reporting ambiguity instead of guessing.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Unprotected repo | Record requires signatures but has no secret | Load-time validation |
//! | Partial config | Some records silently missing after a bad edit | All-or-nothing load |
//! | Confused deputy | Two records claim one URL, wrong secret is used | `Resolution::Ambiguous` |
//! | Torn reload | Request sees half-old, half-new registry | Whole-snapshot swap |
//! | Secret leakage | Secrets printed in logs | Redacting `Debug` |
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     REPOSITORY REGISTRY                       │
//! ├───────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │  ┌──────────────┐   records   ┌──────────────┐                │
//! │  │    LOADER    │───────────▶ │   REGISTRY   │ (immutable)    │
//! │  │  *.yaml dir  │             │   snapshot   │                │
//! │  └──────────────┘             └──────┬───────┘                │
//! │                                      │ candidates()           │
//! │                                      ▼                        │
//! │                               ┌──────────────┐                │
//! │  clone_url / ssh_url ───────▶ │   RESOLVER   │──▶ Resolution  │
//! │                               └──────────────┘                │
//! │                                                               │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hooksync_registry::{Registry, RegistryHandle, RepositoryRef, Resolution};
//!
//! let registry = Registry::load("./repo_source").unwrap();
//! let handle = RegistryHandle::new(registry);
//!
//! let snapshot = handle.snapshot();
//! let target = RepositoryRef::new(
//!     "https://github.com/acme/widgets.git",
//!     "git@github.com:acme/widgets.git",
//! );
//!
//! match snapshot.resolve(&target) {
//!     Resolution::Resolved(record) => println!("matched {}", record.name()),
//!     Resolution::NotFound => println!("not tracked"),
//!     Resolution::Ambiguous { candidates } => println!("misconfigured: {:?}", candidates),
//! }
//! ```

pub mod loader;
pub mod models;
pub mod registry;
pub mod resolver;

pub use models::{Credentials, RegistryError, RepositoryRecord, Result, Secret};
pub use registry::{Registry, RegistryHandle};
pub use resolver::{resolve, RepositoryRef, Resolution};
