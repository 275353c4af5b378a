//! # Core Data Models for the Repository Registry
//!
//! This module defines the record shape for a tracked repository and the
//! error type shared by the loader, registry and resolver.
//!
//! ## Threat Model
//!
//! The types in this module help defend against:
//!
//! - **Stale Identity**: `name` and `protocol` can only be produced from `url`,
//!   so a record can never claim one identity and match on another.
//! - **Secret Leakage**: [`Secret`] and [`Credentials`] redact themselves in
//!   `Debug` output, so logging a record never prints key material.
//! - **Silent Gaps**: [`RepositoryRecord::validate`] rejects a record that
//!   requires signatures but has no secret to check them with.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A shared webhook secret.
///
/// The wrapped value is only reachable through [`Secret::expose`]. `Debug`
/// prints a fixed placeholder and the type is never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// Returns the raw key bytes for MAC computation.
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns true if the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Credential material handed to the sync action.
///
/// Opaque to the registry: never compared, never logged.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Username for HTTPS authentication.
    pub username: Option<String>,

    /// Password or access token for HTTPS authentication.
    pub password_token: Option<String>,

    /// Private key (or path to one) for SSH authentication.
    pub ssh_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_ref().map(|_| "<set>"))
            .field("password_token", &self.password_token.as_ref().map(|_| "<set>"))
            .field("ssh_key", &self.ssh_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

/// A tracked repository.
///
/// `name` and `protocol` are derived from `url` on construction and on every
/// [`RepositoryRecord::set_url`]; there is no other way to change them.
///
/// # Example
///
/// ```rust
/// use hooksync_registry::{RepositoryRecord, Secret};
///
/// let record = RepositoryRecord::new("https://github.com/acme/widgets.git")
///     .with_branch("main")
///     .with_secret(Secret::new("s3cr3t"));
///
/// assert_eq!(record.name(), "widgets");
/// assert_eq!(record.protocol(), "https");
/// assert!(record.validate().is_ok());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Derived identifier, e.g. `widgets`.
    name: String,

    /// Canonical clone URL, the matching key.
    url: String,

    /// Derived transport, e.g. `https` or `ssh`.
    protocol: String,

    /// Target branch; empty means the default branch.
    branch: String,

    /// Secrets accepted for signature verification, in source order.
    secrets: Vec<Secret>,

    /// Whether requests must carry a valid signature.
    secret_required: bool,

    /// Credentials for the sync action.
    credentials: Credentials,
}

impl RepositoryRecord {
    /// Creates a record for `url` with no secrets and `secret_required = true`.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        RepositoryRecord {
            name: derive_name(&url),
            protocol: derive_protocol(&url),
            url,
            branch: String::new(),
            secrets: Vec::new(),
            secret_required: true,
            credentials: Credentials::default(),
        }
    }

    /// Sets the target branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Appends one secret. Empty and duplicate secrets are ignored.
    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.push_secret(secret);
        self
    }

    /// Appends several secrets in order.
    pub fn with_secrets<I>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = Secret>,
    {
        for secret in secrets {
            self.push_secret(secret);
        }
        self
    }

    /// Sets whether a valid signature is required.
    pub fn with_secret_required(mut self, required: bool) -> Self {
        self.secret_required = required;
        self
    }

    /// Sets the credentials used by the sync action.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replaces the URL and re-derives `name` and `protocol`.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.name = derive_name(&url);
        self.protocol = derive_protocol(&url);
        self.url = url;
    }

    fn push_secret(&mut self, secret: Secret) {
        if !secret.is_empty() && !self.secrets.contains(&secret) {
            self.secrets.push(secret);
        }
    }

    /// Derived repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical clone URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Derived protocol.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Target branch, empty for the default branch.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Configured secrets in source order.
    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    /// Whether requests must carry a valid signature.
    pub fn secret_required(&self) -> bool {
        self.secret_required
    }

    /// Credentials for the sync action.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Checks the structural invariants of a record.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidRecord` if the URL is empty or if
    /// signatures are required but no secret is configured.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(RegistryError::InvalidRecord {
                origin: "<empty url>".to_string(),
                reason: "url must not be empty".to_string(),
            });
        }

        if self.secret_required && self.secrets.is_empty() {
            return Err(RegistryError::InvalidRecord {
                origin: self.url.clone(),
                reason: "webhook_secret_required is true but no webhook secret is configured"
                    .to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for RepositoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryRecord")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("protocol", &self.protocol)
            .field("branch", &self.branch)
            .field("secrets", &self.secrets.len())
            .field("secret_required", &self.secret_required)
            .finish()
    }
}

impl fmt::Display for RepositoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" <{}> {}", self.name, self.url, self.secret_required)
    }
}

/// Derives a repository name from its clone URL.
///
/// Takes the last path segment (splitting on `/` and on the `:` of scp-like
/// SSH URLs) and strips a trailing `.git`.
///
/// ```rust
/// use hooksync_registry::models::derive_name;
///
/// assert_eq!(derive_name("https://github.com/acme/widgets.git"), "widgets");
/// assert_eq!(derive_name("git@github.com:acme/widgets.git"), "widgets");
/// assert_eq!(derive_name("https://example.com/team/docs.site/"), "docs.site");
/// ```
pub fn derive_name(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let tail = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    tail.strip_suffix(".git").unwrap_or(tail).to_string()
}

/// Derives the transport protocol from a clone URL.
///
/// - `scheme://...` yields the lowercased scheme
/// - scp-like `user@host:path` yields `ssh`
/// - anything else is treated as a local path and yields `file`
///
/// ```rust
/// use hooksync_registry::models::derive_protocol;
///
/// assert_eq!(derive_protocol("https://github.com/acme/widgets.git"), "https");
/// assert_eq!(derive_protocol("git@github.com:acme/widgets.git"), "ssh");
/// assert_eq!(derive_protocol("/srv/git/widgets.git"), "file");
/// ```
pub fn derive_protocol(url: &str) -> String {
    let url = url.trim();
    if let Some((scheme, _)) = url.split_once("://") {
        return scheme.to_ascii_lowercase();
    }

    match url.split_once(':') {
        Some((authority, _)) if !authority.contains('/') && !authority.is_empty() => {
            "ssh".to_string()
        }
        _ => "file".to_string(),
    }
}

/// Errors that can occur while building or querying the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A record is structurally invalid. The whole load fails.
    #[error("invalid repository record {origin}: {reason}")]
    InvalidRecord {
        /// File or URL identifying the record.
        origin: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A record file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Yaml {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The record source could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Returns true for errors caused by record content rather than I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidRecord { .. } | Self::Yaml { .. })
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
