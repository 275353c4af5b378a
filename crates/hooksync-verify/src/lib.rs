//! # Hooksync Verify - Webhook Signature Verification
//!
//! Authenticates webhook deliveries against the shared secrets of the
//! repository they resolved to.
//!
//! ## Purpose
//!
//! 1. **Header Parsing** - `sha1=<hex>` / `sha256=<hex>` into a typed
//!    [`ClaimedSignature`].
//! 2. **Multi-Key HMAC** - every configured secret is tried, so secrets can be
//!    rotated with old and new both valid.
//! 3. **Constant-Time Comparison** - digests are compared with
//!    `subtle::ConstantTimeEq` and results folded without branching.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Forged delivery | Attacker posts a push for a tracked repo | HMAC over raw body |
//! | Timing oracle | Digest guessed byte by byte | Constant-time compare |
//! | Key probing | Timing reveals which secret is close | All secrets always evaluated |
//! | Log scraping | Secrets recovered from logs | Only MAC fingerprints logged |
//!
//! ## Usage
//!
//! ```rust
//! use hooksync_registry::{RepositoryRecord, Secret};
//! use hooksync_verify::{verify, Rejection, Verification};
//!
//! let record = RepositoryRecord::new("https://github.com/acme/widgets.git")
//!     .with_secrets([Secret::new("old"), Secret::new("new")]);
//!
//! match verify(&record, b"{}", Some("sha1=0000000000000000000000000000000000000000")) {
//!     Verification::Accepted(_) => unreachable!(),
//!     Verification::Rejected(Rejection::SignatureMismatch { keys_checked, .. }) => {
//!         assert_eq!(keys_checked, 2);
//!     }
//!     Verification::Rejected(other) => panic!("{}", other),
//! }
//! ```
//!
//! ## Security Considerations
//!
//! - `secret_required = false` records are accepted without any check. This
//!   mode exists for repositories whose provider hook has no secret; every
//!   such acceptance is logged at `warn`.
//! - SHA-1 is acceptable inside HMAC, but prefer `sha256` when the provider
//!   sends both headers.

pub mod error;
pub mod signature;
pub mod verifier;

pub use error::{Result, VerifyError};
pub use signature::{fingerprint, sign, ClaimedSignature, SignatureAlgorithm, SHA1_HEADER, SHA256_HEADER};
pub use verifier::{digest_matches, verify, verify_claimed, Acceptance, Rejection, Verification};
