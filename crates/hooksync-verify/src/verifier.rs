//! # Multi-Key Signature Verifier
//!
//! Decides whether a delivery is authentically signed for the repository it
//! resolved to.
//!
//! ## Algorithm
//!
//! 1. A record with `secret_required = false` is accepted without looking at
//!    the header. This is an explicit trust decision and is logged at `warn`.
//! 2. Otherwise the header is parsed; a missing or unparsable header is
//!    rejected as malformed.
//! 3. The MAC of the raw body is computed under **every** configured secret
//!    and compared to the claimed digest in constant time. Results are folded
//!    together without branching, so neither the position of the matching
//!    secret nor the length of a matching digest prefix changes the work done.
//! 4. Any match accepts; otherwise the delivery is rejected as a mismatch.
//!
//! The body must be the exact bytes received. Re-serializing parsed JSON
//! changes whitespace and key order and breaks the digest.
//!
//! ## Threat Model
//!
//! | Threat | Defense |
//! |--------|---------|
//! | Byte-at-a-time forgery via timing | `subtle::ConstantTimeEq` on full digests |
//! | Learning which secret is "closer" | all secrets evaluated, branch-free fold |
//! | Secret disclosure in logs | only MAC fingerprints are logged |

use crate::error::VerifyError;
use crate::signature::{fingerprint, ClaimedSignature, SignatureAlgorithm};
use hooksync_registry::RepositoryRecord;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use tracing::{debug, warn};

/// Why a delivery was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// The record does not require signatures.
    Unsigned,

    /// A configured secret produced the claimed digest.
    Signed {
        /// Algorithm named by the header.
        algorithm: SignatureAlgorithm,
        /// Position of the matching secret in the record's secret list.
        key_index: usize,
    },
}

/// Why a delivery was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The signature header is absent or unparsable.
    MalformedSignature(VerifyError),

    /// No configured secret produced the claimed digest.
    SignatureMismatch {
        /// Algorithm named by the header.
        algorithm: SignatureAlgorithm,
        /// Number of secrets evaluated.
        keys_checked: usize,
    },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MalformedSignature(err) => write!(f, "malformed signature: {}", err),
            Rejection::SignatureMismatch {
                algorithm,
                keys_checked,
            } => write!(
                f,
                "{} signature matched none of {} configured secret(s)",
                algorithm, keys_checked
            ),
        }
    }
}

/// Result of verifying one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The delivery is trusted.
    Accepted(Acceptance),

    /// The delivery must not be acted upon.
    Rejected(Rejection),
}

impl Verification {
    /// Returns true if the delivery was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verification::Accepted(_))
    }

    /// Returns the rejection reason, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verification::Rejected(reason) => Some(reason),
            Verification::Accepted(_) => None,
        }
    }
}

/// Verifies a delivery against a resolved record.
///
/// # Arguments
///
/// * `record` - The record the delivery resolved to
/// * `raw_body` - The exact request body bytes
/// * `claimed_header` - The raw signature header value, if present
///
/// # Example
///
/// ```rust
/// use hooksync_registry::{RepositoryRecord, Secret};
/// use hooksync_verify::{sign, verify, SignatureAlgorithm};
///
/// let record = RepositoryRecord::new("https://github.com/acme/widgets.git")
///     .with_secret(Secret::new("s3cr3t"));
/// let body = br#"{"after":"abc123"}"#;
///
/// let header = sign(SignatureAlgorithm::Sha1, b"s3cr3t", body).unwrap();
/// assert!(verify(&record, body, Some(&header)).is_accepted());
///
/// let forged = sign(SignatureAlgorithm::Sha1, b"guess", body).unwrap();
/// assert!(!verify(&record, body, Some(&forged)).is_accepted());
/// ```
pub fn verify(record: &RepositoryRecord, raw_body: &[u8], claimed_header: Option<&str>) -> Verification {
    if !record.secret_required() {
        warn!(
            repository = %record.name(),
            "accepting delivery WITHOUT signature check: webhook_secret_required is false"
        );
        return Verification::Accepted(Acceptance::Unsigned);
    }

    let claimed = match claimed_header
        .ok_or(VerifyError::MissingSignature)
        .and_then(ClaimedSignature::parse)
    {
        Ok(claimed) => claimed,
        Err(err) => {
            debug!(repository = %record.name(), error = %err, "signature header rejected");
            return Verification::Rejected(Rejection::MalformedSignature(err));
        }
    };

    verify_claimed(record, raw_body, &claimed)
}

/// Compares a computed MAC with a claimed digest in constant time.
///
/// Runtime depends only on the input lengths, never on where the first
/// differing byte is. Digests of different lengths never match.
pub fn digest_matches(computed: &[u8], claimed: &[u8]) -> Choice {
    computed.ct_eq(claimed)
}

/// Verifies an already parsed signature against every configured secret.
pub fn verify_claimed(
    record: &RepositoryRecord,
    raw_body: &[u8],
    claimed: &ClaimedSignature,
) -> Verification {
    let algorithm = claimed.algorithm();
    let mut any_match = Choice::from(0u8);
    let mut key_index = 0u32;
    let mut keys_checked = 0usize;

    for (index, secret) in record.secrets().iter().enumerate() {
        let computed = match algorithm.mac(secret.expose(), raw_body) {
            Ok(mac) => mac,
            Err(err) => {
                warn!(repository = %record.name(), key_index = index, error = %err, "secret could not key the MAC");
                continue;
            }
        };
        keys_checked += 1;

        let is_match = digest_matches(&computed, claimed.digest());
        any_match |= is_match;
        key_index.conditional_assign(&(index as u32), is_match);

        debug!(
            repository = %record.name(),
            key_index = index,
            mac_fingerprint = %fingerprint(&computed),
            "evaluated webhook secret"
        );
    }

    if bool::from(any_match) {
        Verification::Accepted(Acceptance::Signed {
            algorithm,
            key_index: key_index as usize,
        })
    } else {
        Verification::Rejected(Rejection::SignatureMismatch {
            algorithm,
            keys_checked,
        })
    }
}
