//! Error types for signature header parsing.

use thiserror::Error;

/// Result type alias for verifier operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Reasons a claimed signature cannot even be evaluated.
///
/// # Security Notes
///
/// Messages describe the shape of the header only. They never include a
/// computed MAC or any secret material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// No signature header was sent.
    #[error("signature header is missing")]
    MissingSignature,

    /// The header is not of the form `<algorithm>=<hex>`.
    #[error("signature header is not of the form <algorithm>=<hex>")]
    MalformedHeader,

    /// The algorithm prefix is not one we verify.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The digest part is not valid hex.
    #[error("signature digest is not valid hex")]
    InvalidHex,

    /// The digest has the wrong length for its algorithm.
    #[error("signature digest is {actual} bytes, expected {expected}")]
    DigestLength {
        /// Output size of the named algorithm.
        expected: usize,
        /// Size of the decoded digest.
        actual: usize,
    },

    /// The MAC could not be keyed.
    #[error("invalid HMAC key")]
    InvalidKey,
}
