//! # Signature Headers and MAC Computation
//!
//! Providers sign the raw request body with HMAC and send the hex digest in a
//! header of the form `<algorithm>=<hex-digest>`:
//!
//! | Header | Value |
//! |--------|-------|
//! | `X-Hub-Signature` | `sha1=<40 hex chars>` |
//! | `X-Hub-Signature-256` | `sha256=<64 hex chars>` |
//!
//! This module parses such headers into a [`ClaimedSignature`] and computes
//! MACs for comparison. Comparison itself lives in [`crate::verifier`].
//!
//! ## References
//!
//! - RFC 2104 - HMAC: Keyed-Hashing for Message Authentication
//! - GitHub Docs - "Validating webhook deliveries"

use crate::error::{Result, VerifyError};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Header carrying an HMAC-SHA1 signature.
pub const SHA1_HEADER: &str = "X-Hub-Signature";

/// Header carrying an HMAC-SHA256 signature.
pub const SHA256_HEADER: &str = "X-Hub-Signature-256";

/// MAC algorithms accepted in a signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, `sha1=` prefix.
    Sha1,
    /// HMAC-SHA256, `sha256=` prefix.
    Sha256,
}

impl SignatureAlgorithm {
    /// Header prefix for this algorithm.
    pub fn prefix(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }

    /// MAC output size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            SignatureAlgorithm::Sha1 => 20,
            SignatureAlgorithm::Sha256 => 32,
        }
    }

    /// Computes the MAC of `body` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::InvalidKey` if the MAC rejects the key. HMAC
    /// accepts keys of any length, so this does not happen in practice.
    pub fn mac(self, key: &[u8], body: &[u8]) -> Result<Vec<u8>> {
        match self {
            SignatureAlgorithm::Sha1 => hmac_digest::<Hmac<Sha1>>(key, body),
            SignatureAlgorithm::Sha256 => hmac_digest::<Hmac<Sha256>>(key, body),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(VerifyError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

fn hmac_digest<M>(key: &[u8], body: &[u8]) -> Result<Vec<u8>>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| VerifyError::InvalidKey)?;
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// A parsed signature header.
#[derive(Clone, PartialEq, Eq)]
pub struct ClaimedSignature {
    algorithm: SignatureAlgorithm,
    digest: Vec<u8>,
}

impl ClaimedSignature {
    /// Parses `<algorithm>=<hex-digest>`.
    ///
    /// # Errors
    ///
    /// - `MalformedHeader` if there is no `=`
    /// - `UnsupportedAlgorithm` for an unknown prefix
    /// - `InvalidHex` if the digest is not hex
    /// - `DigestLength` if the digest length does not fit the algorithm
    ///
    /// # Example
    ///
    /// ```rust
    /// use hooksync_verify::{ClaimedSignature, SignatureAlgorithm};
    ///
    /// let claimed =
    ///     ClaimedSignature::parse("sha1=b58ed79d892ebfc3fe8e7dd733aa784dd67c09a4").unwrap();
    /// assert_eq!(claimed.algorithm(), SignatureAlgorithm::Sha1);
    ///
    /// assert!(ClaimedSignature::parse("md5=00").is_err());
    /// assert!(ClaimedSignature::parse("sha1=zz").is_err());
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let (prefix, hex_digest) = header
            .trim()
            .split_once('=')
            .ok_or(VerifyError::MalformedHeader)?;

        let algorithm: SignatureAlgorithm = prefix.parse()?;
        let digest = hex::decode(hex_digest.trim()).map_err(|_| VerifyError::InvalidHex)?;

        if digest.len() != algorithm.output_len() {
            return Err(VerifyError::DigestLength {
                expected: algorithm.output_len(),
                actual: digest.len(),
            });
        }

        Ok(ClaimedSignature { algorithm, digest })
    }

    /// Algorithm named by the header.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Decoded digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Debug for ClaimedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimedSignature")
            .field("algorithm", &self.algorithm)
            .field("digest", &fingerprint(&self.digest))
            .finish()
    }
}

/// Builds the header value a provider would send for `body` signed with
/// `secret`.
///
/// ```rust
/// use hooksync_verify::{sign, SignatureAlgorithm};
///
/// let header = sign(SignatureAlgorithm::Sha256, b"key", b"body").unwrap();
/// assert!(header.starts_with("sha256="));
/// assert_eq!(header.len(), "sha256=".len() + 64);
/// ```
pub fn sign(algorithm: SignatureAlgorithm, secret: &[u8], body: &[u8]) -> Result<String> {
    let mac = algorithm.mac(secret, body)?;
    Ok(format!("{}={}", algorithm.prefix(), hex::encode(mac)))
}

/// Opaque, non-reversible label for a MAC value, safe to log.
///
/// The first eight bytes of SHA-256 over the MAC, hex encoded.
pub fn fingerprint(mac: &[u8]) -> String {
    let digest = Sha256::digest(mac);
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha1_vector() {
        // RFC 2202 test case 2
        let mac = SignatureAlgorithm::Sha1
            .mac(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(hex::encode(mac), "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn test_known_sha256_vector() {
        // RFC 4231 test case 2
        let mac = SignatureAlgorithm::Sha256
            .mac(b"Jefe", b"what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_parse_accepts_uppercase_hex_and_prefix() {
        let claimed = ClaimedSignature::parse(" SHA1=EFFCDF6AE5EB2FA2D27416D5F184DF9C259A7C79 ").unwrap();
        assert_eq!(claimed.algorithm(), SignatureAlgorithm::Sha1);
        assert_eq!(claimed.digest().len(), 20);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ClaimedSignature::parse("effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"),
            Err(VerifyError::MalformedHeader)
        );
        assert_eq!(
            ClaimedSignature::parse("md5=00"),
            Err(VerifyError::UnsupportedAlgorithm("md5".to_string()))
        );
        assert_eq!(ClaimedSignature::parse("sha1=xyz"), Err(VerifyError::InvalidHex));
        assert_eq!(
            ClaimedSignature::parse("sha256=effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"),
            Err(VerifyError::DigestLength {
                expected: 32,
                actual: 20
            })
        );
        assert_eq!(ClaimedSignature::parse("sha1="), Err(VerifyError::DigestLength {
            expected: 20,
            actual: 0
        }));
    }

    #[test]
    fn test_sign_round_trips_through_parse() {
        let header = sign(SignatureAlgorithm::Sha1, b"s3cr3t", br#"{"after":"abc123"}"#).unwrap();
        let claimed = ClaimedSignature::parse(&header).unwrap();
        let expected = SignatureAlgorithm::Sha1
            .mac(b"s3cr3t", br#"{"after":"abc123"}"#)
            .unwrap();
        assert_eq!(claimed.digest(), expected.as_slice());
    }

    #[test]
    fn test_fingerprint_does_not_reveal_mac() {
        let mac = SignatureAlgorithm::Sha1.mac(b"k", b"b").unwrap();
        let fp = fingerprint(&mac);
        assert_eq!(fp.len(), 16);
        assert!(!hex::encode(&mac).contains(&fp));
    }
}
