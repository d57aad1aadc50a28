//! # Content Digest — Commitment Hashes
//!
//! `ContentDigest` is the value the ledger publishes in place of a
//! confidential payload. Every organization on the channel can read it;
//! only collection members can read the payload it commits to.
//!
//! Two construction paths exist:
//!
//! - [`sha256_digest()`] over `CanonicalBytes`, used by contracts that need to
//!   recompute a commitment from a record (e.g. verifying an order payload
//!   shown off-chain).
//! - [`sha256_bytes()`] over opaque bytes, used by the ledger which hashes
//!   whatever value it was handed without interpreting it.
//!
//! Because contracts only ever write `CanonicalBytes`, both paths agree for
//! every record this workspace produces.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256, the commitment algorithm of the host ledger.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Interpret a raw 32-byte slice returned by the ledger as a SHA-256 digest.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDigest` if the slice is not exactly 32 bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, CoreError> {
        let bytes: [u8; 32] = raw.try_into().map_err(|_| {
            CoreError::InvalidDigest(format!("expected 32 bytes, got {}", raw.len()))
        })?;
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }

    /// Parse a 64-character lowercase or uppercase hex string.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDigest` on wrong length or non-hex input.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        if hex.len() != 64 {
            return Err(CoreError::InvalidDigest(format!(
                "expected 64 hex characters, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| CoreError::InvalidDigest("non-ASCII hex input".into()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|e| CoreError::InvalidDigest(format!("{pair:?}: {e}")))?;
        }
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The raw digest bytes, as the ledger stores them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    sha256_bytes(data.as_bytes())
}

/// Compute a SHA-256 digest over opaque bytes.
pub fn sha256_bytes(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}
