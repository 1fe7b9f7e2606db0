//! The block-digest primitive.
//!
//! Digests are consumed twice: signed by validators and recomputed inside a
//! STARK verifier whose native element is a felt modulo
//! `P = 2^251 + 17 * 2^192 + 1`. The final ("felt") digest therefore has to
//! be a canonical field element; the intermediate ("wide") digest is a
//! 128-bit value used for per-field domain separation.

use sha2::{Digest, Sha256};
use std::fmt;

pub const WIDE_DIGEST_LEN: usize = 16;
pub const FELT_DIGEST_LEN: usize = 32;

/// Big-endian encoding of the Stark field prime.
pub const STARK_PRIME: [u8; FELT_DIGEST_LEN] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest is not a canonical field element: {0}")]
    NonCanonicalFelt(FeltDigest),
    #[error("digest primitive failure: {0}")]
    Backend(String),
}

/// 128-bit intermediate digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WideDigest(pub [u8; WIDE_DIGEST_LEN]);

/// Field-sized digest, big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeltDigest(pub [u8; FELT_DIGEST_LEN]);

impl WideDigest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FeltDigest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when the value is strictly below [`STARK_PRIME`].
    pub fn is_canonical(&self) -> bool {
        self.0 < STARK_PRIME
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for FeltDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for WideDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A fixed-output hash over fixed-size blocks.
///
/// Implementations are frozen for the lifetime of a chain: swapping the
/// primitive changes every digest and breaks agreement with peers and with
/// the on-chain verifier.
pub trait BlockDigest: Send + Sync {
    /// Variable-length fields are zero-padded to a multiple of this size.
    fn block_size(&self) -> usize;

    fn wide(&self, data: &[u8]) -> Result<WideDigest, DigestError>;

    /// Must return a value below [`STARK_PRIME`]; callers verify this.
    fn felt(&self, data: &[u8]) -> Result<FeltDigest, DigestError>;
}

/// SHA-256 truncated to 128 bits for wide digests, and masked to 251 bits
/// for felt digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Truncated;

impl Sha256Truncated {
    pub const BLOCK_SIZE: usize = 16;

    fn sha256(data: &[u8]) -> [u8; 32] {
        let mut h = Sha256::new();
        h.update(data);
        let out = h.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&out);
        bytes
    }
}

impl BlockDigest for Sha256Truncated {
    fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    fn wide(&self, data: &[u8]) -> Result<WideDigest, DigestError> {
        let full = Self::sha256(data);
        let mut out = [0u8; WIDE_DIGEST_LEN];
        out.copy_from_slice(&full[..WIDE_DIGEST_LEN]);
        Ok(WideDigest(out))
    }

    fn felt(&self, data: &[u8]) -> Result<FeltDigest, DigestError> {
        let mut out = Self::sha256(data);
        // keep 251 bits
        out[0] &= 0x07;
        Ok(FeltDigest(out))
    }
}
