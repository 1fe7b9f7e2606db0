//! Canonical forms and field-friendly digests for BFT consensus messages.
//!
//! Votes, proposals and vote extensions are reduced to their signed fields
//! ([`types::canonical`]), hashed field by field into a Stark-field-sized
//! digest ([`hashing`]), and signed over that digest ([`signer`]). The same
//! digest is what an on-chain verifier recomputes, so the layout documented
//! in [`hashing`] is a consensus rule.

pub mod config;
pub mod crypto;
pub mod hashing;
pub mod logging;
pub mod signer;
pub mod types;

pub use config::{CanonicalConfig, HashingSection, TimestampCommitment};
pub use crypto::{BlockDigest, FeltDigest, Sha256Truncated};
pub use hashing::{HashError, HashScheme, Signable, SignableKind};
