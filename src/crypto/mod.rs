pub mod digest;
pub mod ed25519;
pub mod rounding;

pub use digest::{BlockDigest, DigestError, FeltDigest, Sha256Truncated, WideDigest, STARK_PRIME};
pub use rounding::{round, RoundingError};
