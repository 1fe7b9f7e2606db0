use chrono::{DateTime, Utc};
use tracing::trace;

use crate::crypto::{round, BlockDigest, DigestError, FeltDigest};
use crate::hashing::HashError;
use crate::types::canonical_time;

/// One committed field, in the order it is hashed.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Slot<'a> {
    /// Non-negative integer, 8 bytes big-endian.
    Uint(&'static str, i64),
    /// Two's-complement integer, 8 bytes big-endian.
    Int(&'static str, i64),
    /// Variable-length bytes, zero-padded to the block size.
    Padded(&'static str, &'a [u8]),
    /// Timestamp, committed as its canonical string.
    Time(&'a DateTime<Utc>),
    /// A felt computed elsewhere (block id or the absent-block sentinel).
    Felt(&'static str, FeltDigest),
}

/// Digests each slot on its own, concatenates the results and closes with
/// one felt pass.
pub(crate) struct FieldTree<'a, D: BlockDigest + ?Sized> {
    primitive: &'a D,
    preimage: Vec<u8>,
}

impl<'a, D: BlockDigest + ?Sized> FieldTree<'a, D> {
    pub(crate) fn new(primitive: &'a D) -> Self {
        Self { primitive, preimage: Vec::with_capacity(128) }
    }

    pub(crate) fn push(&mut self, slot: &Slot<'_>) -> Result<(), HashError> {
        match *slot {
            Slot::Uint(field, value) => {
                let v = u64::try_from(value).map_err(|_| HashError::Encoding { field, value })?;
                self.push_wide(field, &v.to_be_bytes())
            }
            Slot::Int(field, value) => self.push_wide(field, &value.to_be_bytes()),
            Slot::Padded(field, bytes) => {
                let padded = round(bytes, self.primitive.block_size())?;
                self.push_wide(field, &padded)
            }
            Slot::Time(t) => {
                let s = canonical_time(t);
                let padded = round(s.as_bytes(), self.primitive.block_size())?;
                self.push_wide("timestamp", &padded)
            }
            Slot::Felt(field, d) => {
                trace!(field, digest = %d, "felt slot");
                self.preimage.extend_from_slice(d.as_bytes());
                Ok(())
            }
        }
    }

    fn push_wide(&mut self, field: &'static str, data: &[u8]) -> Result<(), HashError> {
        let d = self.primitive.wide(data)?;
        trace!(field, digest = %d, "wide slot");
        self.preimage.extend_from_slice(d.as_bytes());
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<FeltDigest, HashError> {
        checked_felt(self.primitive, &self.preimage)
    }
}

/// Runs the felt pass and rejects outputs outside the field.
pub(crate) fn checked_felt<D: BlockDigest + ?Sized>(
    primitive: &D,
    data: &[u8],
) -> Result<FeltDigest, HashError> {
    let d = primitive.felt(data)?;
    if !d.is_canonical() {
        return Err(DigestError::NonCanonicalFelt(d).into());
    }
    Ok(d)
}

pub(crate) fn hash_slots<D: BlockDigest + ?Sized>(
    primitive: &D,
    slots: &[Slot<'_>],
) -> Result<FeltDigest, HashError> {
    let mut tree = FieldTree::new(primitive);
    for slot in slots {
        tree.push(slot)?;
    }
    tree.finish()
}
