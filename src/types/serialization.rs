//! Canonical sign bytes.
//!
//! A fixed, big-endian layout of each canonical form. Unlike the digest, the
//! sign bytes always carry the timestamp. A chain that keeps the timestamp
//! out of the digest signs these bytes after the digest (see
//! [`HashScheme::signing_payload`](crate::hashing::HashScheme::signing_payload)).
//! Layouts:
//!
//! ```text
//! vote:       type u64 | height i64 | round i64 | block_id | timestamp | chain_id
//! proposal:   type u64 | height i64 | round i64 | pol_round i64 | block_id | timestamp
//!             | chain_id
//! extension:  extension vec | height i64 | round i64 | chain_id
//!
//! block_id:   0x00                                      (absent)
//!           | 0x01 | hash [32] | total u32 | opt_hash    (present)
//! opt_hash:   len u32 (0 or 32) | bytes
//! timestamp:  unix seconds i64 | nanos u32               (UTC)
//! vec:        len u32 | bytes
//! ```

use chrono::{DateTime, Utc};

use crate::types::canonical::{
    CanonicalBlockId, CanonicalProposal, CanonicalVote, CanonicalVoteExtension,
};
use crate::types::Hash;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{len} bytes do not fit a u32 length prefix")]
    LengthOverflow { len: usize },
}

pub struct Encoder {
    buf: Vec<u8>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }
    pub fn put_bytes32(&mut self, v: &[u8; 32]) {
        self.buf.extend_from_slice(v);
    }
    pub fn put_len(&mut self, len: usize) -> Result<(), EncodeError> {
        let n = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { len })?;
        self.put_u32(n);
        Ok(())
    }
    pub fn put_vec(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        self.put_len(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }
    pub fn put_opt_hash(&mut self, h: Option<&Hash>) {
        match h {
            None => self.put_u32(0),
            Some(Hash(b)) => {
                self.put_u32(32);
                self.buf.extend_from_slice(b);
            }
        }
    }
    pub fn put_block_id(&mut self, bid: Option<&CanonicalBlockId>) {
        match bid {
            None => self.put_u8(0),
            Some(bid) => {
                self.put_u8(1);
                self.put_bytes32(bid.hash().as_bytes());
                self.put_u32(bid.part_set_header().total());
                self.put_opt_hash(bid.part_set_header().hash());
            }
        }
    }
    pub fn put_timestamp(&mut self, t: &DateTime<Utc>) {
        self.put_i64(t.timestamp());
        self.put_u32(t.timestamp_subsec_nanos());
    }
}

pub fn encode_canonical_vote(v: &CanonicalVote) -> Result<Vec<u8>, EncodeError> {
    let mut e = Encoder::new();
    e.put_u64(v.vote_type().code());
    e.put_i64(v.height());
    e.put_i64(v.round());
    e.put_block_id(v.block_id());
    e.put_timestamp(v.timestamp());
    e.put_vec(v.chain_id().as_bytes())?;
    Ok(e.into_bytes())
}

pub fn encode_canonical_proposal(p: &CanonicalProposal) -> Result<Vec<u8>, EncodeError> {
    let mut e = Encoder::new();
    e.put_u64(p.msg_type().code());
    e.put_i64(p.height());
    e.put_i64(p.round());
    e.put_i64(p.pol_round());
    e.put_block_id(p.block_id());
    e.put_timestamp(p.timestamp());
    e.put_vec(p.chain_id().as_bytes())?;
    Ok(e.into_bytes())
}

pub fn encode_canonical_vote_extension(
    x: &CanonicalVoteExtension,
) -> Result<Vec<u8>, EncodeError> {
    let mut e = Encoder::new();
    e.put_vec(x.extension())?;
    e.put_i64(x.height());
    e.put_i64(x.round());
    e.put_vec(x.chain_id().as_bytes())?;
    Ok(e.into_bytes())
}
