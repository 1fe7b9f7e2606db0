//! Field-wise digests of canonical consensus messages.
//!
//! Every canonical field is digested on its own with the wide (128-bit)
//! primitive, the per-field digests are concatenated in a fixed order, and
//! one felt pass over the concatenation yields the value that is signed and
//! recomputed on chain. Each intermediate call stays within one bounded
//! input, and no two fields can bleed into each other.
//!
//! # Slot layouts
//!
//! `W(x)` is the wide digest, `F(x)` the felt digest, `be8(n)` the 8-byte
//! big-endian encoding and `pad(x)` zero-padding to the block size.
//!
//! ```text
//! vote      = F( W(be8 type) | W(be8 height) | W(be8 round) | block_id
//!              | [W(pad time)] | W(pad chain_id) )
//! proposal  = F( W(be8 type) | W(be8 height) | W(be8 round) | W(be8 pol_round)
//!              | block_id | [W(pad time)] | W(pad chain_id) )
//! extension = F( W(pad extension) | W(be8 height) | W(be8 round) | W(pad chain_id) )
//!
//! block_id  = F( hash[32] | F( W(be8 total) | part_set_hash ) )   if present
//!           = F( "" )                                             if absent
//! ```
//!
//! `[W(pad time)]` is present only under
//! [`TimestampCommitment::CanonicalString`]; `time` is the string produced
//! by [`canonical_time`](crate::types::canonical_time). `pol_round` is
//! two's complement, so "none" (`-1`) is `ff..ff`. Height and round must be
//! non-negative.
//!
//! # Signing payload
//!
//! ```text
//! CanonicalString:  felt digest
//! Excluded:         felt digest | sign_bytes      (votes and proposals)
//! ```
//!
//! Under [`TimestampCommitment::Excluded`] the timestamp reaches the
//! signature only through the appended
//! [sign bytes](crate::types::serialization). Extensions carry no timestamp
//! and are always signed over the digest alone.

mod tree;

use tracing::{debug, warn};

use crate::config::{HashingSection, PrimitiveKind, TimestampCommitment};
use crate::crypto::{BlockDigest, DigestError, FeltDigest, RoundingError, Sha256Truncated};
use crate::types::canonical::{
    canonicalize_proposal, canonicalize_vote, canonicalize_vote_extension, CanonicalBlockId,
    CanonicalError, CanonicalPartSetHeader, CanonicalProposal, CanonicalVote,
    CanonicalVoteExtension,
};
use crate::types::serialization::{
    encode_canonical_proposal, encode_canonical_vote, encode_canonical_vote_extension, EncodeError,
};
use crate::types::{Proposal, Vote};

use tree::{checked_felt, hash_slots, Slot};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("malformed input: {0}")]
    Malformed(#[from] CanonicalError),
    #[error("{field} = {value} does not fit an unsigned fixed-width slot")]
    Encoding { field: &'static str, value: i64 },
    #[error("padding failed: {0}")]
    Padding(#[from] RoundingError),
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error("sign bytes: {0}")]
    SignBytes(#[from] EncodeError),
}

/// Kind tag of a [`Signable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignableKind {
    Vote,
    Proposal,
    VoteExtension,
}

/// Anything that gets signed, in canonical form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signable {
    Vote(CanonicalVote),
    Proposal(CanonicalProposal),
    VoteExtension(CanonicalVoteExtension),
}

impl Signable {
    pub fn kind(&self) -> SignableKind {
        match self {
            Signable::Vote(_) => SignableKind::Vote,
            Signable::Proposal(_) => SignableKind::Proposal,
            Signable::VoteExtension(_) => SignableKind::VoteExtension,
        }
    }

    pub fn height(&self) -> i64 {
        match self {
            Signable::Vote(v) => v.height(),
            Signable::Proposal(p) => p.height(),
            Signable::VoteExtension(x) => x.height(),
        }
    }

    pub fn round(&self) -> i64 {
        match self {
            Signable::Vote(v) => v.round(),
            Signable::Proposal(p) => p.round(),
            Signable::VoteExtension(x) => x.round(),
        }
    }

    /// Fixed-layout canonical bytes, timestamp included.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            Signable::Vote(v) => encode_canonical_vote(v),
            Signable::Proposal(p) => encode_canonical_proposal(p),
            Signable::VoteExtension(x) => encode_canonical_vote_extension(x),
        }
    }
}

impl From<CanonicalVote> for Signable {
    fn from(v: CanonicalVote) -> Self {
        Signable::Vote(v)
    }
}

impl From<CanonicalProposal> for Signable {
    fn from(p: CanonicalProposal) -> Self {
        Signable::Proposal(p)
    }
}

impl From<CanonicalVoteExtension> for Signable {
    fn from(x: CanonicalVoteExtension) -> Self {
        Signable::VoteExtension(x)
    }
}

/// The chain-wide hashing configuration: one primitive and one timestamp
/// construction, both fixed for the life of the chain.
///
/// Immutable once built, `Send + Sync`, and cheap to share by reference.
#[derive(Clone, Debug)]
pub struct HashScheme<D: BlockDigest = Sha256Truncated> {
    primitive: D,
    timestamp: TimestampCommitment,
}

impl HashScheme<Sha256Truncated> {
    pub fn from_config(cfg: &HashingSection) -> Self {
        match cfg.primitive {
            PrimitiveKind::Sha256Truncated => Self::with_primitive(Sha256Truncated, cfg.timestamp),
        }
    }
}

impl<D: BlockDigest> HashScheme<D> {
    pub fn with_primitive(primitive: D, timestamp: TimestampCommitment) -> Self {
        Self { primitive, timestamp }
    }

    pub fn primitive(&self) -> &D {
        &self.primitive
    }

    pub fn timestamp_commitment(&self) -> TimestampCommitment {
        self.timestamp
    }

    /// Stands in for a nil BlockID. Distinct from the digest of any real
    /// BlockID, including one whose hash is all zeros.
    pub fn absent_block_id_digest(&self) -> Result<FeltDigest, HashError> {
        checked_felt(&self.primitive, &[])
    }

    pub fn hash_part_set_header(
        &self,
        psh: &CanonicalPartSetHeader,
    ) -> Result<FeltDigest, HashError> {
        let total = self.primitive.wide(&u64::from(psh.total()).to_be_bytes())?;
        let mut buf = Vec::with_capacity(total.as_bytes().len() + 32);
        buf.extend_from_slice(total.as_bytes());
        if let Some(h) = psh.hash() {
            buf.extend_from_slice(h.as_bytes());
        }
        checked_felt(&self.primitive, &buf)
    }

    pub fn hash_block_id(&self, bid: Option<&CanonicalBlockId>) -> Result<FeltDigest, HashError> {
        let Some(bid) = bid else {
            return self.absent_block_id_digest();
        };
        let psh = self.hash_part_set_header(bid.part_set_header())?;
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(bid.hash().as_bytes());
        buf.extend_from_slice(psh.as_bytes());
        checked_felt(&self.primitive, &buf)
    }

    pub fn hash_canonical_vote(&self, v: &CanonicalVote) -> Result<FeltDigest, HashError> {
        let block_id = self.hash_block_id(v.block_id())?;
        let mut slots = vec![
            Slot::Uint("type", v.vote_type().code() as i64),
            Slot::Uint("height", v.height()),
            Slot::Uint("round", v.round()),
            Slot::Felt("block_id", block_id),
        ];
        if self.timestamp == TimestampCommitment::CanonicalString {
            slots.push(Slot::Time(v.timestamp()));
        }
        slots.push(Slot::Padded("chain_id", v.chain_id().as_bytes()));
        hash_slots(&self.primitive, &slots)
    }

    pub fn hash_canonical_proposal(&self, p: &CanonicalProposal) -> Result<FeltDigest, HashError> {
        let block_id = self.hash_block_id(p.block_id())?;
        let mut slots = vec![
            Slot::Uint("type", p.msg_type().code() as i64),
            Slot::Uint("height", p.height()),
            Slot::Uint("round", p.round()),
            Slot::Int("pol_round", p.pol_round()),
            Slot::Felt("block_id", block_id),
        ];
        if self.timestamp == TimestampCommitment::CanonicalString {
            slots.push(Slot::Time(p.timestamp()));
        }
        slots.push(Slot::Padded("chain_id", p.chain_id().as_bytes()));
        hash_slots(&self.primitive, &slots)
    }

    pub fn hash_canonical_vote_extension(
        &self,
        x: &CanonicalVoteExtension,
    ) -> Result<FeltDigest, HashError> {
        let slots = [
            Slot::Padded("extension", x.extension()),
            Slot::Uint("height", x.height()),
            Slot::Uint("round", x.round()),
            Slot::Padded("chain_id", x.chain_id().as_bytes()),
        ];
        hash_slots(&self.primitive, &slots)
    }

    pub fn digest(&self, signable: &Signable) -> Result<FeltDigest, HashError> {
        let d = match signable {
            Signable::Vote(v) => self.hash_canonical_vote(v),
            Signable::Proposal(p) => self.hash_canonical_proposal(p),
            Signable::VoteExtension(x) => self.hash_canonical_vote_extension(x),
        }?;
        debug!(
            kind = ?signable.kind(),
            height = signable.height(),
            round = signable.round(),
            digest = %d,
            "computed signable digest"
        );
        Ok(d)
    }

    /// The bytes a validator signs for `signable`: the digest, followed by
    /// the sign bytes when the digest leaves the timestamp out.
    pub fn signing_payload(&self, signable: &Signable) -> Result<Vec<u8>, HashError> {
        let digest = self.digest(signable)?;
        let mut payload = digest.as_bytes().to_vec();
        let carries_time = signable.kind() != SignableKind::VoteExtension;
        if self.timestamp == TimestampCommitment::Excluded && carries_time {
            payload.extend_from_slice(&signable.sign_bytes()?);
        }
        Ok(payload)
    }

    /// Canonicalizes and digests a vote.
    pub fn vote_digest(&self, chain_id: &str, vote: &Vote) -> Result<FeltDigest, HashError> {
        self.digest(&Signable::Vote(canonical_vote(chain_id, vote)?))
    }

    pub fn vote_signing_payload(&self, chain_id: &str, vote: &Vote) -> Result<Vec<u8>, HashError> {
        self.signing_payload(&Signable::Vote(canonical_vote(chain_id, vote)?))
    }

    pub fn vote_extension_digest(
        &self,
        chain_id: &str,
        vote: &Vote,
    ) -> Result<FeltDigest, HashError> {
        let cx = canonicalize_vote_extension(chain_id, vote).map_err(|e| {
            warn!(error = %e, height = vote.height, round = vote.round, "rejecting vote extension");
            e
        })?;
        self.digest(&Signable::VoteExtension(cx))
    }

    pub fn proposal_digest(
        &self,
        chain_id: &str,
        proposal: &Proposal,
    ) -> Result<FeltDigest, HashError> {
        self.digest(&Signable::Proposal(canonical_proposal(chain_id, proposal)?))
    }

    pub fn proposal_signing_payload(
        &self,
        chain_id: &str,
        proposal: &Proposal,
    ) -> Result<Vec<u8>, HashError> {
        self.signing_payload(&Signable::Proposal(canonical_proposal(chain_id, proposal)?))
    }
}

fn canonical_vote(chain_id: &str, vote: &Vote) -> Result<CanonicalVote, HashError> {
    canonicalize_vote(chain_id, vote).map_err(|e| {
        warn!(error = %e, height = vote.height, round = vote.round, "rejecting vote");
        e.into()
    })
}

fn canonical_proposal(chain_id: &str, proposal: &Proposal) -> Result<CanonicalProposal, HashError> {
    canonicalize_proposal(chain_id, proposal).map_err(|e| {
        warn!(error = %e, height = proposal.height, round = proposal.round, "rejecting proposal");
        e.into()
    })
}
