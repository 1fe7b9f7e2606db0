//! Reduction of wire-level consensus messages to the fields that are
//! actually signed.
//!
//! Canonical forms drop transport metadata (validator index and address,
//! signatures, the extension on the main vote), widen round numbers to
//! `i64` and normalize timestamps to UTC. They can only be obtained through
//! the `canonicalize_*` functions below, which reject inconsistent inputs
//! instead of coercing them.

use crate::types::{BlockId, Hash, PartSetHeader, Proposal, SignedMsgType, Vote};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::time::canonical_utc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("block hash must be empty or 32 bytes, got {0}")]
    BlockHashLength(usize),
    #[error("part set hash must be empty or 32 bytes, got {0}")]
    PartSetHashLength(usize),
    #[error("part set header total {total} inconsistent with hash presence")]
    PartSetInconsistent { total: u32, hash_present: bool },
    #[error("block id has part set header but no block hash")]
    PartialBlockId,
    #[error("message type {0:?} is not a vote")]
    NotAVote(SignedMsgType),
    #[error("vote extension present on {0:?} vote")]
    UnexpectedExtension(SignedMsgType),
    #[error("vote extensions only exist on precommits, got {0:?}")]
    ExtensionOnNonPrecommit(SignedMsgType),
    #[error("pol round {pol_round} invalid for round {round}")]
    InvalidPolRound { pol_round: i32, round: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalPartSetHeader {
    total: u32,
    hash: Option<Hash>,
}

impl CanonicalPartSetHeader {
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn hash(&self) -> Option<&Hash> {
        self.hash.as_ref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalBlockId {
    hash: Hash,
    part_set_header: CanonicalPartSetHeader,
}

impl CanonicalBlockId {
    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn part_set_header(&self) -> &CanonicalPartSetHeader {
        &self.part_set_header
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalVote {
    vote_type: SignedMsgType,
    height: i64,
    round: i64,
    block_id: Option<CanonicalBlockId>,
    timestamp: DateTime<Utc>,
    chain_id: String,
}

impl CanonicalVote {
    pub fn vote_type(&self) -> SignedMsgType {
        self.vote_type
    }
    pub fn height(&self) -> i64 {
        self.height
    }
    pub fn round(&self) -> i64 {
        self.round
    }
    pub fn block_id(&self) -> Option<&CanonicalBlockId> {
        self.block_id.as_ref()
    }
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalProposal {
    msg_type: SignedMsgType,
    height: i64,
    round: i64,
    pol_round: i64,
    block_id: Option<CanonicalBlockId>,
    timestamp: DateTime<Utc>,
    chain_id: String,
}

impl CanonicalProposal {
    /// Always [`SignedMsgType::Proposal`].
    pub fn msg_type(&self) -> SignedMsgType {
        self.msg_type
    }
    pub fn height(&self) -> i64 {
        self.height
    }
    pub fn round(&self) -> i64 {
        self.round
    }
    pub fn pol_round(&self) -> i64 {
        self.pol_round
    }
    pub fn block_id(&self) -> Option<&CanonicalBlockId> {
        self.block_id.as_ref()
    }
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }
}

/// The separately signed extension of a precommit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalVoteExtension {
    #[serde(with = "serde_bytes")]
    extension: Vec<u8>,
    height: i64,
    round: i64,
    chain_id: String,
}

impl CanonicalVoteExtension {
    pub fn extension(&self) -> &[u8] {
        &self.extension
    }
    pub fn height(&self) -> i64 {
        self.height
    }
    pub fn round(&self) -> i64 {
        self.round
    }
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }
}

fn optional_hash(
    bytes: &[u8],
    on_bad_len: fn(usize) -> CanonicalError,
) -> Result<Option<Hash>, CanonicalError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    Hash::from_slice(bytes).map(Some).ok_or_else(|| on_bad_len(bytes.len()))
}

pub fn canonicalize_part_set_header(
    psh: &PartSetHeader,
) -> Result<CanonicalPartSetHeader, CanonicalError> {
    let hash = optional_hash(&psh.hash, CanonicalError::PartSetHashLength)?;
    if (psh.total == 0) != hash.is_none() {
        return Err(CanonicalError::PartSetInconsistent {
            total: psh.total,
            hash_present: hash.is_some(),
        });
    }
    Ok(CanonicalPartSetHeader { total: psh.total, hash })
}

/// `Ok(None)` for the nil BlockID. Hashing must commit that case through the
/// absent-block sentinel, never as zero bytes.
pub fn canonicalize_block_id(bid: &BlockId) -> Result<Option<CanonicalBlockId>, CanonicalError> {
    if bid.is_nil() {
        return Ok(None);
    }
    let part_set_header = canonicalize_part_set_header(&bid.part_set_header)?;
    let hash = optional_hash(&bid.hash, CanonicalError::BlockHashLength)?
        .ok_or(CanonicalError::PartialBlockId)?;
    Ok(Some(CanonicalBlockId { hash, part_set_header }))
}

/// Validator index and address are not carried over: two validators casting
/// the same vote produce the same canonical vote.
pub fn canonicalize_vote(chain_id: &str, vote: &Vote) -> Result<CanonicalVote, CanonicalError> {
    if vote.vote_type == SignedMsgType::Proposal {
        return Err(CanonicalError::NotAVote(vote.vote_type));
    }
    if vote.vote_type != SignedMsgType::Precommit && !vote.extension.is_empty() {
        return Err(CanonicalError::UnexpectedExtension(vote.vote_type));
    }
    Ok(CanonicalVote {
        vote_type: vote.vote_type,
        height: vote.height,
        round: i64::from(vote.round),
        block_id: canonicalize_block_id(&vote.block_id)?,
        timestamp: canonical_utc(&vote.timestamp),
        chain_id: chain_id.to_string(),
    })
}

pub fn canonicalize_vote_extension(
    chain_id: &str,
    vote: &Vote,
) -> Result<CanonicalVoteExtension, CanonicalError> {
    if vote.vote_type != SignedMsgType::Precommit {
        return Err(CanonicalError::ExtensionOnNonPrecommit(vote.vote_type));
    }
    Ok(CanonicalVoteExtension {
        extension: vote.extension.clone(),
        height: vote.height,
        round: i64::from(vote.round),
        chain_id: chain_id.to_string(),
    })
}

pub fn canonicalize_proposal(
    chain_id: &str,
    proposal: &Proposal,
) -> Result<CanonicalProposal, CanonicalError> {
    let pol_ok = proposal.pol_round == -1 || (0..proposal.round).contains(&proposal.pol_round);
    if !pol_ok {
        return Err(CanonicalError::InvalidPolRound {
            pol_round: proposal.pol_round,
            round: proposal.round,
        });
    }
    Ok(CanonicalProposal {
        msg_type: SignedMsgType::Proposal,
        height: proposal.height,
        round: i64::from(proposal.round),
        pol_round: i64::from(proposal.pol_round),
        block_id: canonicalize_block_id(&proposal.block_id)?,
        timestamp: canonical_utc(&proposal.timestamp),
        chain_id: chain_id.to_string(),
    })
}
