use crate::types::{Address, BlockId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Type tag of a signed consensus message. The discriminant is the value
/// committed in the `type` slot of a digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SignedMsgType {
    Unknown = 0,
    Prevote = 1,
    Precommit = 2,
    Proposal = 32,
}

impl SignedMsgType {
    pub fn code(self) -> u64 {
        self as u8 as u64
    }
}

/// A validator's vote as decoded from the wire, transport metadata included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub vote_type: SignedMsgType,
    pub height: i64,
    pub round: i32,
    pub block_id: BlockId, // nil = vote for no block
    pub timestamp: DateTime<FixedOffset>,
    pub validator_address: Address,
    pub validator_index: i32,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
    /// Free-form payload, precommits only.
    #[serde(with = "serde_bytes")]
    pub extension: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub extension_signature: Vec<u8>,
}

impl Vote {
    /// An unsigned vote with no extension.
    pub fn new(
        vote_type: SignedMsgType,
        height: i64,
        round: i32,
        block_id: BlockId,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            vote_type,
            height,
            round,
            block_id,
            timestamp,
            validator_address: Address::ZERO,
            validator_index: 0,
            signature: Vec::new(),
            extension: Vec::new(),
            extension_signature: Vec::new(),
        }
    }
}
