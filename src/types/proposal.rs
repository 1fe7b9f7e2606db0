use crate::types::BlockId;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub height: i64,
    pub round: i32,
    pub pol_round: i32, // -1 if none
    pub block_id: BlockId,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl Proposal {
    pub fn new(
        height: i64,
        round: i32,
        pol_round: i32,
        block_id: BlockId,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self { height, round, pol_round, block_id, timestamp, signature: Vec::new() }
    }
}
