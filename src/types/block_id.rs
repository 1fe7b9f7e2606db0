use serde::{Deserialize, Serialize};

/// Chunking metadata of a block's wire encoding, as decoded from the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSetHeader {
    pub total: u32,
    #[serde(with = "serde_bytes")]
    pub hash: Vec<u8>,
}

impl PartSetHeader {
    pub fn is_zero(&self) -> bool {
        self.total == 0 && self.hash.is_empty()
    }
}

/// Identity of a proposed block. The zero value means "no block" (a nil vote).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockId {
    #[serde(with = "serde_bytes")]
    pub hash: Vec<u8>,
    pub part_set_header: PartSetHeader,
}

impl BlockId {
    pub fn new(hash: [u8; 32], total: u32, parts_hash: [u8; 32]) -> Self {
        Self {
            hash: hash.to_vec(),
            part_set_header: PartSetHeader { total, hash: parts_hash.to_vec() },
        }
    }

    /// The nil BlockID: no hash, no parts.
    pub fn nil() -> Self {
        Self::default()
    }

    pub fn is_nil(&self) -> bool {
        self.hash.is_empty() && self.part_set_header.is_zero()
    }
}
