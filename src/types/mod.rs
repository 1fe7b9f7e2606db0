pub mod address;
pub mod block_id;
pub mod canonical;
pub mod hash;
pub mod proposal;
pub mod serialization;
pub mod time;
pub mod vote;

pub use address::Address;
pub use block_id::{BlockId, PartSetHeader};
pub use canonical::{
    canonicalize_block_id, canonicalize_part_set_header, canonicalize_proposal, canonicalize_vote,
    canonicalize_vote_extension, CanonicalBlockId, CanonicalError, CanonicalPartSetHeader,
    CanonicalProposal, CanonicalVote, CanonicalVoteExtension,
};
pub use hash::Hash;
pub use proposal::Proposal;
pub use time::canonical_time;
pub use vote::{SignedMsgType, Vote};
