//! Signing and verification of votes and proposals.
//!
//! The hashing layer hands out the signing payload (the digest, plus the sign
//! bytes when the digest leaves the timestamp out); this module is the thin
//! bridge to ed25519 keys. Precommits carry a second signature over the extension
//! digest so that extension policy can change without touching the vote
//! signature.

use ed25519_dalek::{SigningKey, VerifyingKey};
use tracing::warn;

use crate::crypto::digest::BlockDigest;
use crate::crypto::ed25519::{sign_digest, sign_message, verify_digest, verify_message};
use crate::hashing::{HashError, HashScheme};
use crate::types::{Proposal, SignedMsgType, Vote};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("invalid vote signature")]
    InvalidVoteSignature,
    #[error("invalid vote extension signature")]
    InvalidExtensionSignature,
    #[error("invalid proposal signature")]
    InvalidProposalSignature,
}

/// Fills `vote.signature`, and `vote.extension_signature` for precommits.
pub fn sign_vote<D: BlockDigest>(
    scheme: &HashScheme<D>,
    chain_id: &str,
    sk: &SigningKey,
    vote: &mut Vote,
) -> Result<(), SignerError> {
    let payload = scheme.vote_signing_payload(chain_id, vote)?;
    let ext_sig = if vote.vote_type == SignedMsgType::Precommit {
        let ext_digest = scheme.vote_extension_digest(chain_id, vote)?;
        sign_digest(sk, &ext_digest).to_vec()
    } else {
        Vec::new()
    };
    vote.signature = sign_message(sk, &payload).to_vec();
    vote.extension_signature = ext_sig;
    Ok(())
}

pub fn verify_vote<D: BlockDigest>(
    scheme: &HashScheme<D>,
    chain_id: &str,
    vk: &VerifyingKey,
    vote: &Vote,
) -> Result<(), SignerError> {
    let payload = scheme.vote_signing_payload(chain_id, vote)?;
    if !verify_message(vk, &payload, &vote.signature) {
        warn!(height = vote.height, round = vote.round, "vote signature mismatch");
        return Err(SignerError::InvalidVoteSignature);
    }
    if vote.vote_type == SignedMsgType::Precommit {
        let ext_digest = scheme.vote_extension_digest(chain_id, vote)?;
        if !verify_digest(vk, &ext_digest, &vote.extension_signature) {
            warn!(
                height = vote.height,
                round = vote.round,
                "vote extension signature mismatch"
            );
            return Err(SignerError::InvalidExtensionSignature);
        }
    }
    Ok(())
}

pub fn sign_proposal<D: BlockDigest>(
    scheme: &HashScheme<D>,
    chain_id: &str,
    sk: &SigningKey,
    proposal: &mut Proposal,
) -> Result<(), SignerError> {
    let payload = scheme.proposal_signing_payload(chain_id, proposal)?;
    proposal.signature = sign_message(sk, &payload).to_vec();
    Ok(())
}

pub fn verify_proposal<D: BlockDigest>(
    scheme: &HashScheme<D>,
    chain_id: &str,
    vk: &VerifyingKey,
    proposal: &Proposal,
) -> Result<(), SignerError> {
    let payload = scheme.proposal_signing_payload(chain_id, proposal)?;
    if !verify_message(vk, &payload, &proposal.signature) {
        warn!(height = proposal.height, round = proposal.round, "proposal signature mismatch");
        return Err(SignerError::InvalidProposalSignature);
    }
    Ok(())
}
