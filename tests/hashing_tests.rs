//! Digest properties of the hash-tree builder.

use canonbft::config::TimestampCommitment;
use canonbft::crypto::{BlockDigest, DigestError, FeltDigest, Sha256Truncated, WideDigest};
use canonbft::hashing::{HashError, Signable, SignableKind};
use canonbft::types::*;
use canonbft::{HashScheme, HashingSection};
use chrono::{DateTime, FixedOffset};

const CHAIN: &str = "test-chain-1";

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn scheme(mode: TimestampCommitment) -> HashScheme {
    HashScheme::from_config(&HashingSection::new(mode))
}

fn make_vote(vt: SignedMsgType, h: i64, r: i32, bid: BlockId) -> Vote {
    Vote::new(vt, h, r, bid, ts("2023-01-01T00:00:00.123456789Z"))
}

fn some_block() -> BlockId {
    BlockId::new([7u8; 32], 4, [9u8; 32])
}

#[test]
fn test_digest_deterministic() {
    for mode in [TimestampCommitment::Excluded, TimestampCommitment::CanonicalString] {
        let s = scheme(mode);
        let v = make_vote(SignedMsgType::Precommit, 10, 1, some_block());
        assert_eq!(s.vote_digest(CHAIN, &v).unwrap(), s.vote_digest(CHAIN, &v.clone()).unwrap());
    }
}

#[test]
fn test_round_changes_digest() {
    let s = scheme(TimestampCommitment::Excluded);
    let a = make_vote(SignedMsgType::Prevote, 10, 1, some_block());
    let b = make_vote(SignedMsgType::Prevote, 10, 2, some_block());
    assert_ne!(s.vote_digest(CHAIN, &a).unwrap(), s.vote_digest(CHAIN, &b).unwrap());
}

#[test]
fn test_height_and_round_not_interchangeable() {
    let s = scheme(TimestampCommitment::Excluded);
    let a = make_vote(SignedMsgType::Prevote, 1, 2, BlockId::nil());
    let b = make_vote(SignedMsgType::Prevote, 2, 1, BlockId::nil());
    assert_ne!(s.vote_digest(CHAIN, &a).unwrap(), s.vote_digest(CHAIN, &b).unwrap());
}

#[test]
fn test_chain_id_changes_digest() {
    let s = scheme(TimestampCommitment::Excluded);
    let v = make_vote(SignedMsgType::Prevote, 10, 0, BlockId::nil());
    assert_ne!(s.vote_digest("chain-a", &v).unwrap(), s.vote_digest("chain-b", &v).unwrap());
}

#[test]
fn test_validator_metadata_ignored() {
    let s = scheme(TimestampCommitment::CanonicalString);
    let mut a = make_vote(SignedMsgType::Prevote, 10, 0, some_block());
    let mut b = a.clone();
    a.validator_address = Address([1u8; 20]);
    a.validator_index = 0;
    b.validator_address = Address([2u8; 20]);
    b.validator_index = 3;
    b.signature = vec![0xaa; 64];

    assert_eq!(canonicalize_vote(CHAIN, &a).unwrap(), canonicalize_vote(CHAIN, &b).unwrap());
    assert_eq!(s.vote_digest(CHAIN, &a).unwrap(), s.vote_digest(CHAIN, &b).unwrap());
}

#[test]
fn test_absent_block_id_differs_from_zero_hash() {
    let s = scheme(TimestampCommitment::Excluded);
    let absent = make_vote(SignedMsgType::Prevote, 10, 0, BlockId::nil());
    let zero = make_vote(
        SignedMsgType::Prevote,
        10,
        0,
        BlockId { hash: vec![0u8; 32], part_set_header: PartSetHeader::default() },
    );
    assert_ne!(s.vote_digest(CHAIN, &absent).unwrap(), s.vote_digest(CHAIN, &zero).unwrap());
}

#[test]
fn test_timestamp_zones_digest_identically() {
    let s = scheme(TimestampCommitment::CanonicalString);
    let mut utc = make_vote(SignedMsgType::Prevote, 10, 0, BlockId::nil());
    let mut shifted = utc.clone();
    utc.timestamp = ts("2024-03-10T08:00:00.000000001Z");
    shifted.timestamp = ts("2024-03-10T03:00:00.000000001-05:00");

    assert_eq!(canonical_time(&utc.timestamp), canonical_time(&shifted.timestamp));
    assert_eq!(s.vote_digest(CHAIN, &utc).unwrap(), s.vote_digest(CHAIN, &shifted).unwrap());
}

#[test]
fn test_timestamp_commitment_modes() {
    let excluded = scheme(TimestampCommitment::Excluded);
    let included = scheme(TimestampCommitment::CanonicalString);
    let a = make_vote(SignedMsgType::Prevote, 10, 0, BlockId::nil());
    let mut b = a.clone();
    b.timestamp = ts("2030-01-01T00:00:00Z");

    // excluded: only the sign bytes see the timestamp
    assert_eq!(excluded.vote_digest(CHAIN, &a).unwrap(), excluded.vote_digest(CHAIN, &b).unwrap());
    let sa = Signable::Vote(canonicalize_vote(CHAIN, &a).unwrap()).sign_bytes().unwrap();
    let sb = Signable::Vote(canonicalize_vote(CHAIN, &b).unwrap()).sign_bytes().unwrap();
    assert_ne!(sa, sb);

    assert_ne!(included.vote_digest(CHAIN, &a).unwrap(), included.vote_digest(CHAIN, &b).unwrap());
    assert_ne!(excluded.vote_digest(CHAIN, &a).unwrap(), included.vote_digest(CHAIN, &a).unwrap());
}

#[test]
fn test_signing_payload_binds_timestamp() {
    let excluded = scheme(TimestampCommitment::Excluded);
    let included = scheme(TimestampCommitment::CanonicalString);
    let a = make_vote(SignedMsgType::Prevote, 10, 0, BlockId::nil());
    let mut b = a.clone();
    b.timestamp = ts("2099-12-31T00:00:00Z");

    let pa = excluded.vote_signing_payload(CHAIN, &a).unwrap();
    let digest = excluded.vote_digest(CHAIN, &a).unwrap();
    let sign_bytes = Signable::Vote(canonicalize_vote(CHAIN, &a).unwrap()).sign_bytes().unwrap();
    assert_eq!(&pa[..32], digest.as_bytes());
    assert_eq!(&pa[32..], &sign_bytes[..]);
    assert_ne!(pa, excluded.vote_signing_payload(CHAIN, &b).unwrap());

    let ia = included.vote_signing_payload(CHAIN, &a).unwrap();
    assert_eq!(ia, included.vote_digest(CHAIN, &a).unwrap().as_bytes().to_vec());

    let p = Proposal::new(10, 1, 0, some_block(), ts("2023-01-01T00:00:00Z"));
    let mut q = p.clone();
    q.timestamp = ts("1999-01-01T00:00:00Z");
    assert_ne!(
        excluded.proposal_signing_payload(CHAIN, &p).unwrap(),
        excluded.proposal_signing_payload(CHAIN, &q).unwrap()
    );
}

#[test]
fn test_extension_payload_is_digest() {
    let s = scheme(TimestampCommitment::Excluded);
    let mut v = make_vote(SignedMsgType::Precommit, 10, 0, some_block());
    v.extension = b"ext".to_vec();
    let x = Signable::VoteExtension(canonicalize_vote_extension(CHAIN, &v).unwrap());
    let payload = s.signing_payload(&x).unwrap();
    assert_eq!(payload, s.digest(&x).unwrap().as_bytes().to_vec());
}

#[test]
fn test_proposal_and_vote_differ_by_type() {
    let s = scheme(TimestampCommitment::Excluded);
    let t = ts("2023-01-01T00:00:00Z");
    let vote = Vote::new(SignedMsgType::Prevote, 5, 0, some_block(), t);
    let proposal = Proposal::new(5, 0, -1, some_block(), t);
    assert_ne!(s.vote_digest(CHAIN, &vote).unwrap(), s.proposal_digest(CHAIN, &proposal).unwrap());

    let prevote = s.vote_digest(CHAIN, &vote).unwrap();
    let precommit = s.vote_digest(CHAIN, &Vote::new(SignedMsgType::Precommit, 5, 0, some_block(), t)).unwrap();
    assert_ne!(prevote, precommit);
}

#[test]
fn test_pol_round_committed() {
    let s = scheme(TimestampCommitment::Excluded);
    let t = ts("2023-01-01T00:00:00Z");
    let none = Proposal::new(5, 3, -1, some_block(), t);
    let some = Proposal::new(5, 3, 1, some_block(), t);
    assert_ne!(s.proposal_digest(CHAIN, &none).unwrap(), s.proposal_digest(CHAIN, &some).unwrap());
}

#[test]
fn test_extension_digest_ignores_block() {
    let s = scheme(TimestampCommitment::Excluded);
    let mut a = make_vote(SignedMsgType::Precommit, 10, 0, some_block());
    a.extension = b"ext".to_vec();
    let mut b = make_vote(SignedMsgType::Precommit, 10, 0, BlockId::nil());
    b.extension = b"ext".to_vec();
    assert_eq!(s.vote_extension_digest(CHAIN, &a).unwrap(), s.vote_extension_digest(CHAIN, &b).unwrap());

    b.extension = b"other".to_vec();
    assert_ne!(s.vote_extension_digest(CHAIN, &a).unwrap(), s.vote_extension_digest(CHAIN, &b).unwrap());
    // the vote digest does not commit to the extension
    assert_eq!(s.vote_digest(CHAIN, &a).unwrap(), s.vote_digest(CHAIN, &{
        let mut c = a.clone();
        c.extension = b"changed".to_vec();
        c
    }).unwrap());
}

#[test]
fn test_negative_height_is_encoding_error() {
    let s = scheme(TimestampCommitment::Excluded);
    let v = make_vote(SignedMsgType::Prevote, -1, 0, BlockId::nil());
    let err = s.vote_digest(CHAIN, &v).unwrap_err();
    assert_eq!(err, HashError::Encoding { field: "height", value: -1 });

    let v = make_vote(SignedMsgType::Prevote, 1, -4, BlockId::nil());
    assert!(matches!(s.vote_digest(CHAIN, &v), Err(HashError::Encoding { field: "round", .. })));
}

#[test]
fn test_malformed_block_id_fails_digest() {
    let s = scheme(TimestampCommitment::Excluded);
    let bad = BlockId { hash: vec![1u8; 32], part_set_header: PartSetHeader { total: 0, hash: vec![2u8; 32] } };
    let v = make_vote(SignedMsgType::Prevote, 1, 0, bad);
    let err = s.vote_digest(CHAIN, &v).unwrap_err();
    assert!(matches!(err, HashError::Malformed(CanonicalError::PartSetInconsistent { .. })));
    assert!(err.to_string().contains("malformed"));
}

#[test]
fn test_signable_dispatch_matches_direct() {
    let s = scheme(TimestampCommitment::CanonicalString);
    let v = make_vote(SignedMsgType::Prevote, 10, 0, some_block());
    let cv = canonicalize_vote(CHAIN, &v).unwrap();
    let signable = Signable::from(cv.clone());
    assert_eq!(signable.kind(), SignableKind::Vote);
    assert_eq!(signable.height(), 10);
    assert_eq!(s.digest(&signable).unwrap(), s.hash_canonical_vote(&cv).unwrap());
}

/// Returns felts with the top bits set, i.e. outside the Stark field.
struct OverflowingDigest;

impl BlockDigest for OverflowingDigest {
    fn block_size(&self) -> usize {
        16
    }
    fn wide(&self, data: &[u8]) -> Result<WideDigest, DigestError> {
        Sha256Truncated.wide(data)
    }
    fn felt(&self, _data: &[u8]) -> Result<FeltDigest, DigestError> {
        Ok(FeltDigest([0xff; 32]))
    }
}

struct FailingDigest;

impl BlockDigest for FailingDigest {
    fn block_size(&self) -> usize {
        16
    }
    fn wide(&self, _data: &[u8]) -> Result<WideDigest, DigestError> {
        Err(DigestError::Backend("device unavailable".into()))
    }
    fn felt(&self, _data: &[u8]) -> Result<FeltDigest, DigestError> {
        Err(DigestError::Backend("device unavailable".into()))
    }
}

#[test]
fn test_non_canonical_felt_rejected() {
    let s = HashScheme::with_primitive(OverflowingDigest, TimestampCommitment::Excluded);
    let v = make_vote(SignedMsgType::Prevote, 1, 0, BlockId::nil());
    let err = s.vote_digest(CHAIN, &v).unwrap_err();
    assert!(matches!(err, HashError::Digest(DigestError::NonCanonicalFelt(_))));
}

#[test]
fn test_primitive_failure_propagates() {
    let s = HashScheme::with_primitive(FailingDigest, TimestampCommitment::Excluded);
    let v = make_vote(SignedMsgType::Prevote, 1, 0, some_block());
    let err = s.vote_digest(CHAIN, &v).unwrap_err();
    assert!(matches!(err, HashError::Digest(DigestError::Backend(_))));
}

#[test]
fn test_concurrent_digests_agree() {
    let s = scheme(TimestampCommitment::CanonicalString);
    let v = make_vote(SignedMsgType::Precommit, 99, 3, some_block());
    let expected = s.vote_digest(CHAIN, &v).unwrap();

    let (s, v) = (&s, &v);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(move || s.vote_digest(CHAIN, v).unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
