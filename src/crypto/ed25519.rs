use ed25519_dalek::Signer;
use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;

use crate::crypto::digest::FeltDigest;

pub const SIGNATURE_LEN: usize = 64;

pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let sk = SigningKey::generate(&mut OsRng);
    let vk = sk.verifying_key();
    (sk, vk)
}

/// Signs the 32-byte digest itself; the signer never sees canonical fields.
pub fn sign_digest(sk: &SigningKey, digest: &FeltDigest) -> [u8; SIGNATURE_LEN] {
    sign_message(sk, digest.as_bytes())
}

pub fn verify_digest(vk: &VerifyingKey, digest: &FeltDigest, sig_bytes: &[u8]) -> bool {
    verify_message(vk, digest.as_bytes(), sig_bytes)
}

pub fn sign_message(sk: &SigningKey, msg: &[u8]) -> [u8; SIGNATURE_LEN] {
    let sig: Signature = sk.sign(msg);
    sig.to_bytes()
}

pub fn verify_message(vk: &VerifyingKey, msg: &[u8], sig_bytes: &[u8]) -> bool {
    let Ok(arr) = <[u8; SIGNATURE_LEN]>::try_from(sig_bytes) else {
        return false;
    };
    let sig = Signature::from_bytes(&arr);
    vk.verify_strict(msg, &sig).is_ok()
}
