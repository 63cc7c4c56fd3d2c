//! DERIVE: sender-side and recipient-side stealth key derivation, and
//! ownership verification.

use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};
use zeroize::Zeroize;

use crate::crypto;
use crate::error::Result;
use crate::keypair::StealthSigningKey;
use crate::types::StealthMetaAddress;

/// Sender path: derive the one-time public key, ephemeral public key, and
/// view tag for a payment to `meta`, using freshly generated ephemeral
/// scalar `r`.
pub fn derive_stealth_public(
    meta: &StealthMetaAddress,
    r: &X25519StaticSecret,
) -> Result<([u8; 32], [u8; 32], u8)> {
    let ephemeral_pub = X25519PublicKey::from(r);

    let mut shared_secret = crypto::derive_shared_secret(&r.to_bytes(), &meta.viewing_pub_key)?;
    let view_tag = crypto::compute_view_tag(&shared_secret);

    let hash_scalar = sha256_scalar(&shared_secret);
    let p = crypto::derive_stealth_public_point(&meta.spending_pub_key, &hash_scalar)?;

    shared_secret.zeroize();
    Ok((p, *ephemeral_pub.as_bytes(), view_tag))
}

/// Recipient path: derive the stealth signing keypair for an announcement
/// carrying ephemeral public key `ephemeral_pub`, using the recipient's
/// spending seed and viewing secret. The caller must securely wipe
/// `k_seed`/`v_secret` once the surrounding claim scope ends.
pub fn derive_stealth_private(
    k_seed: &[u8; 32],
    v_secret: &X25519StaticSecret,
    ephemeral_pub: &[u8; 32],
) -> Result<StealthSigningKey> {
    let mut shared_secret = crypto::derive_shared_secret(&v_secret.to_bytes(), ephemeral_pub)?;
    let mut p_seed = crypto::derive_stealth_private_scalar(k_seed, &shared_secret)?;

    let key = StealthSigningKey::from_scalar(p_seed);

    shared_secret.zeroize();
    p_seed.zeroize();
    key
}

/// Verifies that a stealth address `p` with ephemeral public key
/// `ephemeral_pub` was in fact addressed to `(k_spending_pub, v_secret)`.
///
/// If `view_tag` is supplied, a mismatch is a fast-reject `false` that never
/// reaches the point-addition step.
pub fn verify_ownership(
    p: &[u8; 32],
    ephemeral_pub: &[u8; 32],
    v_secret: &X25519StaticSecret,
    k_spending_pub: &[u8; 32],
    view_tag: Option<u8>,
) -> Result<bool> {
    let mut shared_secret = crypto::derive_shared_secret(&v_secret.to_bytes(), ephemeral_pub)?;

    if let Some(expected_tag) = view_tag {
        if crypto::compute_view_tag(&shared_secret) != expected_tag {
            shared_secret.zeroize();
            return Ok(false);
        }
    }

    let hash_scalar = sha256_scalar(&shared_secret);
    let p_prime = crypto::derive_stealth_public_point(k_spending_pub, &hash_scalar)?;
    shared_secret.zeroize();

    Ok(crypto::constant_time_equal(p, &p_prime))
}

fn sha256_scalar(shared_secret: &[u8; 32]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    Sha256::digest(shared_secret).into()
}
