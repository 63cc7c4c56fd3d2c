//! Low-level cryptographic primitives.
//!
//! Everything above this module treats these functions as oracles: total,
//! and constant-time where the contract calls for it. Higher layers never
//! reach for a curve type directly.
//!
//! The one subtlety worth a comment up top: the stealth derivation's scalar
//! addition (`derive_stealth_private_scalar`) and point addition
//! (`derive_stealth_public_point`) operate on raw `curve25519-dalek` scalars
//! rather than going through `ed25519_dalek::SigningKey::from_bytes`, which
//! re-hashes and clamps its input per RFC 8032. Clamping would break the
//! additive binding between the sender's and recipient's derivations, so the
//! recipient-side keypair is built directly from the scalar (see
//! `crate::keypair::StealthSigningKey`).

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::scalar::Scalar;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Perform an X25519 Diffie-Hellman exchange.
///
/// Fails if either input is not 32 bytes. The output may be the canonical
/// zero point for pathological (e.g. small-order) inputs; callers must not
/// branch on secret-derived zeroness, only on the derived values that follow.
pub fn derive_shared_secret(scalar: &[u8], point: &[u8]) -> Result<[u8; 32]> {
    let scalar: [u8; 32] = scalar
        .try_into()
        .map_err(|_| Error::InvalidPrivateKey("ECDH scalar must be 32 bytes".into()))?;
    let point: [u8; 32] = point
        .try_into()
        .map_err(|_| Error::InvalidPublicKey("ECDH point must be 32 bytes".into()))?;

    let secret = X25519StaticSecret::from(scalar);
    let public = X25519PublicKey::from(point);
    Ok(*secret.diffie_hellman(&public).as_bytes())
}

/// First byte of SHA-256(shared_secret).
pub fn compute_view_tag(shared_secret: &[u8; 32]) -> u8 {
    let digest = Sha256::digest(shared_secret);
    digest[0]
}

/// `k_seed + H(shared_secret) mod ℓ`, where ℓ is the Ed25519 group order.
///
/// `curve25519_dalek::Scalar` arithmetic is always reduced modulo ℓ, so the
/// `+` below is scalar addition in the Ed25519 group — never a naive
/// 256-bit integer addition. Rejects a zero result.
pub fn derive_stealth_private_scalar(k_seed: &[u8; 32], shared_secret: &[u8; 32]) -> Result<[u8; 32]> {
    let hash = Sha256::digest(shared_secret);
    let hash_scalar = Scalar::from_bytes_mod_order(hash.into());
    let k_scalar = Scalar::from_bytes_mod_order(*k_seed);
    let sum = k_scalar + hash_scalar;

    if sum == Scalar::ZERO {
        return Err(Error::DerivationFailed(
            "stealth private scalar reduced to zero".into(),
        ));
    }

    Ok(sum.to_bytes())
}

/// `P = K + H(shared_secret)·G`, using proper Edwards point addition.
///
/// Must agree bit-exact with `(k_seed + H(shared_secret), G) → P` when
/// `K = k_seed·G` — this is the invariant binding sender and recipient
/// derivations.
pub fn derive_stealth_public_point(k: &[u8; 32], scalar: &[u8; 32]) -> Result<[u8; 32]> {
    let k_point = CompressedEdwardsY(*k)
        .decompress()
        .ok_or_else(|| Error::InvalidPublicKey("spending key is not a valid curve point".into()))?;
    let scalar = Scalar::from_bytes_mod_order(*scalar);
    let offset = scalar * ED25519_BASEPOINT_POINT;
    Ok((k_point + offset).compress().to_bytes())
}

/// HKDF-SHA256 with an empty salt.
pub fn hkdf(ikm: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>> {
    let hk = hkdf::Hkdf::<Sha256>::new(None, ikm);
    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm)
        .map_err(|_| Error::CryptoError("HKDF output length too large".into()))?;
    Ok(okm)
}

/// XSalsa20-Poly1305 authenticated encryption.
///
/// Output layout: `nonce(24B) ‖ ciphertext ‖ tag(16B)`.
pub fn encrypt_secretbox(plaintext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>> {
    use xsalsa20poly1305::aead::{Aead, KeyInit};
    use xsalsa20poly1305::{Key, XSalsa20Poly1305, XNonce};

    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    let mut nonce_bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| Error::CryptoError(format!("secretbox encryption failed: {e}")))?;

    let mut out = Vec::with_capacity(24 + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// XSalsa20-Poly1305 authenticated decryption. Returns `None` on any
/// failure (bad length, tampered ciphertext, wrong key) — never raises.
pub fn decrypt_secretbox(ciphertext: &[u8], key: &[u8; 32]) -> Option<Vec<u8>> {
    use xsalsa20poly1305::aead::{Aead, KeyInit};
    use xsalsa20poly1305::{Key, XSalsa20Poly1305, XNonce};

    if ciphertext.len() < 24 {
        return None;
    }
    let (nonce_bytes, body) = ciphertext.split_at(24);
    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    cipher.decrypt(XNonce::from_slice(nonce_bytes), body).ok()
}

/// Authenticated X25519 + AEAD "sealed box": ECDH between the sender's
/// secret and the recipient's public key, HKDF-expand the shared secret
/// into a symmetric key, then `encrypt_secretbox` under that key. Output
/// layout matches `encrypt_secretbox`: `nonce(24B) ‖ ciphertext ‖ tag(16B)`.
pub fn box_seal(
    plaintext: &[u8],
    recipient_x_pub: &[u8; 32],
    sender_x_secret: &[u8; 32],
) -> Result<Vec<u8>> {
    let shared = derive_shared_secret(sender_x_secret, recipient_x_pub)?;
    let key_bytes = hkdf(&shared, b"sip-stealth-box-seal", 32)?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&key_bytes);
    encrypt_secretbox(plaintext, &key)
}

/// Opens a `box_seal` payload. Returns `None` on any failure — never raises.
pub fn box_open(
    ciphertext: &[u8],
    sender_x_pub: &[u8; 32],
    recipient_x_secret: &[u8; 32],
) -> Option<Vec<u8>> {
    let shared = derive_shared_secret(recipient_x_secret, sender_x_pub).ok()?;
    let key_bytes = hkdf(&shared, b"sip-stealth-box-seal", 32).ok()?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&key_bytes);
    decrypt_secretbox(ciphertext, &key)
}

/// Iterated SHA-256 over `(salt ‖ password)`, at least 10,000 rounds.
/// Used only by external collaborators for at-rest key storage.
pub fn password_derive(password: &[u8], salt: &[u8]) -> [u8; 32] {
    let mut input = Vec::with_capacity(salt.len() + password.len());
    input.extend_from_slice(salt);
    input.extend_from_slice(password);

    let mut state: [u8; 32] = Sha256::digest(&input).into();
    for _ in 1..10_000 {
        state = Sha256::digest(state).into();
    }
    input.zeroize();
    state
}

/// Standard Ed25519 signing.
pub fn ed25519_sign(message: &[u8], sk: &ed25519_dalek::SigningKey) -> ed25519_dalek::Signature {
    use ed25519_dalek::Signer;
    sk.sign(message)
}

/// Standard Ed25519 verification.
pub fn ed25519_verify(
    message: &[u8],
    sig: &ed25519_dalek::Signature,
    pk: &ed25519_dalek::VerifyingKey,
) -> bool {
    use ed25519_dalek::Verifier;
    pk.verify(message, sig).is_ok()
}

/// Cryptographically secure random bytes. Never mocked.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Length-prefixed constant-time equality check. Never short-circuits on a
/// content mismatch.
pub fn constant_time_equal(a: &[u8], b: &[u8]) -> bool {
    let mut buf_a = (a.len() as u64).to_le_bytes().to_vec();
    buf_a.extend_from_slice(a);
    let mut buf_b = (b.len() as u64).to_le_bytes().to_vec();
    buf_b.extend_from_slice(b);

    let max_len = buf_a.len().max(buf_b.len());
    buf_a.resize(max_len, 0);
    buf_b.resize(max_len, 0);

    let equal = buf_a.ct_eq(&buf_b);
    buf_a.zeroize();
    buf_b.zeroize();
    bool::from(equal)
}

/// Volatile zeroization; the compiler must not optimize this away.
pub fn secure_clear(buf: &mut [u8]) {
    buf.zeroize();
}

/// Convert bytes to a `0x`-prefixed hex string, for opaque blobs (signatures,
/// nonces) that aren't meta-addresses or announcements and so don't have
/// their own codec.
pub fn bytes_to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Parse a `0x`-prefixed (or bare) hex string back to bytes.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| Error::InvalidEncoding(e.to_string()))
}

/// Convert bytes to a base58 string, for wire formats that favor base58 over
/// hex (matching META-ADDR's own encoding).
pub fn bytes_to_base58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Parse a base58 string back to bytes.
pub fn base58_to_bytes(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| Error::InvalidEncoding(e.to_string()))
}
