//! Manual EdDSA signing over a raw, unclamped scalar.
//!
//! `ed25519_dalek::SigningKey::from_bytes` treats its input as an RFC 8032
//! seed: it re-hashes it with SHA-512 and clamps the low/high bits before
//! using it as a scalar. That is fine for an ordinary keypair, but a
//! stealth-derived private key `p = k_seed + H(shared_secret) mod ℓ` is
//! already a reduced scalar — clamping it would produce a different scalar
//! than the one the recipient's public point `P = K + H(shared_secret)·G`
//! was built from, silently breaking the derivation. `StealthSigningKey`
//! signs directly over the scalar instead.
//!
//! The nonce derivation below is a deliberate departure from RFC 8032's
//! "hash the seed to get a nonce prefix" step, since there is no seed here,
//! only a scalar: the nonce is `H(scalar_bytes || message)`, which is still
//! deterministic and keeps signatures non-malleable under key reuse.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

use crate::error::{Error, Result};

/// A keypair derived additively from a stealth shared secret, able to sign
/// and verify without ever passing through `ed25519-dalek`'s clamping path.
#[derive(Clone)]
pub struct StealthSigningKey {
    scalar: Scalar,
    public_point: CompressedEdwardsY,
}

impl StealthSigningKey {
    /// Builds a signing key from a derived private scalar
    /// (`crypto::derive_stealth_private_scalar`'s output).
    pub fn from_scalar(scalar_bytes: [u8; 32]) -> Result<Self> {
        let scalar = Scalar::from_bytes_mod_order(scalar_bytes);
        if scalar == Scalar::ZERO {
            return Err(Error::InvalidPrivateKey("stealth scalar is zero".into()));
        }
        let public_point = (scalar * ED25519_BASEPOINT_POINT).compress();
        Ok(Self {
            scalar,
            public_point,
        })
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public_point.to_bytes()
    }

    /// Signs `message`, returning a standard 64-byte `R || S` signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let r = nonce_scalar(&self.scalar, message);
        let r_point = (r * ED25519_BASEPOINT_POINT).compress();
        let k = challenge_scalar(&r_point, &self.public_point, message);
        let s = r + k * self.scalar;

        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(r_point.as_bytes());
        sig[32..].copy_from_slice(s.as_bytes());
        sig
    }

    /// Verifies a signature produced by `sign` (or any conforming signer)
    /// against a stealth-derived public key. Never panics on malformed
    /// input; returns `false` instead.
    pub fn verify(message: &[u8], signature: &[u8; 64], public_key: &[u8; 32]) -> bool {
        let mut r_bytes = [0u8; 32];
        r_bytes.copy_from_slice(&signature[..32]);
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&signature[32..]);

        let s = match Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) {
            Some(s) => s,
            None => return false,
        };
        let r_point = match CompressedEdwardsY(r_bytes).decompress() {
            Some(p) => p,
            None => return false,
        };
        let a_point = match CompressedEdwardsY(*public_key).decompress() {
            Some(p) => p,
            None => return false,
        };

        let r_compressed = CompressedEdwardsY(r_bytes);
        let a_compressed = CompressedEdwardsY(*public_key);
        let k = challenge_scalar(&r_compressed, &a_compressed, message);

        let lhs = s * ED25519_BASEPOINT_POINT;
        let rhs = r_point + k * a_point;
        lhs.compress() == rhs.compress()
    }
}

fn nonce_scalar(scalar: &Scalar, message: &[u8]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(scalar.to_bytes());
    hasher.update(message);
    let digest: [u8; 64] = hasher.finalize().into();
    Scalar::from_bytes_mod_order_wide(&digest)
}

fn challenge_scalar(
    r_point: &CompressedEdwardsY,
    public_point: &CompressedEdwardsY,
    message: &[u8],
) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(r_point.as_bytes());
    hasher.update(public_point.as_bytes());
    hasher.update(message);
    let digest: [u8; 64] = hasher.finalize().into();
    Scalar::from_bytes_mod_order_wide(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify_succeeds() {
        let key = StealthSigningKey::from_scalar([5u8; 32]).unwrap();
        let sig = key.sign(b"payment memo");
        assert!(StealthSigningKey::verify(
            b"payment memo",
            &sig,
            &key.public_key_bytes()
        ));
    }

    #[test]
    fn test_verify_rejects_tampered_message() {
        let key = StealthSigningKey::from_scalar([5u8; 32]).unwrap();
        let sig = key.sign(b"payment memo");
        assert!(!StealthSigningKey::verify(
            b"different memo",
            &sig,
            &key.public_key_bytes()
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let key_a = StealthSigningKey::from_scalar([5u8; 32]).unwrap();
        let key_b = StealthSigningKey::from_scalar([6u8; 32]).unwrap();
        let sig = key_a.sign(b"payment memo");
        assert!(!StealthSigningKey::verify(
            b"payment memo",
            &sig,
            &key_b.public_key_bytes()
        ));
    }

    #[test]
    fn test_zero_scalar_is_rejected() {
        assert!(StealthSigningKey::from_scalar([0u8; 32]).is_err());
    }
}
