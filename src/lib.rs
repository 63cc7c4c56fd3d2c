//! # Stealth Payment Cryptographic Core
//!
//! Unlinkable one-time addresses, O(1) view-tag scanning, and privacy-tier
//! transfer composition, built on Ed25519 (spending keys) and X25519
//! (viewing keys).
//!
//! ## Quick start
//!
//! ```rust
//! use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
//! use curve25519_dalek::scalar::Scalar;
//! use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};
//!
//! use sip_stealth::{generate, meta_address, stealth, types::StealthMetaAddress};
//!
//! // Recipient's long-lived identity: a spending seed and a viewing secret.
//! let k_seed = [7u8; 32];
//! let k_pub = (Scalar::from_bytes_mod_order(k_seed) * ED25519_BASEPOINT_POINT)
//!     .compress()
//!     .to_bytes();
//! let v_secret = X25519StaticSecret::from([9u8; 32]);
//! let v_pub = *X25519PublicKey::from(&v_secret).as_bytes();
//!
//! let meta = StealthMetaAddress::new(k_pub, v_pub);
//! let encoded = meta_address::encode(&meta);
//!
//! // Sender derives a fresh one-time address for this payment.
//! let (stealth_address, _r) = generate::generate_stealth_address(&meta).unwrap();
//!
//! // Recipient re-derives the same address and can prove ownership.
//! let recovered = meta_address::decode(&encoded).unwrap();
//! let owned = stealth::verify_ownership(
//!     &stealth_address.address,
//!     &stealth_address.ephemeral_pub_key,
//!     &v_secret,
//!     &recovered.spending_pub_key,
//!     Some(stealth_address.view_tag),
//! )
//! .unwrap();
//! assert!(owned);
//! ```

pub mod announcement;
pub mod claim;
pub mod crypto;
pub mod error;
pub mod generate;
pub mod keypair;
pub mod ledger;
pub mod meta_address;
pub mod policy;
pub mod relayer;
pub mod scan;
pub mod stealth;
pub mod types;

pub use claim::{claim as claim_payment, estimate_claim_fee, ClaimResult};
pub use error::{Error, Result};
pub use generate::{
    generate_multiple_stealth_addresses, generate_stealth_address, generate_transfer_data,
};
pub use keypair::StealthSigningKey;
pub use ledger::{AnnouncementSource, LedgerReader, LedgerWriter, RelayerClient, TransferSpec};
pub use policy::{
    estimate_transfer_fee, send_private, split_amount, PolicyOptions, SenderCredential,
    TransferResult,
};
pub use relayer::{HealthSnapshot, RelayRequest, RelayerCriteria, RelayerSelector};
pub use scan::{ScanOptions, Scanner, Unsubscribe};
pub use stealth::{derive_stealth_private, derive_stealth_public, verify_ownership};
pub use types::{
    AccountInfo, EphemeralKeyPair, HealthSample, PrivacyTier, RelayerHealth, RelayerInfo,
    StealthAddress, StealthMetaAddress, StealthPayment, TierDefaults,
};

/// Crate version, exposed for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
