//! Data model for the stealth-payment core.
//!
//! Meta-addresses, ephemeral keys, one-time stealth addresses, detected
//! payments, and the relayer / privacy-tier configuration consumed by
//! POLICY.

use std::time::{SystemTime, UNIX_EPOCH};

use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};

/// A recipient's long-lived public identity: a spending (Ed25519) key and a
/// viewing (X25519) key, plus the textual encoding used to exchange them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthMetaAddress {
    /// Recipient's Ed25519 spending public key (K).
    pub spending_pub_key: [u8; 32],
    /// Recipient's X25519 viewing public key (V).
    pub viewing_pub_key: [u8; 32],
}

impl StealthMetaAddress {
    pub fn new(spending_pub_key: [u8; 32], viewing_pub_key: [u8; 32]) -> Self {
        Self {
            spending_pub_key,
            viewing_pub_key,
        }
    }
}

/// A freshly generated ephemeral X25519 keypair `(r, R)`. Never reused
/// across payments; `r` is wiped once the stealth address has been derived.
pub struct EphemeralKeyPair {
    pub secret: X25519StaticSecret,
    pub public: X25519PublicKey,
}

impl EphemeralKeyPair {
    pub fn generate() -> Self {
        let secret = X25519StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }
}

/// A one-time receiving address derived by a sender for a single payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthAddress {
    /// P = K + H(s)·G, a 32-byte Ed25519 public key.
    pub address: [u8; 32],
    /// R, the sender's ephemeral X25519 public key.
    pub ephemeral_pub_key: [u8; 32],
    /// First byte of H(s), for O(1) scanning rejection.
    pub view_tag: u8,
    /// Wall-clock creation time (informational only).
    pub created_at: u64,
}

impl StealthAddress {
    pub(crate) fn new(address: [u8; 32], ephemeral_pub_key: [u8; 32], view_tag: u8) -> Self {
        Self {
            address,
            ephemeral_pub_key,
            view_tag,
            created_at: now_secs(),
        }
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A detected incoming payment, as surfaced by the SCAN engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthPayment {
    pub stealth_address: [u8; 32],
    pub ephemeral_pub_key: [u8; 32],
    pub view_tag: u8,
    /// Amount in unsigned minor units.
    pub amount: u64,
    /// `None` means the native coin.
    pub token_mint: Option<[u8; 32]>,
    /// Ledger-assigned opaque transaction identifier.
    pub signature: String,
    /// Ledger block time, in seconds since the epoch.
    pub block_time: u64,
    /// Whether the balance probe found this payment already spent down to
    /// the rent floor.
    pub claimed: bool,
}

/// The fixed 65-byte announcement record: `[view_tag, ephemeral_pub_key(32),
/// stealth_address(32)]`. See the `announcement` module for the codec.
pub const ANNOUNCEMENT_LEN: usize = 65;

/// Enumerated privacy-tier presets consumed by POLICY. Per-field overrides
/// are applied on top of whichever tier is selected (see
/// `policy::PolicyOptions`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyTier {
    Standard,
    Enhanced,
    Maximum,
}

impl PrivacyTier {
    /// Tier defaults table.
    pub fn defaults(self) -> TierDefaults {
        match self {
            PrivacyTier::Standard => TierDefaults {
                split_count: 1,
                delay_ms: 0,
                use_relayer: false,
                multi_hop: false,
            },
            PrivacyTier::Enhanced => TierDefaults {
                split_count: 3,
                delay_ms: 10_000,
                use_relayer: false,
                multi_hop: false,
            },
            PrivacyTier::Maximum => TierDefaults {
                split_count: 5,
                delay_ms: 30_000,
                use_relayer: true,
                multi_hop: true,
            },
        }
    }
}

/// The resolved configuration for a single tier, before per-field overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDefaults {
    pub split_count: u8,
    pub delay_ms: u32,
    pub use_relayer: bool,
    pub multi_hop: bool,
}

/// A third-party relayer's identity, endpoint, and rolling health.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayerInfo {
    pub id: String,
    pub endpoint: String,
    pub region: String,
    pub fee_bps: u32,
    pub supported_tokens: Vec<[u8; 32]>,
    pub health: RelayerHealth,
}

/// Rolling health statistics for a relayer, monotonically updated by the
/// selector via an exponential moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayerHealth {
    /// Average latency in milliseconds.
    pub latency_ms: f64,
    /// Success rate in the range `[0.0, 100.0]`.
    pub success_rate: f64,
    pub online: bool,
    pub last_seen: u64,
}

impl Default for RelayerHealth {
    fn default() -> Self {
        Self {
            latency_ms: 0.0,
            success_rate: 100.0,
            online: true,
            last_seen: now_secs(),
        }
    }
}

/// A fresh health observation fed into `RelayerSelector::update_health`.
#[derive(Debug, Clone, Copy)]
pub struct HealthSample {
    pub latency_ms: f64,
    pub success: bool,
}

/// Minimal account-existence probe result from the ledger, used by CLAIM to
/// decide whether an associated token account needs creating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub exists: bool,
    pub owner: Option<[u8; 32]>,
}
