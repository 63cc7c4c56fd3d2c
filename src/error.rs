//! Error types for the stealth-payment core.

use thiserror::Error;

/// Result type for stealth core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced by the stealth core.
///
/// Every kind is surfaced to the caller except `CryptoDecryptFailed` inside
/// scanning (treated as "not mine") and errors raised from a subscription
/// callback (logged, never propagated).
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed meta-address, out-of-range counts, bad announcement length.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Recipient is not a stealth meta-address in a path that requires one.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Source account lacks funds plus buffered fee.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Scalar reduced to zero, or key-build failure. Implies a protocol-level
    /// anomaly, not a user error.
    #[error("derivation failed: {0}")]
    DerivationFailed(String),

    /// Tag mismatch on an authenticated decryption. SCAN treats this as
    /// "not mine" and never surfaces it; other callers surface it.
    #[error("decryption failed")]
    CryptoDecryptFailed,

    /// `AnnouncementSource` failure. Surfaced from a one-shot scan; logged
    /// and absorbed between polls inside a subscription.
    #[error("scan failed: {0}")]
    ScanFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Ledger-layer transfer failure, after retries are exhausted.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Ledger confirmation failure.
    #[error("confirmation failed: {0}")]
    ConfirmationFailed(String),

    /// A claim failure, with a reason drawn from a closed set: "already
    /// claimed", "derived key mismatch", "no balance", "below rent
    /// exemption", "submission failed".
    #[error("claim failed: {0}")]
    ClaimFailed(&'static str),

    /// An external call exceeded its configured timeout.
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Invalid hex/base58 string format.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Invalid public key bytes.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key / scalar bytes.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Value outside an accepted range (e.g. a batch size).
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// A lower-level cryptographic operation failed (point decompression,
    /// scalar parsing, AEAD setup).
    #[error("crypto error: {0}")]
    CryptoError(String),

    /// Ownership / signature verification failed in a context that treats it
    /// as an error rather than a boolean.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

impl Error {
    pub(crate) fn scan_failed<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::ScanFailed(Box::new(cause))
    }
}
