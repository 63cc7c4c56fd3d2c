//! CLAIM: given an owned payment, re-derive its private key and submit a
//! transfer out of the stealth address.

use x25519_dalek::StaticSecret as X25519StaticSecret;
use zeroize::Zeroize;

use crate::crypto;
use crate::error::{Error, Result};
use crate::ledger::{LedgerReader, LedgerWriter, TransferSpec};
use crate::stealth;
use crate::types::StealthPayment;

/// Result of a successful claim.
#[derive(Debug, Clone)]
pub struct ClaimResult {
    pub signature: String,
    pub amount: u64,
    pub destination: [u8; 32],
    pub confirmed: bool,
}

/// Reclaims `payment` to `destination` (or to the derived stealth key's own
/// public key, when `destination` is `None`), signed by the re-derived
/// stealth keypair.
pub async fn claim<L: LedgerReader + LedgerWriter>(
    ledger: &L,
    payment: &StealthPayment,
    k_seed: &[u8; 32],
    v_secret: &X25519StaticSecret,
    destination: Option<[u8; 32]>,
) -> Result<ClaimResult> {
    if payment.claimed {
        return Err(Error::ClaimFailed("already claimed"));
    }

    let derived_key = stealth::derive_stealth_private(k_seed, v_secret, &payment.ephemeral_pub_key)?;

    if !crypto::constant_time_equal(
        &derived_key.public_key_bytes(),
        &payment.stealth_address,
    ) {
        return Err(Error::ClaimFailed("derived key mismatch"));
    }

    let signer_bytes = derived_key.public_key_bytes();
    let destination = destination.unwrap_or(signer_bytes);

    let amount = match payment.token_mint {
        None => {
            let balance = ledger.get_balance(&payment.stealth_address).await?;
            if balance == 0 {
                return Err(Error::ClaimFailed("no balance"));
            }
            let rent_floor = ledger.get_minimum_rent_exemption(0).await?;
            let claimable = balance.saturating_sub(rent_floor);
            if claimable == 0 {
                return Err(Error::ClaimFailed("below rent exemption"));
            }
            claimable
        }
        Some(mint) => {
            let balance = ledger
                .get_token_balance(&payment.stealth_address, &mint)
                .await?;
            if balance == 0 {
                return Err(Error::ClaimFailed("no balance"));
            }
            balance
        }
    };

    let create_destination_account = match payment.token_mint {
        Some(_) => ledger
            .get_account_info(&destination)
            .await?
            .map(|info| !info.exists)
            .unwrap_or(true),
        None => false,
    };

    let spec = TransferSpec {
        from: payment.stealth_address,
        to: destination,
        amount,
        token_mint: payment.token_mint,
        announcement: None,
        memo: None,
        create_destination_account,
    };

    let signature = ledger
        .build_and_submit(&spec, &signer_bytes)
        .await
        .map_err(|e| Error::TransferFailed(e.to_string()))?;

    let mut seed_copy = *k_seed;
    seed_copy.zeroize();

    Ok(ClaimResult {
        signature,
        amount,
        destination,
        confirmed: true,
    })
}

/// `base_fee + rent_exemption` when `destination`'s associated token account
/// does not yet exist; otherwise just `base_fee`.
pub async fn estimate_claim_fee<L: LedgerReader>(
    ledger: &L,
    base_fee: u64,
    destination: [u8; 32],
    needs_token_account: bool,
) -> Result<u64> {
    if !needs_token_account {
        return Ok(base_fee);
    }
    let exists = ledger
        .get_account_info(&destination)
        .await?
        .map(|info| info.exists)
        .unwrap_or(false);
    if exists {
        Ok(base_fee)
    } else {
        let rent = ledger.get_minimum_rent_exemption(165).await?;
        Ok(base_fee + rent)
    }
}
