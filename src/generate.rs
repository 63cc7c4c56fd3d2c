//! GENERATE: sender-facing façade over DERIVE + ANNOUNCE.

use crate::announcement;
use crate::error::{Error, Result};
use crate::stealth;
use crate::types::{EphemeralKeyPair, StealthAddress, StealthMetaAddress};

/// Allocates a fresh ephemeral keypair, derives a one-time stealth address
/// for `meta`, and returns it alongside the ephemeral keypair (so a caller
/// driving a relayer flow can prove sender-side linkage).
pub fn generate_stealth_address(
    meta: &StealthMetaAddress,
) -> Result<(StealthAddress, EphemeralKeyPair)> {
    let r = EphemeralKeyPair::generate();
    let (p, ephemeral_pub, view_tag) = stealth::derive_stealth_public(meta, &r.secret)?;
    Ok((StealthAddress::new(p, ephemeral_pub, view_tag), r))
}

/// Generates `n` pairwise-distinct stealth addresses for `meta`.
/// `1 ≤ n ≤ 100`; anything else fails `OutOfRange`.
pub fn generate_multiple_stealth_addresses(
    meta: &StealthMetaAddress,
    n: usize,
) -> Result<Vec<(StealthAddress, EphemeralKeyPair)>> {
    if !(1..=100).contains(&n) {
        return Err(Error::OutOfRange(format!(
            "stealth address batch size must be in 1..=100, got {n}"
        )));
    }
    (0..n).map(|_| generate_stealth_address(meta)).collect()
}

/// Bundles a fresh stealth address with its 65-byte announcement encoding
/// and the transfer amount, for handoff to a ledger writer.
pub fn generate_transfer_data(
    meta: &StealthMetaAddress,
    amount: u64,
) -> Result<([u8; 32], [u8; 32], u8, [u8; 65], u64)> {
    let (stealth_address, _r) = generate_stealth_address(meta)?;
    let encoded = announcement::encode(
        &stealth_address.address,
        &stealth_address.ephemeral_pub_key,
        stealth_address.view_tag,
    );
    Ok((
        stealth_address.address,
        stealth_address.ephemeral_pub_key,
        stealth_address.view_tag,
        encoded,
        amount,
    ))
}
