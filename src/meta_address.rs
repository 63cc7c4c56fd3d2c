//! META-ADDR codec: lossless textual interchange of `(K, V)`.
//!
//! Wire format: ASCII `"st"` followed by base58 of `version(1) ‖ K(32) ‖ V(32)`
//! — a 65-byte decoded payload, version fixed at 1.

use crate::error::{Error, Result};
use crate::types::StealthMetaAddress;

const PREFIX: &str = "st";
const VERSION: u8 = 1;
const PAYLOAD_LEN: usize = 65;

/// Encodes `(K, V)` as `"st" + base58(version ‖ K ‖ V)`.
pub fn encode(meta: &StealthMetaAddress) -> String {
    let mut payload = Vec::with_capacity(PAYLOAD_LEN);
    payload.push(VERSION);
    payload.extend_from_slice(&meta.spending_pub_key);
    payload.extend_from_slice(&meta.viewing_pub_key);

    let mut out = String::with_capacity(PREFIX.len() + 90);
    out.push_str(PREFIX);
    out.push_str(&bs58::encode(payload).into_string());
    out
}

/// Decodes a meta-address string produced by [`encode`].
pub fn decode(s: &str) -> Result<StealthMetaAddress> {
    let body = s
        .strip_prefix(PREFIX)
        .ok_or_else(|| Error::InvalidInput(format!("meta-address missing '{PREFIX}' prefix")))?;

    let payload = bs58::decode(body)
        .into_vec()
        .map_err(|e| Error::InvalidInput(format!("meta-address is not valid base58: {e}")))?;

    if payload.len() != PAYLOAD_LEN {
        return Err(Error::InvalidInput(format!(
            "meta-address payload must be {PAYLOAD_LEN} bytes, got {}",
            payload.len()
        )));
    }
    if payload[0] != VERSION {
        return Err(Error::InvalidInput(format!(
            "unsupported meta-address version {}",
            payload[0]
        )));
    }

    let mut spending_pub_key = [0u8; 32];
    spending_pub_key.copy_from_slice(&payload[1..33]);
    let mut viewing_pub_key = [0u8; 32];
    viewing_pub_key.copy_from_slice(&payload[33..65]);

    Ok(StealthMetaAddress::new(spending_pub_key, viewing_pub_key))
}

/// Returns `false` rather than raising on any malformed input.
pub fn is_valid(s: &str) -> bool {
    decode(s).is_ok()
}

impl std::fmt::Display for StealthMetaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode(self))
    }
}

impl std::str::FromStr for StealthMetaAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips() {
        let meta = StealthMetaAddress::new([1u8; 32], [2u8; 32]);
        let encoded = encode(&meta);
        assert!(encoded.starts_with(PREFIX));
        assert_eq!(decode(&encoded).unwrap(), meta);
    }

    #[test]
    fn test_rejects_missing_prefix() {
        assert!(decode("xyz123").is_err());
        assert!(!is_valid("xyz123"));
    }

    #[test]
    fn test_rejects_bad_base58() {
        assert!(decode("st0OIl").is_err());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let short = format!("{PREFIX}{}", bs58::encode([VERSION, 1, 2, 3]).into_string());
        assert!(decode(&short).is_err());
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut payload = vec![9u8];
        payload.extend_from_slice(&[1u8; 64]);
        let s = format!("{PREFIX}{}", bs58::encode(payload).into_string());
        assert!(decode(&s).is_err());
    }

    #[test]
    fn test_display_and_from_str_agree_with_codec() {
        use std::str::FromStr;
        let meta = StealthMetaAddress::new([7u8; 32], [8u8; 32]);
        let s = meta.to_string();
        assert_eq!(StealthMetaAddress::from_str(&s).unwrap(), meta);
    }
}
