//! ANNOUNCE: the fixed 65-byte on-ledger record
//! `[view_tag(1) ‖ ephemeral_pub_key(32) ‖ stealth_address(32)]`.
//!
//! No variable-length or optional fields; a future wire version is a new
//! record kind outside this layout, never a change to it.

use crate::error::{Error, Result};
use crate::types::ANNOUNCEMENT_LEN;

/// Encodes an announcement record.
pub fn encode(stealth_address: &[u8; 32], ephemeral_pub_key: &[u8; 32], view_tag: u8) -> [u8; 65] {
    let mut out = [0u8; ANNOUNCEMENT_LEN];
    out[0] = view_tag;
    out[1..33].copy_from_slice(ephemeral_pub_key);
    out[33..65].copy_from_slice(stealth_address);
    out
}

/// Decodes an announcement record, returning `(view_tag, ephemeral_pub_key,
/// stealth_address)`. Any length other than 65 is a decode error.
pub fn decode(bytes: &[u8]) -> Result<(u8, [u8; 32], [u8; 32])> {
    if bytes.len() != ANNOUNCEMENT_LEN {
        return Err(Error::InvalidInput(format!(
            "announcement must be {ANNOUNCEMENT_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    let view_tag = bytes[0];
    let mut ephemeral_pub_key = [0u8; 32];
    ephemeral_pub_key.copy_from_slice(&bytes[1..33]);
    let mut stealth_address = [0u8; 32];
    stealth_address.copy_from_slice(&bytes[33..65]);

    Ok((view_tag, ephemeral_pub_key, stealth_address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips() {
        let stealth_address = [1u8; 32];
        let ephemeral_pub_key = [2u8; 32];
        let view_tag = 0x7f;

        let encoded = encode(&stealth_address, &ephemeral_pub_key, view_tag);
        assert_eq!(encoded.len(), ANNOUNCEMENT_LEN);

        let (tag, r, p) = decode(&encoded).unwrap();
        assert_eq!(tag, view_tag);
        assert_eq!(r, ephemeral_pub_key);
        assert_eq!(p, stealth_address);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(decode(&[0u8; 64]).is_err());
        assert!(decode(&[0u8; 66]).is_err());
        assert!(decode(&[]).is_err());
    }
}
