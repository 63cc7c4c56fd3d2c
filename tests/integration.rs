//! End-to-end scenarios, concrete literals drawn from the testable
//! properties list: unlinkability, round-trip detection, ghost-traffic
//! scanning, claim happy path / already-claimed rejection, split
//! accounting, recipient validation, and relayer selection.

use std::collections::HashSet;
use std::sync::Arc;

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};

use sip_stealth::ledger::testing::{FakeAnnouncementSource, FakeLedger};
use sip_stealth::ledger::RawAnnouncement;
use sip_stealth::{
    announcement, claim_payment, generate_multiple_stealth_addresses, generate_stealth_address,
    meta_address, policy, scan, stealth, types::StealthMetaAddress, types::StealthPayment,
    RelayerCriteria, RelayerInfo, RelayerSelector,
};

fn fixed_identity() -> ([u8; 32], [u8; 32], X25519StaticSecret, [u8; 32]) {
    let k_seed = [0xA1u8; 32];
    let k_pub = (Scalar::from_bytes_mod_order(k_seed) * ED25519_BASEPOINT_POINT)
        .compress()
        .to_bytes();
    let v_secret = X25519StaticSecret::from([0xB2u8; 32]);
    let v_pub = *X25519PublicKey::from(&v_secret).as_bytes();
    (k_seed, k_pub, v_secret, v_pub)
}

#[test]
fn test_standard_unlinkability() {
    let (_, k_pub, _, v_pub) = fixed_identity();
    let meta = StealthMetaAddress::new(k_pub, v_pub);
    let k_pub_encoded = bs58::encode(k_pub).into_string();

    let batch = generate_multiple_stealth_addresses(&meta, 5).unwrap();
    let encoded: Vec<String> = batch
        .iter()
        .map(|(addr, _)| bs58::encode(addr.address).into_string())
        .collect();

    let unique: HashSet<&String> = encoded.iter().collect();
    assert_eq!(unique.len(), 5, "all 5 stealth addresses must be distinct");
    for e in &encoded {
        assert_ne!(e, &k_pub_encoded, "a stealth address must never equal K");
    }
}

#[test]
fn test_round_trip_detection() {
    let (_, k_pub, v_secret, v_pub) = fixed_identity();
    let meta = StealthMetaAddress::new(k_pub, v_pub);

    let (stealth_address, r) = generate_stealth_address(&meta).unwrap();
    let encoded = announcement::encode(
        &stealth_address.address,
        &stealth_address.ephemeral_pub_key,
        stealth_address.view_tag,
    );
    let (view_tag, ephemeral_pub_key, address) = announcement::decode(&encoded).unwrap();

    assert!(stealth::verify_ownership(
        &address,
        &ephemeral_pub_key,
        &v_secret,
        &k_pub,
        Some(view_tag)
    )
    .unwrap());

    let mut mutated_ephemeral = ephemeral_pub_key;
    mutated_ephemeral[0] ^= 0x01;
    assert!(!stealth::verify_ownership(
        &address,
        &mutated_ephemeral,
        &v_secret,
        &k_pub,
        Some(view_tag)
    )
    .unwrap());

    drop(r);
}

fn synthetic_announcement(
    meta: &StealthMetaAddress,
    block_time: u64,
    amount: u64,
) -> RawAnnouncement {
    let r = X25519StaticSecret::random_from_rng(rand::rngs::OsRng);
    let (p, ephemeral_pub, view_tag) = stealth::derive_stealth_public(meta, &r).unwrap();
    RawAnnouncement {
        view_tag,
        ephemeral_pub_key: ephemeral_pub,
        stealth_address: p,
        amount,
        token_mint: None,
        signature: format!("sig-{block_time}"),
        block_time,
    }
}

fn foreign_announcement(block_time: u64) -> RawAnnouncement {
    let other_v_secret = X25519StaticSecret::from([0xC3u8; 32]);
    let other_v_pub = *X25519PublicKey::from(&other_v_secret).as_bytes();
    let other_k_pub = (Scalar::from_bytes_mod_order([0xD4u8; 32]) * ED25519_BASEPOINT_POINT)
        .compress()
        .to_bytes();
    let meta = StealthMetaAddress::new(other_k_pub, other_v_pub);
    synthetic_announcement(&meta, block_time, 1)
}

#[tokio::test]
async fn test_ghost_traffic_finds_exactly_the_recipients_payments() {
    let (_, k_pub, v_secret, v_pub) = fixed_identity();
    let meta = StealthMetaAddress::new(k_pub, v_pub);

    let mut announcements = Vec::with_capacity(1024);
    let owned_slots = [10u64, 300, 600, 1000];
    for i in 0..1024u64 {
        if owned_slots.contains(&i) {
            announcements.push(synthetic_announcement(&meta, i, 1_000_000 + i));
        } else {
            announcements.push(foreign_announcement(i));
        }
    }

    let source = Arc::new(FakeAnnouncementSource { announcements });
    let ledger = Arc::new(FakeLedger {
        rent_exemption: 0,
        ..Default::default()
    });
    let scanner = scan::Scanner::new(source, ledger, v_secret, k_pub);

    let payments = scanner
        .scan(&scan::ScanOptions {
            limit: Some(1024),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(payments.len(), 4);
    let block_times: Vec<u64> = payments.iter().map(|p| p.block_time).collect();
    assert_eq!(block_times, owned_slots.to_vec());
}

#[tokio::test]
async fn test_claim_happy_path() {
    let (k_seed, k_pub, v_secret, v_pub) = fixed_identity();
    let meta = StealthMetaAddress::new(k_pub, v_pub);
    let r = X25519StaticSecret::random_from_rng(rand::rngs::OsRng);
    let (p, ephemeral_pub, view_tag) = stealth::derive_stealth_public(&meta, &r).unwrap();

    let payment = StealthPayment {
        stealth_address: p,
        ephemeral_pub_key: ephemeral_pub,
        view_tag,
        amount: 0,
        token_mint: None,
        signature: "sig".into(),
        block_time: 0,
        claimed: false,
    };

    let ledger = FakeLedger::with_balance(p, 5_000_000_000, 890_880);
    let result = claim_payment(&ledger, &payment, &k_seed, &v_secret, None)
        .await
        .unwrap();

    assert_eq!(result.amount, 5_000_000_000 - 890_880);
    assert!(result.confirmed);
}

#[tokio::test]
async fn test_claim_rejects_already_claimed() {
    let (k_seed, k_pub, v_secret, v_pub) = fixed_identity();
    let meta = StealthMetaAddress::new(k_pub, v_pub);
    let r = X25519StaticSecret::random_from_rng(rand::rngs::OsRng);
    let (p, ephemeral_pub, view_tag) = stealth::derive_stealth_public(&meta, &r).unwrap();

    let payment = StealthPayment {
        stealth_address: p,
        ephemeral_pub_key: ephemeral_pub,
        view_tag,
        amount: 0,
        token_mint: None,
        signature: "sig".into(),
        block_time: 0,
        claimed: true,
    };

    let ledger = FakeLedger::default();
    let err = claim_payment(&ledger, &payment, &k_seed, &v_secret, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        sip_stealth::Error::ClaimFailed("already claimed")
    ));
    assert!(ledger.submissions.lock().unwrap().is_empty());
}

#[test]
fn test_split_accounting_matches_literal_example() {
    let parts = policy::split_amount(10_000_000_000, 3);
    assert_eq!(parts, vec![3_333_333_333, 3_333_333_333, 3_333_333_334]);
    assert_eq!(parts.iter().sum::<u64>(), 10_000_000_000);
}

#[test]
fn test_policy_rejects_plain_public_key_recipient() {
    let plain_public_key = bs58::encode([0x42u8; 32]).into_string();
    assert!(!meta_address::is_valid(&plain_public_key));
}

#[test]
fn test_relayer_selection_picks_best_composite_score() {
    let relayers = vec![
        RelayerInfo {
            id: "r1".into(),
            endpoint: "https://r1.example".into(),
            region: "us".into(),
            fee_bps: 10,
            supported_tokens: vec![],
            health: sip_stealth::RelayerHealth {
                latency_ms: 50.0,
                success_rate: 99.0,
                online: true,
                last_seen: 0,
            },
        },
        RelayerInfo {
            id: "r2".into(),
            endpoint: "https://r2.example".into(),
            region: "us".into(),
            fee_bps: 15,
            supported_tokens: vec![],
            health: sip_stealth::RelayerHealth {
                latency_ms: 100.0,
                success_rate: 95.0,
                online: true,
                last_seen: 0,
            },
        },
        RelayerInfo {
            id: "r3".into(),
            endpoint: "https://r3.example".into(),
            region: "us".into(),
            fee_bps: 8,
            supported_tokens: vec![],
            health: sip_stealth::RelayerHealth {
                latency_ms: 30.0,
                success_rate: 90.0,
                online: true,
                last_seen: 0,
            },
        },
    ];

    let selector = RelayerSelector::new(relayers);
    let best = selector.select_best(&RelayerCriteria::default()).unwrap();
    assert_eq!(best.id, "r1");

    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let picked = selector.select_random(&RelayerCriteria::default()).unwrap();
        seen.insert(picked.id);
    }
    assert_eq!(seen.len(), 3, "select_random must cover all candidates");
}
