//! External collaborator interfaces. The core treats these as contracts;
//! real network/ledger plumbing lives outside the crate.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::AccountInfo;

/// Read-only access to ledger account state.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn get_balance(&self, address: &[u8; 32]) -> Result<u64>;
    async fn get_token_balance(&self, address: &[u8; 32], mint: &[u8; 32]) -> Result<u64>;
    async fn get_minimum_rent_exemption(&self, account_size: u64) -> Result<u64>;
    async fn get_account_info(&self, address: &[u8; 32]) -> Result<Option<AccountInfo>>;
}

/// A fully specified transfer, built by CLAIM or POLICY and handed to a
/// `LedgerWriter`.
#[derive(Debug, Clone)]
pub struct TransferSpec {
    pub from: [u8; 32],
    pub to: [u8; 32],
    pub amount: u64,
    pub token_mint: Option<[u8; 32]>,
    /// The 65-byte announcement record, when this transfer also publishes one.
    pub announcement: Option<[u8; 65]>,
    /// Optional viewing-key-encrypted memo sidecar (not part of the fixed
    /// announcement record itself).
    pub memo: Option<Vec<u8>>,
    /// Set when `to`'s associated token account does not yet exist and must
    /// be created as part of this transfer (token transfers only).
    pub create_destination_account: bool,
}

/// Submits transfers, confirming before returning.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn build_and_submit(&self, spec: &TransferSpec, signer: &[u8; 32]) -> Result<String>;
}

/// A single announcement as surfaced by an `AnnouncementSource`.
#[derive(Debug, Clone)]
pub struct RawAnnouncement {
    pub view_tag: u8,
    pub ephemeral_pub_key: [u8; 32],
    pub stealth_address: [u8; 32],
    pub amount: u64,
    pub token_mint: Option<[u8; 32]>,
    pub signature: String,
    pub block_time: u64,
}

/// Fetches announcements from the ledger, ordered stably by `block_time`.
#[async_trait]
pub trait AnnouncementSource: Send + Sync {
    async fn fetch(
        &self,
        from_slot: u64,
        to_slot: Option<u64>,
        limit: u32,
    ) -> Result<Vec<RawAnnouncement>>;
}

/// A relayer's response to a submitted `RelayRequest`.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub signature: String,
    pub block_time: Option<u64>,
}

/// Forwards a privacy-preserving transfer on the sender's behalf.
#[async_trait]
pub trait RelayerClient: Send + Sync {
    async fn submit(
        &self,
        relayer: &crate::types::RelayerInfo,
        request: &crate::relayer::RelayRequest,
    ) -> Result<RelayResponse>;
}

/// In-memory fakes for exercising CLAIM/SCAN/POLICY without a real ledger.
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A fake ledger with a fixed set of native and token balances, account
    /// existence flags, and a fixed rent-exemption schedule.
    #[derive(Default)]
    pub struct FakeLedger {
        pub native_balances: Mutex<HashMap<[u8; 32], u64>>,
        pub token_balances: Mutex<HashMap<([u8; 32], [u8; 32]), u64>>,
        pub accounts: Mutex<HashMap<[u8; 32], AccountInfo>>,
        pub rent_exemption: u64,
        pub submissions: Mutex<Vec<TransferSpec>>,
    }

    impl FakeLedger {
        pub fn with_balance(address: [u8; 32], amount: u64, rent_exemption: u64) -> Self {
            let ledger = Self {
                rent_exemption,
                ..Default::default()
            };
            ledger
                .native_balances
                .lock()
                .unwrap()
                .insert(address, amount);
            ledger
        }
    }

    #[async_trait]
    impl LedgerReader for FakeLedger {
        async fn get_balance(&self, address: &[u8; 32]) -> Result<u64> {
            Ok(*self
                .native_balances
                .lock()
                .unwrap()
                .get(address)
                .unwrap_or(&0))
        }

        async fn get_token_balance(&self, address: &[u8; 32], mint: &[u8; 32]) -> Result<u64> {
            Ok(*self
                .token_balances
                .lock()
                .unwrap()
                .get(&(*address, *mint))
                .unwrap_or(&0))
        }

        async fn get_minimum_rent_exemption(&self, _account_size: u64) -> Result<u64> {
            Ok(self.rent_exemption)
        }

        async fn get_account_info(&self, address: &[u8; 32]) -> Result<Option<AccountInfo>> {
            Ok(self.accounts.lock().unwrap().get(address).cloned())
        }
    }

    #[async_trait]
    impl LedgerWriter for FakeLedger {
        async fn build_and_submit(&self, spec: &TransferSpec, _signer: &[u8; 32]) -> Result<String> {
            self.submissions.lock().unwrap().push(spec.clone());
            Ok(format!("fake-signature-{}", self.submissions.lock().unwrap().len()))
        }
    }

    /// A fake announcement feed backed by a fixed `Vec`.
    pub struct FakeAnnouncementSource {
        pub announcements: Vec<RawAnnouncement>,
    }

    #[async_trait]
    impl AnnouncementSource for FakeAnnouncementSource {
        async fn fetch(
            &self,
            from_slot: u64,
            to_slot: Option<u64>,
            limit: u32,
        ) -> Result<Vec<RawAnnouncement>> {
            let to_slot = to_slot.unwrap_or(u64::MAX);
            Ok(self
                .announcements
                .iter()
                .filter(|a| a.block_time >= from_slot && a.block_time <= to_slot)
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    /// A fake relayer client that always succeeds, recording each submitted
    /// request for inspection.
    #[derive(Default)]
    pub struct FakeRelayerClient {
        pub submissions: Mutex<Vec<crate::relayer::RelayRequest>>,
    }

    #[async_trait]
    impl RelayerClient for FakeRelayerClient {
        async fn submit(
            &self,
            _relayer: &crate::types::RelayerInfo,
            request: &crate::relayer::RelayRequest,
        ) -> Result<RelayResponse> {
            self.submissions.lock().unwrap().push(request.clone());
            Ok(RelayResponse {
                signature: format!(
                    "fake-relay-signature-{}",
                    self.submissions.lock().unwrap().len()
                ),
                block_time: None,
            })
        }
    }
}
