//! SCAN: converts an external stream of announcements into a stream of
//! owned `StealthPayment` values.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};
use x25519_dalek::StaticSecret as X25519StaticSecret;
use zeroize::Zeroize;

use crate::crypto;
use crate::error::{Error, Result};
use crate::ledger::{AnnouncementSource, LedgerReader};
use crate::stealth;
use crate::types::StealthPayment;

const SUBSCRIPTION_POLL_INTERVAL: Duration = Duration::from_secs(5);
const SUBSCRIPTION_SCAN_LIMIT: u32 = 10;

/// Options for a single `scan` call.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub from_slot: Option<u64>,
    pub to_slot: Option<u64>,
    pub limit: Option<u32>,
    pub include_claimed: bool,
    pub token_mints: Vec<[u8; 32]>,
}

impl ScanOptions {
    fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(100)
    }
}

/// Holds the recipient's secrets and scan cursor. `v_secret` and
/// `k_spending_pub` live for the scanner's lifetime; `last_scanned_slot` is
/// the only shared mutable state, and is mutated only from this scanner's
/// own calls (direct or from its subscription task).
pub struct Scanner<S: AnnouncementSource, L: LedgerReader> {
    source: Arc<S>,
    ledger: Arc<L>,
    v_secret: X25519StaticSecret,
    k_spending_pub: [u8; 32],
    last_scanned_slot: AtomicU64,
}

impl<S: AnnouncementSource + 'static, L: LedgerReader + 'static> Scanner<S, L> {
    pub fn new(source: Arc<S>, ledger: Arc<L>, v_secret: X25519StaticSecret, k_spending_pub: [u8; 32]) -> Self {
        Self {
            source,
            ledger,
            v_secret,
            k_spending_pub,
            last_scanned_slot: AtomicU64::new(0),
        }
    }

    pub fn last_scanned_slot(&self) -> u64 {
        self.last_scanned_slot.load(Ordering::SeqCst)
    }

    /// Runs one scan batch, returning surviving payments in source order.
    pub async fn scan(&self, options: &ScanOptions) -> Result<Vec<StealthPayment>> {
        let from_slot = options
            .from_slot
            .unwrap_or_else(|| self.last_scanned_slot.load(Ordering::SeqCst));
        let limit = options.effective_limit();

        let raw = self
            .source
            .fetch(from_slot, options.to_slot, limit)
            .await
            .map_err(Error::scan_failed)?;

        info!(count = raw.len(), from_slot, "scan batch fetched");

        let mut kept = Vec::new();
        let mut max_block_time = from_slot;

        for record in raw {
            let mut shared_secret = match crypto::derive_shared_secret(
                &self.v_secret.to_bytes(),
                &record.ephemeral_pub_key,
            ) {
                Ok(s) => s,
                Err(_) => {
                    debug!("dropping announcement with malformed ephemeral key");
                    continue;
                }
            };

            if crypto::compute_view_tag(&shared_secret) != record.view_tag {
                shared_secret.zeroize();
                continue;
            }
            shared_secret.zeroize();

            let owned = stealth::verify_ownership(
                &record.stealth_address,
                &record.ephemeral_pub_key,
                &self.v_secret,
                &self.k_spending_pub,
                Some(record.view_tag),
            )?;
            if !owned {
                debug!("view tag matched but ownership verification failed");
                continue;
            }

            if !options.token_mints.is_empty() {
                let matches = record
                    .token_mint
                    .map(|mint| options.token_mints.contains(&mint))
                    .unwrap_or(false);
                if !matches {
                    continue;
                }
            }

            let balance = self.ledger.get_balance(&record.stealth_address).await?;
            let rent_floor = self.ledger.get_minimum_rent_exemption(0).await?;
            let claimed = balance <= rent_floor;
            if claimed && !options.include_claimed {
                continue;
            }

            max_block_time = max_block_time.max(record.block_time);
            kept.push(StealthPayment {
                stealth_address: record.stealth_address,
                ephemeral_pub_key: record.ephemeral_pub_key,
                view_tag: record.view_tag,
                amount: record.amount,
                token_mint: record.token_mint,
                signature: record.signature,
                block_time: record.block_time,
                claimed,
            });
        }

        self.last_scanned_slot
            .fetch_max(max_block_time, Ordering::SeqCst);
        Ok(kept)
    }

    /// Spawns a cooperative polling task that calls `scan` every ~5 seconds
    /// and delivers new payments to `callback` in arrival order. Errors
    /// raised by `callback` are logged and never propagate to the polling
    /// loop. The inter-poll sleep races a cancellation notification, so
    /// `unsubscribe` interrupts it instead of waiting out the full interval.
    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Unsubscribe
    where
        F: Fn(StealthPayment) -> Result<()> + Send + Sync + 'static,
    {
        let scanner = Arc::clone(self);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_handle = Arc::clone(&stop);
        let notify = Arc::new(Notify::new());
        let notify_handle = Arc::clone(&notify);

        let handle = tokio::spawn(async move {
            let options = ScanOptions {
                limit: Some(SUBSCRIPTION_SCAN_LIMIT),
                ..Default::default()
            };
            while !stop_handle.load(Ordering::SeqCst) {
                match scanner.scan(&options).await {
                    Ok(payments) => {
                        for payment in payments {
                            if let Err(e) = callback(payment) {
                                warn!(error = %e, "subscription callback failed");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "scan poll failed, continuing");
                    }
                }

                if stop_handle.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(SUBSCRIPTION_POLL_INTERVAL) => {}
                    _ = notify_handle.notified() => {}
                }
            }
            info!("subscription polling task stopped");
        });

        Unsubscribe {
            stop,
            notify,
            handle: Some(handle),
        }
    }
}

/// A cancellation handle for a `Scanner::subscribe` task. Idempotent: a
/// second `unsubscribe` call is a no-op.
pub struct Unsubscribe {
    stop: Arc<AtomicBool>,
    notify: Arc<Notify>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Unsubscribe {
    /// Halts new poll iterations and wakes an in-flight sleep immediately,
    /// then waits for the task to settle.
    pub async fn unsubscribe(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.notify.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}
