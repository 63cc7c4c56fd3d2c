//! RELAYER SELECT: scores, filters, and chooses relayers, and aggregates
//! their rolling health.

use std::sync::Mutex;

use rand::Rng;

use crate::error::{Error, Result};
use crate::types::{HealthSample, RelayerHealth, RelayerInfo};

/// Latency-weighted EMA smoothing factor.
const LATENCY_EMA_WEIGHT: f64 = 0.2;
/// Success-rate EMA smoothing factor.
const SUCCESS_RATE_EMA_WEIGHT: f64 = 0.1;
/// Score bonus applied when a relayer's region matches the caller's
/// preferred region.
const REGION_MATCH_BONUS: f64 = 5.0;

/// Optional filters applied before scoring or random selection.
#[derive(Debug, Clone, Default)]
pub struct RelayerCriteria {
    pub token: Option<[u8; 32]>,
    pub max_fee_bps: Option<u32>,
    pub region: Option<String>,
}

/// Aggregate view over a selector's relayer pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSnapshot {
    pub total: usize,
    pub online_count: usize,
    pub avg_latency_ms: f64,
    pub avg_success_rate: f64,
}

/// The exactly-7-field relay request record; carries no sender identity.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub proof: Vec<u8>,
    /// `[merkle_root, nullifier_1, nullifier_2, output_commitment_1,
    /// output_commitment_2, public_amount, token_mint_field]`.
    pub public_inputs: [[u8; 32]; 7],
    pub nullifiers: Vec<[u8; 32]>,
    pub output_commitments: Vec<[u8; 32]>,
    pub merkle_root: [u8; 32],
}

/// Owns a pool of known relayers and their health. Writers serialize on the
/// instance; there is no global relayer registry.
pub struct RelayerSelector {
    relayers: Mutex<Vec<RelayerInfo>>,
}

impl RelayerSelector {
    pub fn new(relayers: Vec<RelayerInfo>) -> Self {
        Self {
            relayers: Mutex::new(relayers),
        }
    }

    fn filtered(&self, criteria: &RelayerCriteria) -> Vec<RelayerInfo> {
        self.relayers
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                criteria
                    .token
                    .map(|t| r.supported_tokens.contains(&t))
                    .unwrap_or(true)
            })
            .filter(|r| {
                criteria
                    .max_fee_bps
                    .map(|max| r.fee_bps <= max)
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    fn score(relayer: &RelayerInfo, criteria: &RelayerCriteria) -> f64 {
        let region_bonus = match &criteria.region {
            Some(region) if region == &relayer.region => REGION_MATCH_BONUS,
            _ => 0.0,
        };
        relayer.health.success_rate - relayer.health.latency_ms / 100.0 - relayer.fee_bps as f64
            + region_bonus
    }

    /// Returns the highest-scoring relayer among those matching `criteria`.
    /// Ties break on lower `fee_bps`, then lexicographically smaller `id`.
    pub fn select_best(&self, criteria: &RelayerCriteria) -> Result<RelayerInfo> {
        let candidates = self.filtered(criteria);
        candidates
            .into_iter()
            .max_by(|a, b| {
                let score_a = Self::score(a, criteria);
                let score_b = Self::score(b, criteria);
                score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.fee_bps.cmp(&a.fee_bps))
                    .then_with(|| b.id.cmp(&a.id))
            })
            .ok_or_else(|| Error::InvalidInput("no relayer matches the given criteria".into()))
    }

    /// Uniformly samples a relayer from the filtered set, denying an
    /// observer a predictable choice.
    pub fn select_random(&self, criteria: &RelayerCriteria) -> Result<RelayerInfo> {
        let candidates = self.filtered(criteria);
        if candidates.is_empty() {
            return Err(Error::InvalidInput("no relayer matches the given criteria".into()));
        }
        let index = rand::thread_rng().gen_range(0..candidates.len());
        Ok(candidates[index].clone())
    }

    pub fn health_snapshot(&self) -> HealthSnapshot {
        let relayers = self.relayers.lock().unwrap();
        let total = relayers.len();
        let online_count = relayers.iter().filter(|r| r.health.online).count();
        let avg_latency_ms = if total == 0 {
            0.0
        } else {
            relayers.iter().map(|r| r.health.latency_ms).sum::<f64>() / total as f64
        };
        let avg_success_rate = if total == 0 {
            0.0
        } else {
            relayers.iter().map(|r| r.health.success_rate).sum::<f64>() / total as f64
        };
        HealthSnapshot {
            total,
            online_count,
            avg_latency_ms,
            avg_success_rate,
        }
    }

    /// Merges a fresh observation into relayer `id`'s rolling health via an
    /// exponential moving average.
    pub fn update_health(&self, id: &str, sample: HealthSample) -> Result<()> {
        let mut relayers = self.relayers.lock().unwrap();
        let relayer = relayers
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::InvalidInput(format!("unknown relayer id {id}")))?;

        relayer.health.latency_ms = ema(
            relayer.health.latency_ms,
            sample.latency_ms,
            LATENCY_EMA_WEIGHT,
        );
        let success_sample = if sample.success { 100.0 } else { 0.0 };
        relayer.health.success_rate = ema(
            relayer.health.success_rate,
            success_sample,
            SUCCESS_RATE_EMA_WEIGHT,
        );
        relayer.health.online = true;
        relayer.health.last_seen = crate::types::now_secs();

        Ok(())
    }
}

fn ema(previous: f64, sample: f64, weight: f64) -> f64 {
    weight * sample + (1.0 - weight) * previous
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relayer(id: &str, fee_bps: u32, success_rate: f64, latency_ms: f64) -> RelayerInfo {
        RelayerInfo {
            id: id.to_string(),
            endpoint: format!("https://{id}.example"),
            region: "us".into(),
            fee_bps,
            supported_tokens: vec![],
            health: RelayerHealth {
                latency_ms,
                success_rate,
                online: true,
                last_seen: 0,
            },
        }
    }

    #[test]
    fn test_select_best_picks_highest_composite_score() {
        let selector = RelayerSelector::new(vec![
            relayer("a", 10, 99.0, 50.0),
            relayer("b", 15, 95.0, 100.0),
            relayer("c", 8, 90.0, 30.0),
        ]);

        let best = selector.select_best(&RelayerCriteria::default()).unwrap();
        assert_eq!(best.id, "a");
    }

    #[test]
    fn test_select_random_covers_all_candidates_with_enough_trials() {
        let selector = RelayerSelector::new(vec![
            relayer("a", 10, 99.0, 50.0),
            relayer("b", 15, 95.0, 100.0),
            relayer("c", 8, 90.0, 30.0),
        ]);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let picked = selector.select_random(&RelayerCriteria::default()).unwrap();
            seen.insert(picked.id);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_health_snapshot_aggregates_correctly() {
        let selector = RelayerSelector::new(vec![
            relayer("a", 10, 100.0, 0.0),
            relayer("b", 10, 0.0, 100.0),
        ]);
        let snapshot = selector.health_snapshot();
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.online_count, 2);
        assert_eq!(snapshot.avg_latency_ms, 50.0);
        assert_eq!(snapshot.avg_success_rate, 50.0);
    }

    #[test]
    fn test_update_health_applies_ema() {
        let selector = RelayerSelector::new(vec![relayer("a", 10, 100.0, 0.0)]);
        selector
            .update_health(
                "a",
                HealthSample {
                    latency_ms: 100.0,
                    success: false,
                },
            )
            .unwrap();

        let snapshot = selector.health_snapshot();
        assert_eq!(snapshot.avg_latency_ms, 20.0);
        assert_eq!(snapshot.avg_success_rate, 90.0);
    }
}
