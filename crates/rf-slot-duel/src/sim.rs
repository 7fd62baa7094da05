//! Batch simulation for model QA
//!
//! Spins are independent, so a batch fans out over the rayon pool. Each spin
//! gets its own random source; seeded batches derive `"{seed}-{index}"` per
//! spin, which keeps a batch reproducible regardless of thread scheduling.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::DuelSlotEngine;
use crate::error::EngineResult;
use crate::spin::{SpinMode, SpinRequest, SpinResult};

/// Aggregate statistics over a batch of spins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    /// Spins whose base grid paid
    pub wins: u64,
    pub features_triggered: u64,
    pub bonus_spins: u64,
    pub max_win_ratio: f64,
    pub cap_hits: u64,
}

impl SimulationStats {
    /// Stats of a single spin
    pub fn from_result(result: &SpinResult) -> Self {
        Self {
            total_spins: 1,
            total_bet: result.amount as f64,
            total_win: result.payout,
            wins: u64::from(result.win),
            features_triggered: u64::from(result.triggered_feature()),
            bonus_spins: result.bonus_rounds.len() as u64,
            max_win_ratio: result.win_multiple(),
            cap_hits: u64::from(result.capped),
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.total_spins += other.total_spins;
        self.total_bet += other.total_bet;
        self.total_win += other.total_win;
        self.wins += other.wins;
        self.features_triggered += other.features_triggered;
        self.bonus_spins += other.bonus_spins;
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
        self.cap_hits += other.cap_hits;
        self
    }

    /// Calculate RTP (percent)
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate (percent)
    pub fn hit_rate(&self) -> f64 {
        self.per_spin(self.wins)
    }

    /// Feature trigger rate (percent)
    pub fn feature_rate(&self) -> f64 {
        self.per_spin(self.features_triggered)
    }

    fn per_spin(&self, count: u64) -> f64 {
        if self.total_spins > 0 {
            (count as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Runs batches of spins against one engine
pub struct Simulator {
    engine: DuelSlotEngine,
}

impl Simulator {
    pub fn new(engine: DuelSlotEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &DuelSlotEngine {
        &self.engine
    }

    /// Spin `spins` times at `bet` in `mode`
    ///
    /// The first failing spin aborts the batch (only a bad bet or reel set
    /// can fail, and those fail every spin alike).
    pub fn run(
        &self,
        spins: u64,
        bet: u64,
        mode: SpinMode,
        seed: Option<&str>,
    ) -> EngineResult<SimulationStats> {
        let stats = (0..spins)
            .into_par_iter()
            .map(|index| {
                let mut request = SpinRequest::new(bet).with_mode(mode);
                if let Some(seed) = seed {
                    request = request.with_seed(format!("{seed}-{index}"));
                }
                self.engine
                    .spin(&request)
                    .map(|result| SimulationStats::from_result(&result))
            })
            .try_reduce(SimulationStats::default, |a, b| Ok(a.merge(b)))?;

        info!(
            "Simulated {} {:?} spins at bet {}: RTP {:.2}%, hit rate {:.2}%, features {}",
            stats.total_spins,
            mode,
            bet,
            stats.rtp(),
            stats.hit_rate(),
            stats.features_triggered
        );
        Ok(stats)
    }
}
