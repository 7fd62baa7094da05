//! Duel slot engine: resolves one spin request end to end
//!
//! ```text
//! ValidateBet → Stops/Grid → Duels → Evaluate → Scatter check
//!     → [free spins: sub-spin × N, early cap stop] → clamp → SpinResult
//! ```
//!
//! The engine itself is immutable; all per-spin state lives in locals and the
//! random source, so one engine can serve any number of threads.

use std::sync::Arc;

use log::debug;

use crate::config::{DEFAULT_FREE_SPINS, MathModelConfig, default_wild_columns};
use crate::duel::{DuelColumns, SpinPhase, resolve_duels};
use crate::error::{EngineError, EngineResult, ModelError};
use crate::grid::{Grid, build_grid};
use crate::paytable::{Evaluation, PayoutEvaluator};
use crate::rng::{SpinRng, rng_for};
use crate::spin::{SpinMode, SpinRequest, SpinResult, TriggeredFeature};
use crate::stops::StopSelector;
use crate::symbols::ReelSet;

/// Spin engine over a shared, read-only math model
#[derive(Debug, Clone)]
pub struct DuelSlotEngine {
    model: Arc<MathModelConfig>,
}

impl DuelSlotEngine {
    pub fn new(model: MathModelConfig) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn from_shared(model: Arc<MathModelConfig>) -> Self {
        Self { model }
    }

    /// Engine over the built-in Lair of Riches model
    pub fn lair_of_riches() -> Result<Self, ModelError> {
        Ok(Self::new(MathModelConfig::lair_of_riches()?))
    }

    pub fn model(&self) -> &MathModelConfig {
        &self.model
    }

    pub fn shared_model(&self) -> Arc<MathModelConfig> {
        Arc::clone(&self.model)
    }

    /// Reel set a request plays on: explicit override, else the mode's set
    pub fn reel_set_for(&self, request: &SpinRequest) -> EngineResult<&ReelSet> {
        let id = match (&request.reel_set_id, request.mode) {
            (Some(id), _) => id.as_str(),
            (None, SpinMode::Normal) => self.model.base_reel_set.as_str(),
            (None, SpinMode::BonusBoost) => self.model.boost_reel_set.as_str(),
            (None, SpinMode::Bonus3 | SpinMode::Bonus4) => self.model.bonus_reel_set.as_str(),
        };
        self.model
            .reel_set(id)
            .ok_or_else(|| EngineError::UnknownReelSet(id.to_string()))
    }

    /// Resolve a spin with a fresh random source (seeded when `qa_seed` is set)
    pub fn spin(&self, request: &SpinRequest) -> EngineResult<SpinResult> {
        let mut rng = rng_for(request.qa_seed.as_deref());
        self.spin_with_rng(request, rng.as_mut())
    }

    /// Resolve a spin drawing from `rng`; bonus sub-spins draw from it too
    pub fn spin_with_rng(
        &self,
        request: &SpinRequest,
        rng: &mut dyn SpinRng,
    ) -> EngineResult<SpinResult> {
        let model = &*self.model;
        let bet = request.bet;
        if !model.bets.contains(bet) {
            return Err(EngineError::BetOutOfRange {
                bet,
                min: model.bets.min,
                max: model.bets.max,
            });
        }

        let reel_set = self.reel_set_for(request)?;
        let selector = StopSelector::new(reel_set);
        let stops = match (request.mode.required_scatters(), model.scatter_id()) {
            (required, Some(scatter)) if required > 0 => {
                selector.scatter_guarantee_stops(rng, scatter, required)?
            }
            _ => selector.plain_stops(rng)?,
        };
        let grid = build_grid(reel_set, &stops);

        let evaluation = self.duel_and_evaluate(rng, &grid, SpinPhase::Base, bet)?;
        let base_payout = evaluation.payout;

        // counted on the evaluated grid, after expanding columns turned wild
        let scatter_counts = model
            .scatter_id()
            .map_or(0, |scatter| evaluation.grid.count(scatter));

        let mut total = base_payout;
        let mut capped = false;
        let mut feature = None;
        let mut bonus_rounds = Vec::new();

        if model.scatter_id().is_some() && scatter_counts >= model.scatter_trigger_count {
            let triggered = self.triggered_feature(scatter_counts);
            debug!(
                "Feature '{}' triggered by {} scatters: {} spins, {} guaranteed wild columns",
                triggered.id, scatter_counts, triggered.spins, triggered.guaranteed_wild_columns
            );

            let limit = model.win_cap(bet);
            for index in 0..triggered.spins {
                let round = self.bonus_spin(rng, bet, triggered.guaranteed_wild_columns)?;
                total += round.payout;
                bonus_rounds.push(round);
                if let Some(limit) = limit {
                    if total > limit {
                        debug!(
                            "Win cap {} reached after {} of {} free spins",
                            limit,
                            index + 1,
                            triggered.spins
                        );
                        capped = true;
                        break;
                    }
                }
            }
            feature = Some(triggered);
        }

        if let Some(limit) = model.win_cap(bet) {
            if total > limit {
                debug!("Total payout {total} clamped to {limit}");
                total = limit;
                capped = true;
            }
        }

        Ok(SpinResult {
            win: base_payout > 0.0,
            details: evaluation.grouped,
            amount: bet,
            payout: total,
            scatter_counts,
            wild_positions: evaluation.wilds,
            stop_index: stops,
            reel_set_id: reel_set.id.clone(),
            grid: evaluation.grid,
            feature,
            capped,
            rng: Some(rng.snapshot()),
            bonus_rounds,
        })
    }

    /// Feature for a triggering scatter count; default spins when none is defined
    fn triggered_feature(&self, scatter_counts: usize) -> TriggeredFeature {
        match self.model.feature_for_scatters(scatter_counts) {
            Some(def) => TriggeredFeature {
                id: def.id.clone(),
                spins: def.spins(),
                guaranteed_wild_columns: def.wild_columns_for(scatter_counts),
            },
            None => TriggeredFeature {
                id: "free_spins".to_string(),
                spins: DEFAULT_FREE_SPINS,
                guaranteed_wild_columns: default_wild_columns(scatter_counts),
            },
        }
    }

    /// One free spin on the bonus reel set with the bonus duel table
    fn bonus_spin(
        &self,
        rng: &mut dyn SpinRng,
        bet: u64,
        guaranteed_wild_columns: usize,
    ) -> EngineResult<SpinResult> {
        let model = &*self.model;
        let reel_set = model
            .reel_set(&model.bonus_reel_set)
            .ok_or_else(|| EngineError::UnknownReelSet(model.bonus_reel_set.clone()))?;
        let selector = StopSelector::new(reel_set);

        let mut stops = selector.plain_stops(rng)?;
        let mut grid = build_grid(reel_set, &stops);
        if let Some(expanding) = model.expanding_id() {
            grid = match guaranteed_wild_columns {
                0 => grid,
                1 => selector.guarantee_wild_column(rng, expanding, &mut stops, grid)?,
                need => selector.guarantee_n_wild_columns(rng, expanding, need, &mut stops, grid)?,
            };
        }

        let evaluation = self.duel_and_evaluate(rng, &grid, SpinPhase::FreeSpin, bet)?;
        let scatter_counts = model
            .scatter_id()
            .map_or(0, |scatter| evaluation.grid.count(scatter));

        Ok(SpinResult {
            win: evaluation.is_win(),
            details: evaluation.grouped,
            amount: bet,
            payout: evaluation.payout,
            scatter_counts,
            wild_positions: evaluation.wilds,
            stop_index: stops,
            reel_set_id: reel_set.id.clone(),
            grid: evaluation.grid,
            feature: None,
            capped: false,
            rng: None,
            bonus_rounds: Vec::new(),
        })
    }

    fn duel_and_evaluate(
        &self,
        rng: &mut dyn SpinRng,
        grid: &Grid,
        phase: SpinPhase,
        bet: u64,
    ) -> EngineResult<Evaluation> {
        let model = &*self.model;
        let duels = match model.expanding_id() {
            Some(expanding) => resolve_duels(rng, grid, expanding, model.duel.for_phase(phase))?,
            None => DuelColumns::default(),
        };
        Ok(PayoutEvaluator::new(&model.paytable, &model.paylines).evaluate(grid, &duels, bet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn engine() -> DuelSlotEngine {
        DuelSlotEngine::lair_of_riches().unwrap()
    }

    #[test]
    fn test_bet_out_of_range() {
        let engine = engine();
        for bet in [0, 9, 50_001] {
            let err = engine.spin(&SpinRequest::new(bet)).unwrap_err();
            assert_eq!(
                err,
                EngineError::BetOutOfRange {
                    bet,
                    min: 10,
                    max: 50_000
                }
            );
        }
    }

    #[test]
    fn test_unknown_reel_set() {
        let err = engine()
            .spin(&SpinRequest::new(10).with_reel_set("nope"))
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownReelSet("nope".into()));
    }

    #[test]
    fn test_reel_set_routing() {
        let engine = engine();
        let id = |req: SpinRequest| engine.reel_set_for(&req).unwrap().id.clone();
        assert_eq!(id(SpinRequest::new(10)), "default");
        assert_eq!(id(SpinRequest::new(10).with_mode(SpinMode::BonusBoost)), "default_boost");
        assert_eq!(id(SpinRequest::new(10).with_mode(SpinMode::Bonus3)), "bonus");
        assert_eq!(id(SpinRequest::new(10).with_mode(SpinMode::Bonus4)), "bonus");
        assert_eq!(
            id(SpinRequest::new(10).with_mode(SpinMode::Bonus4).with_reel_set("default")),
            "default"
        );
    }

    #[test]
    fn test_seeded_spin_is_reproducible() {
        let engine = engine();
        let req = SpinRequest::new(20).with_seed("replay-42");
        let a = engine.spin(&req).unwrap();
        let b = engine.spin(&req).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rng.as_ref().unwrap().seed.as_deref(), Some("replay-42"));
    }

    #[test]
    fn test_spin_with_rng_matches_spin() {
        let engine = engine();
        let req = SpinRequest::new(10).with_seed("same");
        let mut rng = SeededRng::new("same");
        assert_eq!(engine.spin(&req).unwrap(), engine.spin_with_rng(&req, &mut rng).unwrap());
    }

    #[test]
    fn test_result_shape() {
        let engine = engine();
        for i in 0..50 {
            let result = engine
                .spin(&SpinRequest::new(10).with_seed(format!("shape-{i}")))
                .unwrap();
            assert_eq!(result.stop_index.len(), 5);
            assert_eq!(result.grid.rows(), 5);
            assert_eq!(result.grid.columns(), 5);
            assert_eq!(result.amount, 10);
            assert!(result.payout >= 0.0);
            // the evaluated grid never shows an expanding symbol
            assert_eq!(result.grid.count(8), 0);
            let details: f64 = result.details.iter().map(|d| d.total_payout).sum();
            if result.bonus_rounds.is_empty() && !result.capped {
                assert!((details - result.payout).abs() < 1e-9);
            }
            assert_eq!(result.win, details > 0.0);
        }
    }

    #[test]
    fn test_bonus_buy_places_scatters() {
        let engine = engine();
        let bonus = engine.model().reel_set("bonus").unwrap();
        for i in 0..40 {
            let result = engine
                .spin(&SpinRequest::new(10).with_mode(SpinMode::Bonus3).with_seed(format!("buy-{i}")))
                .unwrap();
            assert_eq!(result.reel_set_id, "bonus");
            // every bonus strip has single-scatter windows, so placement is exact
            assert_eq!(build_grid(bonus, &result.stop_index).count(1), 3);

            if result.scatter_counts >= 3 {
                let feature = result.feature.as_ref().unwrap();
                assert_eq!(feature.id, "fs_3");
                assert!(result.capped || result.bonus_rounds.len() == feature.spins as usize);
                for round in &result.bonus_rounds {
                    assert_eq!(round.reel_set_id, "bonus");
                    assert!(round.bonus_rounds.is_empty());
                    assert!(round.feature.is_none());
                }
            } else {
                // an expanding column swallowed a scatter
                assert!(result.feature.is_none());
                assert!(result.bonus_rounds.is_empty());
            }
        }
    }

    #[test]
    fn test_four_scatter_buy_guarantees_wild_columns() {
        let engine = engine();
        for i in 0..20 {
            let result = engine
                .spin(&SpinRequest::new(10).with_mode(SpinMode::Bonus4).with_seed(format!("b4-{i}")))
                .unwrap();
            if result.feature.as_ref().is_some_and(|f| f.id == "fs_4") {
                for round in &result.bonus_rounds {
                    // the expanding column is evaluated as wild top to bottom
                    let full_wild = (0..5).any(|c| (0..5).all(|r| round.grid.get(r, c) == 0));
                    assert!(full_wild);
                }
            }
        }
    }
}
