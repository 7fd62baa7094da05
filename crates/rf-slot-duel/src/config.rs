//! Math model configuration
//!
//! A [`MathModelConfig`] is built once (from the embedded model or a model
//! file, see [`crate::parser`]) and never mutated. Engines share it behind an
//! `Arc`.

use serde::{Deserialize, Serialize};

use crate::duel::DuelTables;
use crate::error::ModelError;
use crate::parser::ModelParser;
use crate::paytable::{PayTable, Payline};
use crate::symbols::{ReelSet, SymbolId};

/// Built-in Lair of Riches 5×5 model document
pub const LAIR_OF_RICHES_JSON: &str = include_str!("../models/lair_of_riches.json");

/// Free spins awarded when a feature payload omits the count
pub const DEFAULT_FREE_SPINS: u32 = 10;

/// Base-spin scatters from which free spins guarantee a wild column by default
pub const WILD_GUARANTEE_SCATTERS: usize = 4;

/// Wild-column guarantee for a trigger whose feature leaves it unset
pub fn default_wild_columns(scatters: usize) -> usize {
    usize::from(scatters >= WILD_GUARANTEE_SCATTERS)
}

/// Inclusive wager limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: u64,
    pub max: u64,
}

impl BetLimits {
    pub fn contains(&self, bet: u64) -> bool {
        (self.min..=self.max).contains(&bet)
    }
}

/// Feature family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    FreeSpins,
    Respin,
    Modifier,
    Pick,
    Jackpot,
    Custom,
}

/// Scatter-count trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTrigger {
    pub symbol: SymbolId,
    pub min: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePayload {
    #[serde(default)]
    pub spins: Option<u32>,
    /// Expanding-wild columns every sub-spin must show (1 = single-column guarantee)
    #[serde(default)]
    pub guaranteed_wild_columns: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub id: String,
    pub kind: FeatureKind,
    pub trigger: FeatureTrigger,
    #[serde(default)]
    pub payload: FeaturePayload,
}

impl FeatureDefinition {
    pub fn spins(&self) -> u32 {
        self.payload.spins.unwrap_or(DEFAULT_FREE_SPINS)
    }

    pub fn guaranteed_wild_columns(&self) -> usize {
        self.payload.guaranteed_wild_columns.unwrap_or(0)
    }

    /// Guarantee for a trigger of `scatters`; an unset payload falls back to
    /// [`default_wild_columns`]
    pub fn wild_columns_for(&self, scatters: usize) -> usize {
        self.payload
            .guaranteed_wild_columns
            .unwrap_or_else(|| default_wild_columns(scatters))
    }
}

/// Complete static configuration of one game
#[derive(Debug, Clone)]
pub struct MathModelConfig {
    pub name: String,
    pub denomination: u32,
    pub bets: BetLimits,
    /// Total payout cap as a multiple of the wager
    pub max_win_cap_multiplier: Option<f64>,
    pub paytable: PayTable,
    pub paylines: Vec<Payline>,
    pub reel_sets: Vec<ReelSet>,
    pub base_reel_set: String,
    pub boost_reel_set: String,
    pub bonus_reel_set: String,
    /// Base-spin scatters needed to start free spins
    pub scatter_trigger_count: usize,
    pub features: Vec<FeatureDefinition>,
    pub duel: DuelTables,
}

impl MathModelConfig {
    /// The shipped Lair of Riches model
    pub fn lair_of_riches() -> Result<Self, ModelError> {
        ModelParser::new().parse_json(LAIR_OF_RICHES_JSON)
    }

    pub fn reel_set(&self, id: &str) -> Option<&ReelSet> {
        self.reel_sets.iter().find(|rs| rs.id == id)
    }

    pub fn rows_visible(&self) -> usize {
        self.reel_sets.first().map_or(0, |rs| rs.rows_visible)
    }

    pub fn columns(&self) -> usize {
        self.reel_sets.first().map_or(0, ReelSet::columns)
    }

    pub fn wild_id(&self) -> SymbolId {
        self.paytable.wild_id()
    }

    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.paytable.scatter_id()
    }

    pub fn expanding_id(&self) -> Option<SymbolId> {
        self.paytable.expanding_id()
    }

    /// Payout ceiling for `bet`, if the model caps wins
    pub fn win_cap(&self, bet: u64) -> Option<f64> {
        self.max_win_cap_multiplier.map(|cap| cap * bet as f64)
    }

    /// Feature with the highest trigger threshold the scatter count reaches
    pub fn feature_for_scatters(&self, scatter_count: usize) -> Option<&FeatureDefinition> {
        self.features
            .iter()
            .filter(|f| f.trigger.min <= scatter_count)
            .max_by_key(|f| f.trigger.min)
    }
}
