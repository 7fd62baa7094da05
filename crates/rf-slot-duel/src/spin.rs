//! Spin request and result types

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::paytable::{GroupedSymbolWin, WildPosition};
use crate::rng::RngSnapshot;

/// How a spin is played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpinMode {
    #[default]
    Normal,
    /// Normal spin on the scatter-heavy boost strips
    BonusBoost,
    /// Bonus buy guaranteeing 3 scatters
    #[serde(rename = "BONUS_3")]
    Bonus3,
    /// Bonus buy guaranteeing 4 scatters
    #[serde(rename = "BONUS_4")]
    Bonus4,
}

impl SpinMode {
    /// Scatters the bonus buy places on the base grid (0 for non-buy modes)
    pub fn required_scatters(self) -> usize {
        match self {
            Self::Normal | Self::BonusBoost => 0,
            Self::Bonus3 => 3,
            Self::Bonus4 => 4,
        }
    }

    pub fn is_bonus_buy(self) -> bool {
        self.required_scatters() > 0
    }
}

/// One spin invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    pub bet: u64,
    #[serde(rename = "spinType", default)]
    pub mode: SpinMode,
    /// Overrides the mode's reel set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reel_set_id: Option<String>,
    /// Switches to the deterministic source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_seed: Option<String>,
}

impl SpinRequest {
    pub fn new(bet: u64) -> Self {
        Self {
            bet,
            mode: SpinMode::Normal,
            reel_set_id: None,
            qa_seed: None,
        }
    }

    pub fn with_mode(mut self, mode: SpinMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_reel_set(mut self, id: impl Into<String>) -> Self {
        self.reel_set_id = Some(id.into());
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.qa_seed = Some(seed.into());
        self
    }
}

/// Free-spin sequence started by a base spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredFeature {
    pub id: String,
    /// Sub-spins awarded (may exceed `bonusRounds.len()` when the cap stopped early)
    pub spins: u32,
    pub guaranteed_wild_columns: usize,
}

/// Outcome of a spin or of one bonus sub-spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResult {
    pub win: bool,
    pub details: Vec<GroupedSymbolWin>,
    /// Echoed wager
    pub amount: u64,
    /// Post-cap payout; on the base result this includes every bonus round
    pub payout: f64,
    pub scatter_counts: usize,
    pub wild_positions: Vec<WildPosition>,
    pub stop_index: Vec<usize>,
    pub reel_set_id: String,
    /// Evaluated grid (expanding columns shown as wild)
    pub grid: Grid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<TriggeredFeature>,
    #[serde(default)]
    pub capped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng: Option<RngSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bonus_rounds: Vec<SpinResult>,
}

impl SpinResult {
    /// Payout as a multiple of the wager
    pub fn win_multiple(&self) -> f64 {
        if self.amount == 0 {
            0.0
        } else {
            self.payout / self.amount as f64
        }
    }

    pub fn triggered_feature(&self) -> bool {
        self.feature.is_some()
    }
}
