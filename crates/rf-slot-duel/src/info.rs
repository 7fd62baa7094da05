//! Game info: model summary for the presentation layer

use serde::{Deserialize, Serialize};

use crate::config::{BetLimits, MathModelConfig};
use crate::symbols::{SymbolDef, SymbolId};

/// What a client needs to lay out and label the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub symbols: Vec<SymbolDef>,
    pub reel_sets: Vec<ReelSetInfo>,
    pub paylines: Vec<Vec<usize>>,
    pub bets: BetLimits,
    /// Payout cap as a multiple of the wager
    #[serde(default)]
    pub max_win_multiple: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelSetInfo {
    pub id: String,
    pub reels: Vec<Vec<SymbolId>>,
}

impl GameInfo {
    pub fn from_model(model: &MathModelConfig) -> Self {
        Self {
            name: model.name.clone(),
            rows: model.rows_visible(),
            columns: model.columns(),
            symbols: model.paytable.symbols().to_vec(),
            reel_sets: model
                .reel_sets
                .iter()
                .map(|rs| ReelSetInfo {
                    id: rs.id.clone(),
                    reels: rs.reels.iter().map(|strip| strip.symbols.clone()).collect(),
                })
                .collect(),
            paylines: model.paylines.iter().map(|line| line.positions.clone()).collect(),
            bets: model.bets,
            max_win_multiple: model.max_win_cap_multiplier,
        }
    }
}
