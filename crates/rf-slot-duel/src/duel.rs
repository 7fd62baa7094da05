//! Duel resolution: per expanding-wild column, a winning multiplier and a
//! decoy shown beside it

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::grid::Grid;
use crate::rng::SpinRng;
use crate::symbols::SymbolId;
use crate::weighted::{WeightTable, pick_weighted, pick_weighted_excluding};

/// `[winning, decoy]`; only the winning multiplier affects payout
pub type DuelColumnResult = [u32; 2];

/// Which duel table a grid draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    Base,
    FreeSpin,
}

/// Base-game and free-spin multiplier tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelTables {
    pub base: WeightTable,
    pub bonus: WeightTable,
}

impl DuelTables {
    pub fn for_phase(&self, phase: SpinPhase) -> &WeightTable {
        match phase {
            SpinPhase::Base => &self.base,
            SpinPhase::FreeSpin => &self.bonus,
        }
    }
}

/// Duel results indexed by column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuelColumns {
    by_column: Vec<Option<DuelColumnResult>>,
}

impl DuelColumns {
    pub fn get(&self, col: usize) -> Option<DuelColumnResult> {
        self.by_column.get(col).copied().flatten()
    }

    /// Resolved columns, ascending
    pub fn iter(&self) -> impl Iterator<Item = (usize, DuelColumnResult)> + '_ {
        self.by_column
            .iter()
            .enumerate()
            .filter_map(|(col, duel)| duel.map(|d| (col, d)))
    }

    pub fn len(&self) -> usize {
        self.by_column.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Draw a duel for every column of `grid` that shows `expanding`
///
/// Columns are resolved left to right, once per column regardless of how
/// many expanding symbols it holds.
pub fn resolve_duels(
    rng: &mut dyn SpinRng,
    grid: &Grid,
    expanding: SymbolId,
    table: &WeightTable,
) -> EngineResult<DuelColumns> {
    let mut by_column = vec![None; grid.columns()];
    for col in grid.columns_containing(expanding) {
        let winner = pick_weighted(rng, table)?;
        let decoy = pick_weighted_excluding(rng, table, winner)?;
        by_column[col] = Some([winner, decoy]);
    }
    Ok(DuelColumns { by_column })
}

#[cfg(test)]
impl DuelColumns {
    /// Fixed duels for evaluator tests
    pub(crate) fn fixed(columns: usize, duels: &[(usize, DuelColumnResult)]) -> Self {
        let mut by_column = vec![None; columns];
        for &(col, duel) in duels {
            by_column[col] = Some(duel);
        }
        Self { by_column }
    }
}
