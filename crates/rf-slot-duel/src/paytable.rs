//! Paytable, paylines and line evaluation

use serde::{Deserialize, Serialize};

use crate::duel::{DuelColumnResult, DuelColumns};
use crate::grid::Grid;
use crate::symbols::{SymbolDef, SymbolId, SymbolKind};

/// Minimum run that can pay
pub const MIN_RUN: u8 = 3;

/// A payline: one flattened grid position (`column * rows + row`) per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: usize,
    pub positions: Vec<usize>,
}

impl Payline {
    /// Build from a row-per-column shape, e.g. `[0, 1, 2, 1, 0]`
    pub fn from_rows(index: usize, rows: &[usize], rows_visible: usize) -> Self {
        Self {
            index,
            positions: rows
                .iter()
                .enumerate()
                .map(|(col, &row)| col * rows_visible + row)
                .collect(),
        }
    }

    /// `(row, col)` cells along the path, left to right
    pub fn cells(&self, rows_visible: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.positions
            .iter()
            .map(move |&pos| (pos % rows_visible, pos / rows_visible))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Symbol catalog with the special-symbol roles resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PayTable {
    symbols: Vec<SymbolDef>,
    wild_id: SymbolId,
    scatter_id: Option<SymbolId>,
    expanding_id: Option<SymbolId>,
    /// Bet the pays are calibrated at
    base_bet: u64,
}

impl PayTable {
    /// Resolve roles from symbol kinds; `None` when there is no wild
    pub fn new(symbols: Vec<SymbolDef>, base_bet: u64) -> Option<Self> {
        let find = |kind: SymbolKind| symbols.iter().find(|s| s.kind == kind).map(|s| s.id);
        let wild_id = find(SymbolKind::Wild)?;
        let scatter_id = find(SymbolKind::Scatter);
        let expanding_id = find(SymbolKind::Expanding);
        Some(Self {
            symbols,
            wild_id,
            scatter_id,
            expanding_id,
            base_bet: base_bet.max(1),
        })
    }

    pub fn symbols(&self) -> &[SymbolDef] {
        &self.symbols
    }

    pub fn get(&self, id: SymbolId) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.id == id)
    }

    pub fn wild_id(&self) -> SymbolId {
        self.wild_id
    }

    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.scatter_id
    }

    pub fn expanding_id(&self) -> Option<SymbolId> {
        self.expanding_id
    }

    pub fn base_bet(&self) -> u64 {
        self.base_bet
    }

    pub fn is_wild(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(SymbolDef::substitutes)
    }

    pub fn is_scatter(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(SymbolDef::is_scatter)
    }

    /// Stake one paytable unit is worth at `bet`
    pub fn unit_stake(&self, bet: u64) -> f64 {
        if bet == self.base_bet {
            1.0
        } else {
            bet as f64 / self.base_bet as f64
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// One paying line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMatch {
    /// 1-based payline number
    pub line_index: usize,
    pub count: u8,
    /// `(row, col)` of every cell in the run
    pub positions: Vec<(usize, usize)>,
    pub payout: f64,
    pub multiplier: u32,
}

/// All line wins of one paying symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSymbolWin {
    pub symbol: SymbolId,
    pub total_payout: f64,
    pub matches: Vec<LineMatch>,
}

/// A duel column that contributed to a paying line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildPosition {
    pub column: usize,
    pub multiplier: DuelColumnResult,
}

/// Result of evaluating one grid
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Grid after expanding-wild columns were turned wild
    pub grid: Grid,
    /// Grouped by symbol, in order of first paying line
    pub grouped: Vec<GroupedSymbolWin>,
    pub payout: f64,
    /// Duel columns on paying lines, first occurrence first
    pub wilds: Vec<WildPosition>,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        self.payout > 0.0
    }

    pub fn line_count(&self) -> usize {
        self.grouped.iter().map(|g| g.matches.len()).sum()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Walks every payline of a grid
pub struct PayoutEvaluator<'a> {
    paytable: &'a PayTable,
    paylines: &'a [Payline],
}

impl<'a> PayoutEvaluator<'a> {
    pub fn new(paytable: &'a PayTable, paylines: &'a [Payline]) -> Self {
        Self { paytable, paylines }
    }

    /// Expand wild columns, price every payline, and group wins by symbol
    pub fn evaluate(&self, grid: &Grid, duels: &DuelColumns, bet: u64) -> Evaluation {
        let mut grid = grid.clone();
        if let Some(expanding) = self.paytable.expanding_id() {
            grid.expand_columns(expanding, self.paytable.wild_id());
        }

        let unit = self.paytable.unit_stake(bet);
        let mut grouped: Vec<GroupedSymbolWin> = Vec::new();
        let mut wilds: Vec<WildPosition> = Vec::new();

        for line in self.paylines {
            let Some((symbol, count, positions)) = self.line_run(&grid, line) else {
                continue;
            };
            let Some(base) = self
                .paytable
                .get(symbol)
                .map(|def| def.pay_for(count))
                .filter(|&pay| pay > 0.0)
            else {
                continue;
            };

            let mut duel_sum: u32 = 0;
            for &(_, col) in &positions {
                let Some(duel) = duels.get(col) else {
                    continue;
                };
                duel_sum = duel_sum.saturating_add(duel[0]);
                if !wilds.iter().any(|w| w.column == col) {
                    wilds.push(WildPosition {
                        column: col,
                        multiplier: duel,
                    });
                }
            }
            let factor = if duel_sum > 0 { duel_sum } else { 1 };
            let payout = unit * base * f64::from(factor);

            let entry = match grouped.iter().position(|g| g.symbol == symbol) {
                Some(i) => &mut grouped[i],
                None => {
                    grouped.push(GroupedSymbolWin {
                        symbol,
                        total_payout: 0.0,
                        matches: Vec::new(),
                    });
                    let last = grouped.len() - 1;
                    &mut grouped[last]
                }
            };
            entry.total_payout += payout;
            entry.matches.push(LineMatch {
                line_index: line.index + 1,
                count,
                positions,
                payout,
                multiplier: factor,
            });
        }

        let payout = grouped.iter().map(|g| g.total_payout).sum();
        Evaluation {
            grid,
            grouped,
            payout,
            wilds,
        }
    }

    /// Paying symbol, run length and run cells of one line, if it qualifies
    ///
    /// The target is the first symbol that is neither wild nor scatter. A line
    /// with no target pays as the wild only when the whole path is wild.
    fn line_run(&self, grid: &Grid, line: &Payline) -> Option<(SymbolId, u8, Vec<(usize, usize)>)> {
        let chain: Vec<(usize, usize, SymbolId)> = line
            .cells(grid.rows())
            .map(|(row, col)| (row, col, grid.get(row, col)))
            .collect();

        let target = chain
            .iter()
            .map(|&(_, _, s)| s)
            .find(|&s| !self.paytable.is_wild(s) && !self.paytable.is_scatter(s));

        match target {
            None => {
                let wild = self.paytable.wild_id();
                let run: Vec<(usize, usize)> = chain
                    .iter()
                    .take_while(|&&(_, _, s)| self.paytable.is_wild(s))
                    .map(|&(row, col, _)| (row, col))
                    .collect();
                if run.is_empty() || run.len() != chain.len() {
                    return None;
                }
                Some((wild, run.len() as u8, run))
            }
            Some(target) => {
                let run: Vec<(usize, usize)> = chain
                    .iter()
                    .take_while(|&&(_, _, s)| s == target || self.paytable.is_wild(s))
                    .map(|&(row, col, _)| (row, col))
                    .collect();
                if run.len() < MIN_RUN as usize {
                    return None;
                }
                Some((target, run.len() as u8, run))
            }
        }
    }
}
