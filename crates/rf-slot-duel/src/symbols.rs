//! Symbol definitions, reel strips and reel sets

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reel symbol identifier, stable across the whole model
pub type SymbolId = u32;

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Low paying
    Low,
    /// Mid paying
    Mid,
    /// High paying
    High,
    /// Substitutes for every paying symbol on a line
    Wild,
    /// Counted anywhere on the grid; triggers free spins
    Scatter,
    /// Turns its whole column wild and carries a duel multiplier
    Expanding,
}

/// A symbol with its line pays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Run length -> pay (in base-bet units)
    #[serde(default)]
    pub pays: BTreeMap<u8, f64>,
}

impl SymbolDef {
    pub fn new(id: SymbolId, name: impl Into<String>, kind: SymbolKind, pays: &[(u8, f64)]) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            pays: pays.iter().copied().collect(),
        }
    }

    /// Pay for a run of `count`, zero when absent
    pub fn pay_for(&self, count: u8) -> f64 {
        self.pays.get(&count).copied().unwrap_or(0.0)
    }

    pub fn substitutes(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    pub fn is_scatter(&self) -> bool {
        self.kind == SymbolKind::Scatter
    }

    pub fn is_special(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Wild | SymbolKind::Scatter | SymbolKind::Expanding
        )
    }
}

/// A cyclic virtual reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStrip {
    pub id: String,
    pub symbols: Vec<SymbolId>,
}

impl ReelStrip {
    pub fn new(id: impl Into<String>, symbols: Vec<SymbolId>) -> Self {
        Self {
            id: id.into(),
            symbols,
        }
    }

    /// Symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> SymbolId {
        self.symbols[position % self.symbols.len()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Every strip index holding `symbol`, ascending
    pub fn positions_of(&self, symbol: SymbolId) -> Vec<usize> {
        self.symbols
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == symbol)
            .map(|(i, _)| i)
            .collect()
    }

    /// How many times `symbol` shows in the `rows`-tall window starting at `top`
    pub fn window_count(&self, top: usize, rows: usize, symbol: SymbolId) -> usize {
        (0..rows)
            .filter(|&r| self.symbol_at(top + r) == symbol)
            .count()
    }
}

/// Named group of strips, one per visible column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelSet {
    pub id: String,
    pub reels: Vec<ReelStrip>,
    pub rows_visible: usize,
    /// Carried from the model document; evaluation is payline-only
    #[serde(default)]
    pub ways: bool,
}

impl ReelSet {
    /// Build a set whose strips are named `{id}_R{column}`
    pub fn from_symbols(id: impl Into<String>, rows_visible: usize, reels: Vec<Vec<SymbolId>>) -> Self {
        let id = id.into();
        let reels = reels
            .into_iter()
            .enumerate()
            .map(|(col, symbols)| ReelStrip::new(format!("{id}_R{col}"), symbols))
            .collect();
        Self {
            id,
            reels,
            rows_visible,
            ways: false,
        }
    }

    pub fn columns(&self) -> usize {
        self.reels.len()
    }
}
