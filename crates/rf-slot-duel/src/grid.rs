//! Visible symbol grid

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::symbols::{ReelSet, SymbolId};

/// `rows × columns` window of symbols, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<SymbolId>>", try_from = "Vec<Vec<SymbolId>>")]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<SymbolId>,
}

impl Grid {
    /// Build from explicit rows; every row must be as long as the first
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> EngineResult<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(EngineError::RaggedGrid {
                row,
                expected: columns,
                found: r.len(),
            });
        }
        Ok(Self {
            rows: rows.len(),
            columns,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, col: usize) -> SymbolId {
        self.cells[row * self.columns + col]
    }

    pub fn set(&mut self, row: usize, col: usize, symbol: SymbolId) {
        self.cells[row * self.columns + col] = symbol;
    }

    /// Occurrences of `symbol` anywhere in the window
    pub fn count(&self, symbol: SymbolId) -> usize {
        self.cells.iter().filter(|&&s| s == symbol).count()
    }

    pub fn column_contains(&self, col: usize, symbol: SymbolId) -> bool {
        (0..self.rows).any(|row| self.get(row, col) == symbol)
    }

    /// Columns holding `symbol` at least once, ascending
    pub fn columns_containing(&self, symbol: SymbolId) -> Vec<usize> {
        (0..self.columns)
            .filter(|&col| self.column_contains(col, symbol))
            .collect()
    }

    /// Rewrite every column that holds `expanding` to `wild`; returns those columns
    pub fn expand_columns(&mut self, expanding: SymbolId, wild: SymbolId) -> Vec<usize> {
        let cols = self.columns_containing(expanding);
        for &col in &cols {
            for row in 0..self.rows {
                self.set(row, col, wild);
            }
        }
        cols
    }

    pub fn to_rows(&self) -> Vec<Vec<SymbolId>> {
        self.cells
            .chunks(self.columns.max(1))
            .map(<[SymbolId]>::to_vec)
            .collect()
    }
}

impl TryFrom<Vec<Vec<SymbolId>>> for Grid {
    type Error = EngineError;

    fn try_from(rows: Vec<Vec<SymbolId>>) -> EngineResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<SymbolId>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

/// Map one stop index per column to the visible window
///
/// `grid[r][c] = strip[c][(stops[c] + r) mod len]`
pub fn build_grid(reel_set: &ReelSet, stops: &[usize]) -> Grid {
    let rows = reel_set.rows_visible;
    let columns = reel_set.columns();
    let mut cells = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        for (strip, &stop) in reel_set.reels.iter().zip(stops) {
            cells.push(strip.symbol_at(stop + row));
        }
    }
    Grid {
        rows,
        columns,
        cells,
    }
}
