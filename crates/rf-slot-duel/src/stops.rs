//! Stop selection: plain random stops, scatter placement for bonus buys,
//! and expanding-wild column guarantees

use log::{debug, warn};

use crate::error::EngineResult;
use crate::grid::{Grid, build_grid};
use crate::rng::SpinRng;
use crate::symbols::{ReelSet, ReelStrip, SymbolId};

/// Stop that puts strip index `occurrence` on visible row `row`
pub fn stop_for_occurrence_at_row(occurrence: usize, row: usize, strip_len: usize) -> usize {
    (occurrence + strip_len - row % strip_len) % strip_len
}

/// Chooses stop indices against one reel set
pub struct StopSelector<'a> {
    reel_set: &'a ReelSet,
}

impl<'a> StopSelector<'a> {
    pub fn new(reel_set: &'a ReelSet) -> Self {
        Self { reel_set }
    }

    pub fn reel_set(&self) -> &ReelSet {
        self.reel_set
    }

    fn rows(&self) -> usize {
        self.reel_set.rows_visible
    }

    /// One uniform stop per column
    pub fn plain_stops(&self, rng: &mut dyn SpinRng) -> EngineResult<Vec<usize>> {
        self.reel_set
            .reels
            .iter()
            .map(|strip| rng.next_int(strip.len()))
            .collect()
    }

    /// Stops that show `scatter` on exactly `required` shuffled columns
    ///
    /// Chosen columns prefer windows with exactly one scatter, the rest prefer
    /// windows with none. When a strip cannot satisfy its preference the
    /// realized count may differ from `required`; that is accepted as-is.
    pub fn scatter_guarantee_stops(
        &self,
        rng: &mut dyn SpinRng,
        scatter: SymbolId,
        required: usize,
    ) -> EngineResult<Vec<usize>> {
        if required == 0 {
            return self.plain_stops(rng);
        }

        let columns = self.reel_set.columns();
        let mut order: Vec<usize> = (0..columns).collect();
        shuffle(rng, &mut order)?;
        let scatter_cols = &order[..required.min(columns)];

        let mut stops = vec![0; columns];
        for &col in scatter_cols {
            stops[col] = self.single_scatter_stop(rng, &self.reel_set.reels[col], scatter)?;
        }
        for col in (0..columns).filter(|c| !scatter_cols.contains(c)) {
            stops[col] = self.scatter_free_stop(rng, &self.reel_set.reels[col], scatter)?;
        }

        let realized = build_grid(self.reel_set, &stops).count(scatter);
        if realized != required {
            debug!(
                "Scatter placement on '{}' realized {} of {} requested",
                self.reel_set.id, realized, required
            );
        }
        Ok(stops)
    }

    fn single_scatter_stop(
        &self,
        rng: &mut dyn SpinRng,
        strip: &ReelStrip,
        scatter: SymbolId,
    ) -> EngineResult<usize> {
        let occurrences = strip.positions_of(scatter);
        if occurrences.is_empty() {
            return rng.next_int(strip.len());
        }

        let rows = self.rows();
        let mut candidates = Vec::new();
        for &occ in &occurrences {
            for row in 0..rows {
                let top = stop_for_occurrence_at_row(occ, row, strip.len());
                if strip.window_count(top, rows, scatter) == 1 {
                    candidates.push(top);
                }
            }
        }
        if !candidates.is_empty() {
            return Ok(candidates[rng.next_int(candidates.len())?]);
        }

        let occ = occurrences[rng.next_int(occurrences.len())?];
        let row = rng.next_int(rows)?;
        Ok(stop_for_occurrence_at_row(occ, row, strip.len()))
    }

    fn scatter_free_stop(
        &self,
        rng: &mut dyn SpinRng,
        strip: &ReelStrip,
        scatter: SymbolId,
    ) -> EngineResult<usize> {
        let rows = self.rows();
        let zero_stops: Vec<usize> = (0..strip.len())
            .filter(|&top| strip.window_count(top, rows, scatter) == 0)
            .collect();
        if !zero_stops.is_empty() {
            return Ok(zero_stops[rng.next_int(zero_stops.len())?]);
        }

        // fewest scatters, first found wins
        let mut best_top = 0;
        let mut best_count = usize::MAX;
        for top in 0..strip.len() {
            let count = strip.window_count(top, rows, scatter);
            if count < best_count {
                best_count = count;
                best_top = top;
                if count == 0 {
                    break;
                }
            }
        }
        Ok(best_top)
    }

    /// Ensure at least one column shows `expanding`
    ///
    /// A grid that already has one is returned unchanged. Otherwise a random
    /// column is moved onto an `expanding` occurrence; if that strip carries
    /// none, the first column (in order) whose strip does is used instead.
    pub fn guarantee_wild_column(
        &self,
        rng: &mut dyn SpinRng,
        expanding: SymbolId,
        stops: &mut [usize],
        grid: Grid,
    ) -> EngineResult<Grid> {
        if !grid.columns_containing(expanding).is_empty() {
            return Ok(grid);
        }

        let picked = rng.next_int(self.reel_set.columns())?;
        if self.relocate(rng, picked, expanding, stops)? {
            return Ok(build_grid(self.reel_set, stops));
        }
        for col in 0..self.reel_set.columns() {
            if self.relocate(rng, col, expanding, stops)? {
                return Ok(build_grid(self.reel_set, stops));
            }
        }

        warn!(
            "Reel set '{}' carries no expanding symbol {}; wild guarantee skipped",
            self.reel_set.id, expanding
        );
        Ok(grid)
    }

    /// Ensure at least `need` columns show `expanding`, converting shuffled
    /// columns one by one until satisfied or out of convertible columns
    pub fn guarantee_n_wild_columns(
        &self,
        rng: &mut dyn SpinRng,
        expanding: SymbolId,
        need: usize,
        stops: &mut [usize],
        mut grid: Grid,
    ) -> EngineResult<Grid> {
        if need == 0 {
            return Ok(grid);
        }
        let current = grid.columns_containing(expanding);
        if current.len() >= need {
            return Ok(grid);
        }

        let mut have = current.len();
        let mut remaining: Vec<usize> = (0..self.reel_set.columns())
            .filter(|c| !current.contains(c))
            .collect();
        shuffle(rng, &mut remaining)?;

        for col in remaining {
            if have >= need {
                break;
            }
            if self.relocate(rng, col, expanding, stops)? {
                grid = build_grid(self.reel_set, stops);
                have += 1;
            }
        }
        Ok(grid)
    }

    /// Move `col` onto a random `symbol` occurrence at a random row.
    /// Returns false when the strip has no such symbol.
    fn relocate(
        &self,
        rng: &mut dyn SpinRng,
        col: usize,
        symbol: SymbolId,
        stops: &mut [usize],
    ) -> EngineResult<bool> {
        let strip = &self.reel_set.reels[col];
        let occurrences = strip.positions_of(symbol);
        if occurrences.is_empty() {
            return Ok(false);
        }
        let occ = occurrences[rng.next_int(occurrences.len())?];
        let row = rng.next_int(self.rows())?;
        stops[col] = stop_for_occurrence_at_row(occ, row, strip.len());
        Ok(true)
    }
}

/// Fisher–Yates, driven by the spin's random source
fn shuffle(rng: &mut dyn SpinRng, items: &mut [usize]) -> EngineResult<()> {
    for i in (1..items.len()).rev() {
        let j = rng.next_int(i + 1)?;
        items.swap(i, j);
    }
    Ok(())
}
