//! Weighted picks for the duel multiplier draw

use crate::error::{EngineResult, ModelError};
use crate::rng::SpinRng;

/// Parallel table of values and integer weights
///
/// Weights are pre-scaled integers so the draw stays exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    values: Vec<u32>,
    weights: Vec<u32>,
}

impl WeightTable {
    /// Build from integer weights
    pub fn new(values: Vec<u32>, weights: Vec<u32>) -> Result<Self, ModelError> {
        if values.len() != weights.len() {
            return Err(ModelError::Validation(format!(
                "Weight table length mismatch: {} values, {} weights",
                values.len(),
                weights.len()
            )));
        }
        let table = Self { values, weights };
        if table.total_weight() == 0 {
            return Err(ModelError::Validation(
                "Weight table has zero total weight".into(),
            ));
        }
        Ok(table)
    }

    /// Build from float weights: each weight becomes `round(w * scale)`
    pub fn scaled(values: Vec<u32>, weights: &[f64], scale: f64) -> Result<Self, ModelError> {
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ModelError::Validation(format!("Invalid weight: {bad}")));
        }
        let scaled = weights
            .iter()
            .map(|w| (w * scale).round() as u32)
            .collect();
        Self::new(values, scaled)
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total_weight(&self) -> usize {
        self.weights.iter().map(|&w| w as usize).sum()
    }

    /// Total weight of every entry whose value is not `value`
    pub fn weight_excluding(&self, value: u32) -> usize {
        self.entries()
            .filter(|&(v, _)| v != value)
            .map(|(_, w)| w as usize)
            .sum()
    }

    /// Values that can actually be drawn (positive weight), first occurrence order
    pub fn drawable_values(&self) -> Vec<u32> {
        let mut drawable = Vec::new();
        for (v, w) in self.entries() {
            if w > 0 && !drawable.contains(&v) {
                drawable.push(v);
            }
        }
        drawable
    }

    /// Number of distinct values (a decoy draw needs at least two)
    pub fn distinct_values(&self) -> usize {
        let mut seen: Vec<u32> = Vec::with_capacity(self.values.len());
        for v in &self.values {
            if !seen.contains(v) {
                seen.push(*v);
            }
        }
        seen.len()
    }

    fn entries(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.values.iter().copied().zip(self.weights.iter().copied())
    }
}

/// Draw one value proportional to its weight
pub fn pick_weighted(rng: &mut dyn SpinRng, table: &WeightTable) -> EngineResult<u32> {
    draw(rng, table.entries().collect())
}

/// Draw one value, ignoring every entry equal to `exclude`
///
/// Used for the decoy multiplier. A table left with zero weight after
/// filtering is a model defect and surfaces as `InvalidRange`.
pub fn pick_weighted_excluding(
    rng: &mut dyn SpinRng,
    table: &WeightTable,
    exclude: u32,
) -> EngineResult<u32> {
    draw(rng, table.entries().filter(|(v, _)| *v != exclude).collect())
}

fn draw(rng: &mut dyn SpinRng, entries: Vec<(u32, u32)>) -> EngineResult<u32> {
    let total: usize = entries.iter().map(|&(_, w)| w as usize).sum();
    let mut roll = rng.next_int(total)?;
    for &(value, weight) in &entries {
        let weight = weight as usize;
        if roll < weight {
            return Ok(value);
        }
        roll -= weight;
    }
    // unreachable with integer weights; keep the last entry as the residual
    Ok(entries.last().map(|&(v, _)| v).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::rng::SeededRng;

    fn table() -> WeightTable {
        WeightTable::new(vec![2, 3, 5], vec![50, 30, 20]).unwrap()
    }

    #[test]
    fn test_scaled_weights_round() {
        let t = WeightTable::scaled(vec![2, 3], &[1250.0, 0.4], 2500.0).unwrap();
        assert_eq!(t.weights(), &[3_125_000, 1000]);
        assert_eq!(t.total_weight(), 3_126_000);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(WeightTable::new(vec![1, 2], vec![1]).is_err());
        assert!(WeightTable::new(vec![1, 2], vec![0, 0]).is_err());
        assert!(WeightTable::scaled(vec![1], &[-1.0], 10.0).is_err());
    }

    #[test]
    fn test_distribution_converges() {
        let t = table();
        let mut rng = SeededRng::new("weights");
        let draws = 200_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            match pick_weighted(&mut rng, &t).unwrap() {
                2 => counts[0] += 1,
                3 => counts[1] += 1,
                5 => counts[2] += 1,
                other => panic!("unexpected value {other}"),
            }
        }
        for (count, expected) in counts.iter().zip([0.5, 0.3, 0.2]) {
            let freq = *count as f64 / draws as f64;
            assert!((freq - expected).abs() < 0.01, "freq {freq} vs {expected}");
        }
    }

    #[test]
    fn test_excluding_never_returns_excluded() {
        let t = WeightTable::new(vec![2, 3, 2, 5], vec![10, 10, 10, 10]).unwrap();
        let mut rng = SeededRng::new("decoy");
        for _ in 0..5_000 {
            let v = pick_weighted_excluding(&mut rng, &t, 2).unwrap();
            assert!(v == 3 || v == 5);
        }
    }

    #[test]
    fn test_excluding_everything_is_a_defect() {
        let t = WeightTable::new(vec![4, 4], vec![1, 1]).unwrap();
        assert_eq!(t.distinct_values(), 1);
        let mut rng = SeededRng::new("empty");
        assert_eq!(
            pick_weighted_excluding(&mut rng, &t, 4),
            Err(EngineError::InvalidRange(0))
        );
    }

    #[test]
    fn test_weight_excluding_and_drawable_values() {
        let t = WeightTable::new(vec![2, 2, 3, 7], vec![4, 6, 5, 0]).unwrap();
        assert_eq!(t.weight_excluding(2), 5);
        assert_eq!(t.weight_excluding(3), 10);
        assert_eq!(t.weight_excluding(9), 15);
        assert_eq!(t.drawable_values(), vec![2, 3]);
    }
}
