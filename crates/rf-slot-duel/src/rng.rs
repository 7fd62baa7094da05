//! Random sources
//!
//! Every spin draws from a [`SpinRng`]. Real play uses [`SystemRng`]
//! (ChaCha20 seeded from the OS); QA and replay use [`SeededRng`], a
//! xorshift128 generator keyed by a string so a round can be reproduced
//! exactly from its seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Uniform integer source used by the engine
pub trait SpinRng {
    /// Draw an integer in `[0, max_exclusive)`
    fn next_int(&mut self, max_exclusive: usize) -> EngineResult<usize>;

    /// Diagnostic snapshot (draw count, seed)
    fn snapshot(&self) -> RngSnapshot;
}

/// Which generator produced a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngKind {
    System,
    Seeded,
}

/// Observational RNG state. The cursor never feeds back into output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot {
    #[serde(rename = "type")]
    pub kind: RngKind,
    pub cursor: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYSTEM (NON-REPRODUCIBLE)
// ═══════════════════════════════════════════════════════════════════════════════

/// Cryptographically strong source for real play
pub struct SystemRng {
    inner: ChaCha20Rng,
    cursor: u64,
}

impl SystemRng {
    pub fn new() -> Self {
        Self {
            inner: ChaCha20Rng::from_os_rng(),
            cursor: 0,
        }
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinRng for SystemRng {
    fn next_int(&mut self, max_exclusive: usize) -> EngineResult<usize> {
        if max_exclusive == 0 {
            return Err(EngineError::InvalidRange(max_exclusive));
        }
        self.cursor += 1;
        Ok(self.inner.random_range(0..max_exclusive))
    }

    fn snapshot(&self) -> RngSnapshot {
        RngSnapshot {
            kind: RngKind::System,
            cursor: self.cursor,
            seed: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEEDED (QA / REPLAY)
// ═══════════════════════════════════════════════════════════════════════════════

/// Deterministic xorshift128 source keyed by a string seed
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: String,
    state: [u32; 4],
    cursor: u64,
}

/// 32-bit FNV-1a over the UTF-16 code units of `s`
pub fn fnv1a_32(s: &str) -> u32 {
    s.encode_utf16().fold(0x811c_9dc5_u32, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(0x0100_0193)
    })
}

impl SeededRng {
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let mut state = [
            fnv1a_32(&seed),
            fnv1a_32(&format!("{seed}#")),
            fnv1a_32(&format!("!{seed}")),
            fnv1a_32(&format!("{seed}$")),
        ];
        // xorshift never leaves the all-zero state
        if state == [0; 4] {
            state[0] = 1;
        }
        Self {
            seed,
            state,
            cursor: 0,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    fn next_u32(&mut self) -> u32 {
        let [x, y, z, w] = self.state;
        let t = x ^ (x << 11);
        let next = w ^ (w >> 19) ^ (t ^ (t >> 8));
        self.state = [y, z, w, next];
        next
    }
}

impl SpinRng for SeededRng {
    fn next_int(&mut self, max_exclusive: usize) -> EngineResult<usize> {
        if max_exclusive == 0 {
            return Err(EngineError::InvalidRange(max_exclusive));
        }
        self.cursor += 1;
        Ok(self.next_u32() as usize % max_exclusive)
    }

    fn snapshot(&self) -> RngSnapshot {
        RngSnapshot {
            kind: RngKind::Seeded,
            cursor: self.cursor,
            seed: Some(self.seed.clone()),
        }
    }
}

/// Fresh source for one spin request: seeded when a QA seed is present
pub fn rng_for(seed: Option<&str>) -> Box<dyn SpinRng> {
    match seed {
        Some(seed) => Box::new(SeededRng::new(seed)),
        None => Box::new(SystemRng::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("qa"), 0x6c4c_4607);
    }

    #[test]
    fn test_seeded_sequence_is_pinned() {
        let mut rng = SeededRng::new("qa");
        let draws: Vec<usize> = (0..5).map(|_| rng.next_int(1000).unwrap()).collect();
        assert_eq!(draws, vec![626, 704, 480, 869, 336]);
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut a = SeededRng::new("round-42");
        let mut b = SeededRng::new("round-42");
        for n in 1..200 {
            assert_eq!(a.next_int(n).unwrap(), b.next_int(n).unwrap());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new("alpha");
        let mut b = SeededRng::new("beta");
        let xs: Vec<usize> = (0..16).map(|_| a.next_int(1 << 20).unwrap()).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.next_int(1 << 20).unwrap()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_range_bounds() {
        let mut seeded = SeededRng::new("bounds");
        let mut system = SystemRng::new();
        for n in [1usize, 2, 3, 5, 48, 1000] {
            for _ in 0..500 {
                assert!(seeded.next_int(n).unwrap() < n);
                assert!(system.next_int(n).unwrap() < n);
            }
        }
    }

    #[test]
    fn test_zero_range_rejected() {
        let mut seeded = SeededRng::new("zero");
        assert_eq!(seeded.next_int(0), Err(EngineError::InvalidRange(0)));
        assert_eq!(seeded.snapshot().cursor, 0);

        let mut system = SystemRng::new();
        assert!(system.next_int(0).is_err());
    }

    #[test]
    fn test_snapshot_cursor() {
        let mut rng = SeededRng::new("cursor");
        for _ in 0..7 {
            rng.next_int(10).unwrap();
        }
        let snap = rng.snapshot();
        assert_eq!(snap.kind, RngKind::Seeded);
        assert_eq!(snap.cursor, 7);
        assert_eq!(snap.seed.as_deref(), Some("cursor"));

        let boxed = rng_for(None);
        assert_eq!(boxed.snapshot().kind, RngKind::System);
    }
}
