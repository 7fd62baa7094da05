//! # rf-slot-duel: Duel Multiplier Slot Math Engine
//!
//! Resolves single spins of a 5×5, 19-line video slot whose expanding wilds
//! fight a "duel": every expanding column draws a winning multiplier and a
//! decoy, and the winning multipliers of the columns a line crosses are summed
//! into that line's payout factor.
//!
//! ## Features
//!
//! - **Random sources**: OS-seeded ChaCha for play, string-seeded xorshift128 for QA replay
//! - **Bonus buys**: constrained stop selection that places 3 or 4 scatters
//! - **Wild guarantee**: free spins that always show an expanding column
//! - **Win cap**: early stop of free spins and clamp of the total payout
//! - **Model files**: JSON/YAML math models with load-time validation
//! - **Simulation**: parallel RTP / hit-rate batches
//!
//! ## Architecture
//!
//! ```text
//! DuelSlotEngine (Arc<MathModelConfig>)
//!     │
//!     ├── StopSelector  (plain / scatter guarantee / wild guarantee)
//!     ├── build_grid    (stops → visible window)
//!     ├── resolve_duels (WeightTable draws per expanding column)
//!     └── PayoutEvaluator (expansion, paylines, duel factor)
//!           │
//!           v
//!     SpinResult (+ bonusRounds)
//! ```

pub mod config;
pub mod duel;
pub mod engine;
pub mod error;
pub mod grid;
pub mod info;
pub mod parser;
pub mod paytable;
pub mod rng;
pub mod sim;
pub mod spin;
pub mod stops;
pub mod symbols;
pub mod weighted;

pub use config::*;
pub use duel::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use info::*;
pub use parser::{ModelDocument, ModelLimits, ModelParser};
pub use paytable::*;
pub use rng::*;
pub use sim::*;
pub use spin::*;
pub use stops::*;
pub use symbols::*;
pub use weighted::*;
