//! Error types for the duel slot engine

use thiserror::Error;

/// Spin-time error
///
/// `BetOutOfRange` is the only condition a caller is expected to present to a
/// player. The others indicate a defect in the model or in the calling code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Bet out of range: {bet} not in [{min}, {max}]")]
    BetOutOfRange { bet: u64, min: u64, max: u64 },

    #[error("Invalid range: max_exclusive must be > 0 (got {0})")]
    InvalidRange(usize),

    #[error("Unknown reel set: {0}")]
    UnknownReelSet(String),

    #[error("Ragged grid: row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Model loading / validation error
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type EngineResult<T> = Result<T, EngineError>;
