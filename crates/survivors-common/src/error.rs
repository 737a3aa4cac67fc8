//! Error types for the survivors simulation.
//!
//! Only loading and validation can fail. The per-tick simulation models
//! every abnormal condition as a state flag instead.

use thiserror::Error;

/// Top-level error type for survivors operations.
#[derive(Debug, Error)]
pub enum SurvivorsError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Spawn table could not be parsed
    #[error("Spawn table error: {0}")]
    SpawnTable(String),

    /// Data parsed but failed validation
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for survivors operations.
pub type SurvivorsResult<T> = Result<T, SurvivorsError>;
