// ABOUTME: Error types for tracker loading and market aggregate persistence
// ABOUTME: Wraps CSV, IO, and JSON failures alongside invalid weighting settings

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Half-life must be a positive number of days, got {0}")]
    InvalidHalfLife(f64),

    #[error("Failed to read tracker '{path}': {source}")]
    TrackerRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarketError>;
