//! Error types for duoprep-core

use thiserror::Error;

/// Main error type for the duoprep-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote store error
    #[error("store error: {0}")]
    Store(String),

    /// Submission rejected before reaching the store
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}

/// Result type alias for duoprep-core
pub type Result<T> = std::result::Result<T, Error>;
