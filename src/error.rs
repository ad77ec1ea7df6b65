//! Error types for LexRisk.
//!
//! All fallible operations in the crate return [`Result`], whose error type is
//! [`LexRiskError`]. Only [`LexRiskError::LexiconLoad`] and
//! [`LexRiskError::Timeout`] ever leave the scoring path; everything raised
//! inside lexicon expansion is contained and logged there.

use std::time::Duration;

use thiserror::Error;

/// The main error type for LexRisk operations.
#[derive(Error, Debug)]
pub enum LexRiskError {
    /// I/O errors (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TSV parsing or writing errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The persisted lexicon is missing or malformed.
    #[error("Lexicon load error: {0}")]
    LexiconLoad(String),

    /// The lemmatizer could not process its input.
    #[error("Lemmatization failed: {0}")]
    Lemmatization(String),

    /// A token has no vector in the embedding table.
    #[error("No embedding vector for token '{0}'")]
    EmbeddingMiss(String),

    /// Appending expanded entries to the lexicon store failed.
    #[error("Expansion write failed: {0}")]
    ExpansionWrite(String),

    /// A scoring call exceeded its wall-clock budget.
    #[error("Scoring timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument or input data.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal errors (worker channels closed, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with [`LexRiskError`].
pub type Result<T> = std::result::Result<T, LexRiskError>;

impl LexRiskError {
    /// Create a new lexicon load error.
    pub fn lexicon_load<S: Into<String>>(msg: S) -> Self {
        LexRiskError::LexiconLoad(msg.into())
    }

    /// Create a new lemmatization error.
    pub fn lemmatization<S: Into<String>>(msg: S) -> Self {
        LexRiskError::Lemmatization(msg.into())
    }

    /// Create a new expansion write error.
    pub fn expansion_write<S: Into<String>>(msg: S) -> Self {
        LexRiskError::ExpansionWrite(msg.into())
    }

    /// Create a new invalid configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        LexRiskError::InvalidConfig(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        LexRiskError::InvalidArgument(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        LexRiskError::Internal(msg.into())
    }

    /// Whether the error means the scoring service cannot answer at all.
    ///
    /// Callers exposing the engine over a transport should map this to a
    /// "service unavailable" condition.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, LexRiskError::LexiconLoad(_))
    }
}
