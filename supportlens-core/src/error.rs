use thiserror::Error;

use crate::completions::CompletionError;

/// Top-level error type for SupportLens core operations.
#[derive(Error, Debug)]
pub enum SupportLensError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// A category label that is not one of the canonical names. Raised
    /// for bad list filters and for corrupt labels read back from the
    /// store; never raised during classification, which falls back
    /// instead.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}
