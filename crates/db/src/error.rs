//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("pipeline not found: '{0}'")]
    NotFound(String),

    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed storage document: {0}")]
    Serialization(#[from] serde_json::Error),
}
