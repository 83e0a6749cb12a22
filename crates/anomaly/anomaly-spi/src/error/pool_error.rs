//! Detector pool errors.

use thiserror::Error;

/// Failures of pool management operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Unknown detector: {0}")]
    UnknownDetector(String),

    #[error("Detector already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid detector schema: {0}")]
    InvalidSchema(String),

    #[error("Pool store error: {0}")]
    Store(String),
}
