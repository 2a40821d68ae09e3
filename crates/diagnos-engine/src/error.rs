//! Error types for engine operations

use diagnos_domain::DiagnosisError;
use thiserror::Error;

/// Errors that can occur during calibration, estimation or selection
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid input shape, unknown cohort, empty log and similar
    #[error("{0}")]
    Domain(#[from] DiagnosisError),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Calibration snapshot could not be read or written
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// The domain error, if this is one
    pub fn as_domain(&self) -> Option<&DiagnosisError> {
        match self {
            EngineError::Domain(e) => Some(e),
            _ => None,
        }
    }
}
