//! Domain error kinds shared by every layer

use thiserror::Error;

/// Errors raised while validating or combining diagnosis data
///
/// Shape problems are reported before any numeric work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosisError {
    /// Unknown cohort or no Q-matrix registered for it
    #[error("Not found: {0}")]
    NotFound(String),

    /// A vector or matrix has the wrong length for its cohort
    #[error("Dimension mismatch ({context}): expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked
        context: String,
        /// Required length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Non-binary entry, unparseable token or empty matrix
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Calibration attempted without any logged responses
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// More remedial items requested than the cohort has
    #[error("Insufficient items: requested {requested}, only {available} available")]
    InsufficientItems {
        /// Number of items asked for
        requested: usize,
        /// Number of items in the cohort
        available: usize,
    },

    /// Skill count too large for `2^K` class enumeration
    #[error("Too many skills: {skills} exceeds the supported maximum of {max}")]
    TooManySkills {
        /// Skill count that was supplied
        skills: usize,
        /// Largest supported skill count
        max: usize,
    },
}

impl DiagnosisError {
    /// Shorthand for a [`DiagnosisError::DimensionMismatch`]
    pub fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Fail with a dimension mismatch unless `expected == actual`
    pub fn check_dimension(
        context: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::dimension(context, expected, actual))
        }
    }
}
