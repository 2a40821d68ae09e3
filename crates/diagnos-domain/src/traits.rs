//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the diagnosis engine and
//! storage. Implementations live in other crates.

use crate::{CohortId, DiagnosisError, QMatrix, ResponseMatrix, ResponseVector};
use std::fmt::Display;
use std::sync::Arc;

/// Store error that may carry a domain error
///
/// Callers use it to recover `NotFound` or `MalformedData` from a
/// storage failure.
pub trait StoreFailure: Display {
    /// The domain error this failure wraps, if any
    fn as_domain(&self) -> Option<&DiagnosisError>;
}

impl StoreFailure for DiagnosisError {
    fn as_domain(&self) -> Option<&DiagnosisError> {
        Some(self)
    }
}

/// Read-only source of Q-matrices, one per cohort
///
/// Implemented by the infrastructure layer (diagnos-store)
pub trait QMatrixStore {
    /// Error type for store operations
    type Error;

    /// Load the Q-matrix registered for a cohort
    ///
    /// Deterministic; fails with a not-found error for unknown cohorts.
    fn load(&self, cohort: CohortId) -> Result<Arc<QMatrix>, Self::Error>;

    /// Cohorts that have a Q-matrix registered, ascending
    fn cohorts(&self) -> Vec<CohortId>;
}

/// Append-only log of response vectors, one log per cohort
///
/// Implemented by the infrastructure layer (diagnos-store)
pub trait ResponseLog {
    /// Error type for log operations
    type Error;

    /// Append one vector to the end of the cohort's log
    ///
    /// The vector length must equal the cohort's item count. Appends to the
    /// same cohort are serialized.
    fn append(&self, cohort: CohortId, vector: &ResponseVector) -> Result<(), Self::Error>;

    /// Snapshot of every logged vector, in insertion order
    ///
    /// An empty log yields zero rows with the cohort's column count.
    fn read_all(&self, cohort: CohortId) -> Result<ResponseMatrix, Self::Error>;

    /// Number of logged vectors
    fn row_count(&self, cohort: CohortId) -> Result<usize, Self::Error> {
        self.read_all(cohort).map(|m| m.students())
    }
}

impl<T: QMatrixStore + ?Sized> QMatrixStore for Arc<T> {
    type Error = T::Error;

    fn load(&self, cohort: CohortId) -> Result<Arc<QMatrix>, Self::Error> {
        (**self).load(cohort)
    }

    fn cohorts(&self) -> Vec<CohortId> {
        (**self).cohorts()
    }
}

impl<T: ResponseLog + ?Sized> ResponseLog for Arc<T> {
    type Error = T::Error;

    fn append(&self, cohort: CohortId, vector: &ResponseVector) -> Result<(), Self::Error> {
        (**self).append(cohort, vector)
    }

    fn read_all(&self, cohort: CohortId) -> Result<ResponseMatrix, Self::Error> {
        (**self).read_all(cohort)
    }

    fn row_count(&self, cohort: CohortId) -> Result<usize, Self::Error> {
        (**self).row_count(cohort)
    }
}
