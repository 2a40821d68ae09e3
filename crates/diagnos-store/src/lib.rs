//! Diagnos Storage Layer
//!
//! Implements the `QMatrixStore` and `ResponseLog` traits on top of plain
//! text files, plus an in-memory variant for tests and embedding.
//!
//! # Architecture
//!
//! - Q-matrices: one whitespace-delimited file per cohort, parsed once and cached
//! - Response logs: one append-only text file per cohort, one response per line
//! - Per-cohort `RwLock`: appends are serialized, reads share the lock
//!
//! # Examples
//!
//! ```no_run
//! use diagnos_domain::traits::{QMatrixStore, ResponseLog};
//! use diagnos_domain::{CohortId, ResponseVector};
//! use diagnos_store::{FileQMatrixStore, FileResponseLog};
//!
//! let grade4 = CohortId(4);
//! let qmatrices = FileQMatrixStore::new().with_cohort(grade4, "grade4-qmatrix.txt");
//! let q = qmatrices.load(grade4).unwrap();
//!
//! let log = FileResponseLog::new().with_cohort(grade4, "score4.txt", q.items());
//! let vector: ResponseVector = "1 0 1".parse().unwrap();
//! log.append(grade4, &vector).unwrap();
//! ```

#![warn(missing_docs)]

mod memory;
mod qmatrix;
mod response_log;

pub use memory::InMemoryStore;
pub use qmatrix::FileQMatrixStore;
pub use response_log::FileResponseLog;

use diagnos_domain::traits::StoreFailure;
use diagnos_domain::{CohortId, DiagnosisError};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing cohort, bad shape or non-binary data
    #[error("{0}")]
    Domain(#[from] DiagnosisError),

    /// A writer panicked while holding the cohort lock
    #[error("Lock poisoned for cohort {0}")]
    LockPoisoned(CohortId),
}

impl StoreError {
    /// The domain error, if this is one
    pub fn as_domain(&self) -> Option<&DiagnosisError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn unknown_cohort(kind: &str, cohort: CohortId) -> Self {
        StoreError::Domain(DiagnosisError::NotFound(format!(
            "no {} registered for cohort {}",
            kind, cohort
        )))
    }
}

impl StoreFailure for StoreError {
    fn as_domain(&self) -> Option<&DiagnosisError> {
        StoreError::as_domain(self)
    }
}
