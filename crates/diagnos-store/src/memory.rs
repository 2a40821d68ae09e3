//! In-memory store, used by tests and by callers that manage persistence themselves

use crate::StoreError;
use diagnos_domain::traits::{QMatrixStore, ResponseLog};
use diagnos_domain::{CohortId, DiagnosisError, QMatrix, ResponseMatrix, ResponseVector};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Cohort {
    qmatrix: Arc<QMatrix>,
    responses: RwLock<Vec<ResponseVector>>,
}

/// Q-matrices and response logs held in memory
///
/// Nothing survives the process. Each cohort's log width is its
/// Q-matrix item count.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    cohorts: BTreeMap<CohortId, Cohort>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cohort with its Q-matrix and an empty log (builder style)
    pub fn with_cohort(mut self, cohort: CohortId, qmatrix: QMatrix) -> Self {
        self.insert_cohort(cohort, qmatrix);
        self
    }

    /// Register a cohort with its Q-matrix and an empty log
    pub fn insert_cohort(&mut self, cohort: CohortId, qmatrix: QMatrix) {
        self.cohorts.insert(
            cohort,
            Cohort {
                qmatrix: Arc::new(qmatrix),
                responses: RwLock::new(Vec::new()),
            },
        );
    }

    fn cohort(&self, cohort: CohortId) -> Result<&Cohort, StoreError> {
        self.cohorts
            .get(&cohort)
            .ok_or_else(|| StoreError::unknown_cohort("cohort", cohort))
    }
}

impl QMatrixStore for InMemoryStore {
    type Error = StoreError;

    fn load(&self, cohort: CohortId) -> Result<Arc<QMatrix>, Self::Error> {
        Ok(Arc::clone(&self.cohort(cohort)?.qmatrix))
    }

    fn cohorts(&self) -> Vec<CohortId> {
        self.cohorts.keys().copied().collect()
    }
}

impl ResponseLog for InMemoryStore {
    type Error = StoreError;

    fn append(&self, cohort: CohortId, vector: &ResponseVector) -> Result<(), Self::Error> {
        let entry = self.cohort(cohort)?;
        DiagnosisError::check_dimension(
            format!("response vector for cohort {}", cohort),
            entry.qmatrix.items(),
            vector.len(),
        )?;
        entry
            .responses
            .write()
            .map_err(|_| StoreError::LockPoisoned(cohort))?
            .push(vector.clone());
        Ok(())
    }

    fn read_all(&self, cohort: CohortId) -> Result<ResponseMatrix, Self::Error> {
        let entry = self.cohort(cohort)?;
        let responses = entry
            .responses
            .read()
            .map_err(|_| StoreError::LockPoisoned(cohort))?;
        Ok(ResponseMatrix::from_vectors(entry.qmatrix.items(), &responses)?)
    }

    fn row_count(&self, cohort: CohortId) -> Result<usize, Self::Error> {
        let entry = self.cohort(cohort)?;
        let responses = entry
            .responses
            .read()
            .map_err(|_| StoreError::LockPoisoned(cohort))?;
        Ok(responses.len())
    }
}
