//! End-to-end diagnosis for one cohort

use crate::{
    CalibrationReport, CohortPolicy, DinaCalibrator, EngineConfig, EngineError, RemedialItem,
    RemedialSelector, SkillEstimate, SkillEstimator,
};
use diagnos_domain::traits::{QMatrixStore, ResponseLog, StoreFailure};
use diagnos_domain::{
    CohortId, DiagnosisError, ItemParameters, QMatrix, ResponseMatrix, ResponseVector, SkillPattern,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of diagnosing one student
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    /// Cohort the student was diagnosed in, after fallback
    pub cohort: CohortId,
    /// Most likely skill pattern
    pub estimate: SkillEstimate,
    /// Number of correct answers
    pub score: usize,
    /// Calibration the estimate was made against
    pub calibration: CalibrationReport,
}

/// Wires the Q-matrix store, the response log, calibration, estimation and
/// remedial selection together
///
/// # Examples
///
/// ```
/// use diagnos_domain::{CohortId, QMatrix};
/// use diagnos_engine::{DiagnosisService, EngineConfig};
/// use diagnos_store::InMemoryStore;
/// use std::sync::Arc;
///
/// let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
/// let store = Arc::new(InMemoryStore::new().with_cohort(CohortId(4), q));
/// let service = DiagnosisService::new(store.clone(), store, EngineConfig::default());
///
/// let diagnosis = service.diagnose(CohortId(4), &"1 0 0".parse().unwrap()).unwrap();
/// assert_eq!(diagnosis.estimate.pattern.len(), 2);
/// ```
pub struct DiagnosisService<Q, L>
where
    Q: QMatrixStore,
    L: ResponseLog,
{
    qmatrices: Q,
    log: L,
    calibrator: DinaCalibrator,
    selector: RemedialSelector,
    policy: CohortPolicy,
}

impl<Q, L> DiagnosisService<Q, L>
where
    Q: QMatrixStore,
    L: ResponseLog,
    Q::Error: StoreFailure,
    L::Error: StoreFailure,
{
    /// Create a service over a Q-matrix store and a response log
    pub fn new(qmatrices: Q, log: L, config: EngineConfig) -> Self {
        Self {
            qmatrices,
            log,
            calibrator: DinaCalibrator::new(config.calibration),
            selector: RemedialSelector::from_config(&config.remedial),
            policy: config.cohorts,
        }
    }

    /// Cohorts with a registered Q-matrix
    pub fn cohorts(&self) -> Vec<CohortId> {
        self.qmatrices.cohorts()
    }

    /// Map a requested cohort onto a registered one
    ///
    /// Unknown cohorts fall back to the default cohort unless the policy is
    /// strict, in which case they are `NotFound`.
    pub fn resolve_cohort(&self, requested: CohortId) -> Result<CohortId, EngineError> {
        let known = self.qmatrices.cohorts();
        if known.contains(&requested) {
            return Ok(requested);
        }
        if self.policy.strict {
            return Err(DiagnosisError::NotFound(format!("cohort {}", requested)).into());
        }
        if !known.contains(&self.policy.default_cohort) {
            return Err(DiagnosisError::NotFound(format!(
                "cohort {} (default cohort {} is not registered either)",
                requested, self.policy.default_cohort
            ))
            .into());
        }
        warn!(
            "Unknown cohort {}, falling back to cohort {}",
            requested, self.policy.default_cohort
        );
        Ok(self.policy.default_cohort)
    }

    /// Q-matrix of a cohort, after fallback
    pub fn qmatrix(&self, cohort: CohortId) -> Result<Arc<QMatrix>, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        self.load(cohort)
    }

    /// Append one response vector to the cohort's log
    pub fn append(&self, cohort: CohortId, responses: &ResponseVector) -> Result<CohortId, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        let q = self.load(cohort)?;
        self.append_checked(cohort, &q, responses)?;
        Ok(cohort)
    }

    /// Snapshot of the cohort's response log
    pub fn responses(&self, cohort: CohortId) -> Result<ResponseMatrix, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        self.snapshot(cohort)
    }

    /// Calibrate item parameters on the cohort's current log
    pub fn calibrate(&self, cohort: CohortId) -> Result<CalibrationReport, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        let q = self.load(cohort)?;
        let snapshot = self.snapshot(cohort)?;
        self.calibrator.calibrate(&q, &snapshot)
    }

    /// Log a student's responses, recalibrate and estimate their skills
    ///
    /// The vector is checked against the cohort's item count before
    /// anything is written.
    pub fn diagnose(&self, cohort: CohortId, responses: &ResponseVector) -> Result<Diagnosis, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        let q = self.load(cohort)?;
        self.append_checked(cohort, &q, responses)?;

        let snapshot = self.snapshot(cohort)?;
        let calibration = self.calibrator.calibrate(&q, &snapshot)?;
        let estimator = SkillEstimator::new(q, calibration.parameters.clone())?;
        let estimate = estimator.estimate(responses.as_slice())?;

        info!(
            "Diagnosed cohort {} student: pattern [{}], score {}/{}",
            cohort,
            estimate.pattern,
            responses.score(),
            responses.len()
        );

        Ok(Diagnosis {
            cohort,
            estimate,
            score: responses.score(),
            calibration,
        })
    }

    /// Estimate skills without logging the responses
    ///
    /// Uses `parameters` when given, otherwise calibrates on the current log.
    pub fn estimate(
        &self,
        cohort: CohortId,
        responses: &ResponseVector,
        parameters: Option<Vec<ItemParameters>>,
    ) -> Result<SkillEstimate, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        let q = self.load(cohort)?;
        DiagnosisError::check_dimension("response vs cohort items", q.items(), responses.len())?;

        let parameters = match parameters {
            Some(p) => p,
            None => {
                let snapshot = self.snapshot(cohort)?;
                self.calibrator.calibrate(&q, &snapshot)?.parameters
            }
        };
        SkillEstimator::new(q, parameters)?.estimate(responses.as_slice())
    }

    /// Remedial items for a skill pattern
    ///
    /// `count` overrides the configured number of items.
    pub fn remedial(
        &self,
        cohort: CohortId,
        pattern: &SkillPattern,
        count: Option<usize>,
    ) -> Result<Vec<RemedialItem>, EngineError> {
        let cohort = self.resolve_cohort(cohort)?;
        let q = self.load(cohort)?;
        let n = count.unwrap_or(self.selector.num_remedial());
        self.selector.select_n(&q, pattern, n)
    }

    fn load(&self, cohort: CohortId) -> Result<Arc<QMatrix>, EngineError> {
        self.qmatrices
            .load(cohort)
            .map_err(store_error)
    }

    fn snapshot(&self, cohort: CohortId) -> Result<ResponseMatrix, EngineError> {
        self.log
            .read_all(cohort)
            .map_err(store_error)
    }

    fn append_checked(&self, cohort: CohortId, q: &QMatrix, responses: &ResponseVector) -> Result<(), EngineError> {
        DiagnosisError::check_dimension("response vs cohort items", q.items(), responses.len())?;
        self.log
            .append(cohort, responses)
            .map_err(store_error)
    }
}

/// Keep wrapped domain errors typed; anything else becomes a storage error
fn store_error<E: StoreFailure>(err: E) -> EngineError {
    match err.as_domain() {
        Some(domain) => EngineError::Domain(domain.clone()),
        None => EngineError::Store(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnos_store::InMemoryStore;

    fn service(strict: bool) -> DiagnosisService<Arc<InMemoryStore>, Arc<InMemoryStore>> {
        let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
        let store = Arc::new(InMemoryStore::new().with_cohort(CohortId(4), q));
        let config = EngineConfig {
            cohorts: CohortPolicy {
                default_cohort: CohortId(4),
                strict,
            },
            ..EngineConfig::default()
        };
        DiagnosisService::new(store.clone(), store, config)
    }

    fn vector(text: &str) -> ResponseVector {
        text.parse().unwrap()
    }

    #[test]
    fn test_unknown_cohort_falls_back() {
        let s = service(false);
        assert_eq!(s.resolve_cohort(CohortId(7)).unwrap(), CohortId(4));
        assert_eq!(s.resolve_cohort(CohortId(4)).unwrap(), CohortId(4));
    }

    #[test]
    fn test_strict_cohort_is_not_found() {
        let s = service(true);
        let err = s.resolve_cohort(CohortId(7)).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DiagnosisError::NotFound(_))));
    }

    #[test]
    fn test_diagnose_appends_and_estimates() {
        let s = service(false);
        let d = s.diagnose(CohortId(4), &vector("1 1 1")).unwrap();
        assert_eq!(d.cohort, CohortId(4));
        assert_eq!(d.score, 3);
        assert_eq!(d.calibration.students, 1);
        assert_eq!(s.responses(CohortId(4)).unwrap().students(), 1);
    }

    #[test]
    fn test_diagnose_wrong_length_writes_nothing() {
        let s = service(false);
        let err = s.diagnose(CohortId(4), &vector("1 0")).unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DiagnosisError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
        assert!(s.responses(CohortId(4)).unwrap().is_empty());
    }

    #[test]
    fn test_calibrate_empty_log() {
        let s = service(false);
        let err = s.calibrate(CohortId(4)).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DiagnosisError::InsufficientData(_))));
    }

    #[test]
    fn test_estimate_with_given_parameters_does_not_log() {
        let s = service(false);
        let params = ItemParameters::uniform(3, 0.1, 0.9);
        let e = s.estimate(CohortId(4), &vector("1 0 0"), Some(params)).unwrap();
        assert_eq!(e.pattern.as_slice(), &[1, 0]);
        assert!(s.responses(CohortId(4)).unwrap().is_empty());
    }

    struct FlakyDisk;

    impl std::fmt::Display for FlakyDisk {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk unavailable")
        }
    }

    impl StoreFailure for FlakyDisk {
        fn as_domain(&self) -> Option<&DiagnosisError> {
            None
        }
    }

    #[test]
    fn test_store_error_mapping() {
        let err = store_error(DiagnosisError::MalformedData("line 2".to_string()));
        assert!(matches!(err.as_domain(), Some(DiagnosisError::MalformedData(_))));

        let err = store_error(FlakyDisk);
        assert!(matches!(err, EngineError::Store(ref msg) if msg == "disk unavailable"));
    }

    #[test]
    fn test_remedial_count_override() {
        let s = service(false);
        let pattern: SkillPattern = "1 0".parse().unwrap();
        let items = s.remedial(CohortId(4), &pattern, Some(2)).unwrap();
        let indices: Vec<usize> = items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(s.remedial(CohortId(4), &pattern, None).unwrap().len(), 3);
    }
}
