//! Maximum-likelihood skill estimation

use crate::likelihood::{normalize_log_weights, LogTables};
use crate::EngineError;
use diagnos_domain::{
    DiagnosisError, ItemParameters, LatentClassSpace, QMatrix, ResponseMatrix, SkillPattern,
};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Most likely mastery profile for one response vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillEstimate {
    /// Estimated mastery, one entry per skill
    pub pattern: SkillPattern,
    /// Latent class index of `pattern`
    pub class: u32,
    /// `ln P(response | class)` at the maximum
    pub log_likelihood: f64,
}

/// Estimates skill patterns against one calibrated parameter set
///
/// Scans all `2^K` latent classes. When several classes reach the same
/// likelihood, the one with the lowest index wins.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use diagnos_domain::{ItemParameters, QMatrix};
/// use diagnos_engine::SkillEstimator;
///
/// let q = Arc::new(QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap());
/// let params = ItemParameters::uniform(3, 0.1, 0.9);
/// let estimator = SkillEstimator::new(q, params).unwrap();
///
/// let estimate = estimator.estimate(&[1, 0, 0]).unwrap();
/// assert_eq!(estimate.pattern.as_slice(), &[1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct SkillEstimator {
    qmatrix: Arc<QMatrix>,
    parameters: Vec<ItemParameters>,
    tables: LogTables,
    space: LatentClassSpace,
}

impl SkillEstimator {
    /// Create an estimator
    ///
    /// # Errors
    /// - `DimensionMismatch` if there is not one parameter pair per item
    /// - `MalformedData` if a probability lies outside (0, 1)
    pub fn new(qmatrix: Arc<QMatrix>, parameters: Vec<ItemParameters>) -> Result<Self, EngineError> {
        DiagnosisError::check_dimension("item parameters vs Q-matrix items", qmatrix.items(), parameters.len())?;
        for p in &parameters {
            ItemParameters::new(p.guess, p.no_slip)?;
        }
        let space = LatentClassSpace::new(qmatrix.skills())?;
        let tables = LogTables::new(&parameters);
        Ok(Self {
            qmatrix,
            parameters,
            tables,
            space,
        })
    }

    /// Borrow the Q-matrix
    pub fn qmatrix(&self) -> &QMatrix {
        &self.qmatrix
    }

    /// Borrow the item parameters
    pub fn parameters(&self) -> &[ItemParameters] {
        &self.parameters
    }

    /// Most likely skill pattern for a single response vector
    pub fn estimate(&self, response: &[u8]) -> Result<SkillEstimate, EngineError> {
        self.check_response(response)?;

        let mut best_class = 0u32;
        let mut best = f64::NEG_INFINITY;
        for class in self.space.classes() {
            let ll = self.tables.log_likelihood(&self.qmatrix, response, class);
            // strict comparison keeps the lowest class on ties
            if ll > best {
                best = ll;
                best_class = class;
            }
        }

        Ok(SkillEstimate {
            pattern: self.space.pattern(best_class),
            class: best_class,
            log_likelihood: best,
        })
    }

    /// Estimate many students at once; output order matches input order
    pub fn estimate_batch(&self, responses: &ResponseMatrix) -> Result<Vec<SkillEstimate>, EngineError> {
        DiagnosisError::check_dimension("response columns vs Q-matrix items", self.qmatrix.items(), responses.items())?;
        let rows: Vec<&[u8]> = responses.iter_rows().collect();
        rows.par_iter().map(|row| self.estimate(row)).collect()
    }

    /// Posterior probability of every latent class under a uniform prior
    pub fn posterior(&self, response: &[u8]) -> Result<Vec<f64>, EngineError> {
        self.check_response(response)?;
        let mut weights: Vec<f64> = self
            .space
            .classes()
            .map(|class| self.tables.log_likelihood(&self.qmatrix, response, class))
            .collect();
        normalize_log_weights(&mut weights);
        Ok(weights)
    }

    /// Marginal probability that each skill is mastered
    pub fn skill_probabilities(&self, response: &[u8]) -> Result<Vec<f64>, EngineError> {
        let posterior = self.posterior(response)?;
        let skills = self.space.skills();
        let mut marginals = vec![0.0; skills];
        for (class, p) in posterior.iter().enumerate() {
            for (k, m) in marginals.iter_mut().enumerate() {
                if class & (1 << k) != 0 {
                    *m += p;
                }
            }
        }
        Ok(marginals)
    }

    fn check_response(&self, response: &[u8]) -> Result<(), DiagnosisError> {
        DiagnosisError::check_dimension("response vs Q-matrix items", self.qmatrix.items(), response.len())?;
        diagnos_domain::matrix::ensure_binary(response, "response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnos_domain::ResponseVector;

    fn estimator(guess: f64, no_slip: f64) -> SkillEstimator {
        let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
        SkillEstimator::new(Arc::new(q), ItemParameters::uniform(3, guess, no_slip)).unwrap()
    }

    #[test]
    fn test_estimate_patterns() {
        let e = estimator(0.1, 0.9);
        assert_eq!(e.estimate(&[0, 0, 0]).unwrap().pattern.as_slice(), &[0, 0]);
        assert_eq!(e.estimate(&[1, 0, 0]).unwrap().pattern.as_slice(), &[1, 0]);
        assert_eq!(e.estimate(&[0, 1, 0]).unwrap().pattern.as_slice(), &[0, 1]);
        let full = e.estimate(&[1, 1, 1]).unwrap();
        assert_eq!(full.pattern.as_slice(), &[1, 1]);
        assert_eq!(full.class, 0b11);
    }

    #[test]
    fn test_ties_pick_lowest_class() {
        // guess == no_slip makes every class equally likely
        let e = estimator(0.5, 0.5);
        let estimate = e.estimate(&[1, 0, 1]).unwrap();
        assert_eq!(estimate.class, 0);
        assert_eq!(estimate.pattern.as_slice(), &[0, 0]);
    }

    #[test]
    fn test_wrong_length_is_dimension_mismatch() {
        let e = estimator(0.2, 0.8);
        let err = e.estimate(&[1, 0]).unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DiagnosisError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_non_binary_response_rejected() {
        let e = estimator(0.2, 0.8);
        let err = e.estimate(&[1, 2, 0]).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DiagnosisError::MalformedData(_))));
    }

    #[test]
    fn test_parameter_count_checked() {
        let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let err = SkillEstimator::new(Arc::new(q), ItemParameters::uniform(3, 0.2, 0.8)).unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DiagnosisError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_range_parameters_rejected() {
        let q = QMatrix::from_rows(vec![vec![1]]).unwrap();
        let bad = vec![ItemParameters { guess: 0.0, no_slip: 0.8 }];
        assert!(SkillEstimator::new(Arc::new(q), bad).is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let e = estimator(0.1, 0.9);
        let inputs: Vec<ResponseVector> = ["0 0 0", "1 0 0", "0 1 0", "1 1 1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let matrix = ResponseMatrix::from_vectors(3, &inputs).unwrap();
        let batch = e.estimate_batch(&matrix).unwrap();
        let single: Vec<_> = inputs
            .iter()
            .map(|r| e.estimate(r.as_slice()).unwrap())
            .collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn test_posterior_and_marginals() {
        let e = estimator(0.1, 0.9);
        let posterior = e.posterior(&[1, 1, 1]).unwrap();
        assert_eq!(posterior.len(), 4);
        assert!((posterior.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(posterior[3] > 0.9);

        let marginals = e.skill_probabilities(&[1, 1, 1]).unwrap();
        assert_eq!(marginals.len(), 2);
        assert!(marginals.iter().all(|&m| m > 0.9 && m <= 1.0 + 1e-12));
    }
}
