//! DINA item calibration by Expectation-Maximization

use crate::likelihood::{normalize_log_weights, LogTables};
use crate::{CalibrationConfig, CalibrationReport, EngineError};
use diagnos_domain::{DiagnosisError, ItemParameters, LatentClassSpace, QMatrix, ResponseMatrix};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Students handled per parallel batch; bounds the posterior buffers to
/// `STUDENT_CHUNK x 2^K` floats
const STUDENT_CHUNK: usize = 64;

/// Smallest class proportion kept when the prior is re-estimated
const PRIOR_FLOOR: f64 = 1e-10;

/// Below this responsibility mass a group is treated as empty and the
/// item keeps its previous value
const MIN_GROUP_MASS: f64 = 1e-12;

/// What one student contributes to the M-step
struct StudentStats {
    /// Posterior mass on classes that master each item (`eta = 1`)
    eta_mass: Vec<f64>,
    /// Full class posterior, only kept when the prior is re-estimated
    posterior: Option<Vec<f64>>,
    /// `ln P(responses)` under the current parameters
    log_likelihood: f64,
}

/// Responsibility-weighted counts per item
struct Accumulator {
    mass: [Vec<f64>; 2],
    correct: [Vec<f64>; 2],
    class_mass: Option<Vec<f64>>,
    log_likelihood: f64,
}

impl Accumulator {
    fn new(items: usize, classes: usize, track_classes: bool) -> Self {
        Self {
            mass: [vec![0.0; items], vec![0.0; items]],
            correct: [vec![0.0; items], vec![0.0; items]],
            class_mass: track_classes.then(|| vec![0.0; classes]),
            log_likelihood: 0.0,
        }
    }

    fn add(&mut self, response: &[u8], stats: StudentStats) {
        for (item, (&x, &m1)) in response.iter().zip(&stats.eta_mass).enumerate() {
            let m0 = (1.0 - m1).max(0.0);
            self.mass[0][item] += m0;
            self.mass[1][item] += m1;
            if x == 1 {
                self.correct[0][item] += m0;
                self.correct[1][item] += m1;
            }
        }
        if let (Some(total), Some(posterior)) = (self.class_mass.as_mut(), stats.posterior) {
            for (t, p) in total.iter_mut().zip(posterior) {
                *t += p;
            }
        }
        self.log_likelihood += stats.log_likelihood;
    }
}

/// Estimates DINA guess / no-slip parameters from a response sample
///
/// Calibration is a pure function of the Q-matrix, a response snapshot
/// and the configuration; it holds no state between runs.
///
/// # Examples
///
/// ```
/// use diagnos_domain::{QMatrix, ResponseMatrix, BinaryMatrix};
/// use diagnos_engine::{CalibrationConfig, DinaCalibrator};
///
/// let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
/// let responses = ResponseMatrix::new(
///     BinaryMatrix::from_rows(vec![vec![1, 0, 0], vec![1, 1, 1], vec![0, 0, 0]]).unwrap(),
/// );
///
/// let calibrator = DinaCalibrator::new(CalibrationConfig::default());
/// let report = calibrator.calibrate(&q, &responses).unwrap();
/// assert_eq!(report.parameters.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DinaCalibrator {
    config: CalibrationConfig,
}

impl DinaCalibrator {
    /// Create a calibrator with the given configuration
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Borrow the configuration
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Run EM until the parameters settle or the iteration cap is hit
    ///
    /// # Errors
    /// - `DimensionMismatch` if the responses do not have one column per item
    /// - `InsufficientData` if there are no responses
    /// - `Config` if the configuration is invalid
    pub fn calibrate(
        &self,
        q: &QMatrix,
        responses: &ResponseMatrix,
    ) -> Result<CalibrationReport, EngineError> {
        self.config.validate()?;
        DiagnosisError::check_dimension("response columns vs Q-matrix items", q.items(), responses.items())?;
        if responses.is_empty() {
            return Err(DiagnosisError::InsufficientData(
                "calibration needs at least one logged response".into(),
            )
            .into());
        }

        let space = LatentClassSpace::new(q.skills())?;
        let classes = space.len();
        let lo = self.config.min_probability;
        let hi = self.config.max_probability;

        let mut params: Vec<ItemParameters> = ItemParameters::uniform(
            q.items(),
            self.config.initial_guess,
            self.config.initial_no_slip,
        )
        .into_iter()
        .map(|p| p.clamped(lo, hi))
        .collect();
        let mut log_prior = vec![-(classes as f64).ln(); classes];

        let rows: Vec<&[u8]> = responses.iter_rows().collect();
        let mut iterations = 0;
        let mut converged = false;
        let mut delta = f64::INFINITY;
        let mut log_likelihood = f64::NEG_INFINITY;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let acc = self.expectation(q, &rows, &params, &log_prior, classes);
            log_likelihood = acc.log_likelihood;

            let updated = maximize(&acc, &params, lo, hi);
            delta = updated
                .iter()
                .zip(&params)
                .map(|(new, old)| (new.guess - old.guess).abs() + (new.no_slip - old.no_slip).abs())
                .sum();
            params = updated;

            if let Some(class_mass) = &acc.class_mass {
                log_prior = reestimate_prior(class_mass, rows.len());
            }

            debug!(
                "EM iteration {}: log-likelihood {:.4}, parameter change {:.6}",
                iterations, log_likelihood, delta
            );

            if delta < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            info!(
                "Calibration converged after {} iterations ({} students, {} items, {} skills)",
                iterations,
                rows.len(),
                q.items(),
                q.skills()
            );
        } else {
            warn!(
                "Calibration stopped at the {}-iteration cap with parameter change {:.6}",
                iterations, delta
            );
        }

        Ok(CalibrationReport {
            parameters: params,
            iterations,
            converged,
            log_likelihood,
            final_delta: delta,
            students: rows.len(),
            skills: q.skills(),
        })
    }

    /// E-step: posterior over classes per student, folded into item counts
    ///
    /// Students are processed in fixed-size chunks; within a chunk the
    /// posteriors may be computed in parallel, but they are always summed
    /// in student order so both paths give identical results.
    fn expectation(
        &self,
        q: &QMatrix,
        rows: &[&[u8]],
        params: &[ItemParameters],
        log_prior: &[f64],
        classes: usize,
    ) -> Accumulator {
        let tables = LogTables::new(params);
        let keep_posterior = self.config.update_prior;
        let mut acc = Accumulator::new(q.items(), classes, keep_posterior);

        let student = |response: &&[u8]| student_stats(q, &tables, log_prior, response, keep_posterior);

        for chunk in rows.chunks(STUDENT_CHUNK) {
            let stats: Vec<StudentStats> = if self.config.parallel {
                chunk.par_iter().map(student).collect()
            } else {
                chunk.iter().map(student).collect()
            };
            for (response, s) in chunk.iter().zip(stats) {
                acc.add(response, s);
            }
        }
        acc
    }
}

/// Posterior for one student and its per-item `eta = 1` mass
fn student_stats(
    q: &QMatrix,
    tables: &LogTables,
    log_prior: &[f64],
    response: &[u8],
    keep_posterior: bool,
) -> StudentStats {
    let mut posterior: Vec<f64> = log_prior
        .iter()
        .enumerate()
        .map(|(class, lp)| lp + tables.log_likelihood(q, response, class as u32))
        .collect();
    let log_likelihood = normalize_log_weights(&mut posterior);

    let eta_mass = q
        .requirement_masks()
        .iter()
        .map(|&mask| {
            posterior
                .iter()
                .enumerate()
                .filter(|(class, _)| mask & !(*class as u32) == 0)
                .map(|(_, p)| p)
                .sum::<f64>()
                .min(1.0)
        })
        .collect();

    StudentStats {
        eta_mass,
        posterior: keep_posterior.then_some(posterior),
        log_likelihood,
    }
}

/// M-step: weighted fraction correct per `eta` group, clamped
fn maximize(acc: &Accumulator, previous: &[ItemParameters], lo: f64, hi: f64) -> Vec<ItemParameters> {
    previous
        .iter()
        .enumerate()
        .map(|(item, old)| {
            let rate = |eta: usize, fallback: f64| {
                let mass = acc.mass[eta][item];
                if mass > MIN_GROUP_MASS {
                    acc.correct[eta][item] / mass
                } else {
                    fallback
                }
            };
            ItemParameters {
                guess: rate(0, old.guess),
                no_slip: rate(1, old.no_slip),
            }
            .clamped(lo, hi)
        })
        .collect()
}

/// Mean responsibility per class, floored and renormalized, in log space
fn reestimate_prior(class_mass: &[f64], students: usize) -> Vec<f64> {
    let floored: Vec<f64> = class_mass
        .iter()
        .map(|m| (m / students as f64).max(PRIOR_FLOOR))
        .collect();
    let total: f64 = floored.iter().sum();
    floored.iter().map(|p| (p / total).ln()).collect()
}
