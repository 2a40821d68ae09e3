//! Configuration for calibration, remedial selection and cohort handling

use diagnos_domain::params::{MAX_PROBABILITY, MIN_PROBABILITY};
use diagnos_domain::CohortId;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Settings for the EM calibrator
///
/// # Examples
///
/// ```
/// use diagnos_engine::CalibrationConfig;
///
/// let config = CalibrationConfig::default();
/// assert_eq!(config.max_iterations, 100);
///
/// let quick = CalibrationConfig::quick();
/// assert!(quick.max_iterations < config.max_iterations);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Hard cap on EM iterations
    /// Default: 100
    pub max_iterations: usize,

    /// Stop when the summed absolute parameter change of one iteration
    /// drops below this value
    /// Default: 1e-4
    pub tolerance: f64,

    /// Lower clamp for guess / no-slip
    /// Default: 0.001
    pub min_probability: f64,

    /// Upper clamp for guess / no-slip
    /// Default: 0.999
    pub max_probability: f64,

    /// Starting guess probability for every item
    /// Default: 0.2
    pub initial_guess: f64,

    /// Starting no-slip probability for every item
    /// Default: 0.8
    pub initial_no_slip: f64,

    /// Re-estimate latent class proportions each M-step instead of keeping
    /// the uniform prior
    /// Default: false
    pub update_prior: bool,

    /// Spread the E-step over the rayon thread pool
    /// Default: true
    pub parallel: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
            min_probability: MIN_PROBABILITY,
            max_probability: MAX_PROBABILITY,
            initial_guess: 0.2,
            initial_no_slip: 0.8,
            update_prior: false,
            parallel: true,
        }
    }
}

impl CalibrationConfig {
    /// Fewer iterations and a looser tolerance, for interactive use
    pub fn quick() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-3,
            ..Self::default()
        }
    }

    /// More iterations and a tight tolerance, for offline calibration
    pub fn thorough() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-6,
            ..Self::default()
        }
    }

    /// Check that the settings describe a runnable calibration
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_iterations == 0 {
            return Err(EngineError::Config("max_iterations must be at least 1".into()));
        }
        if !(self.tolerance >= 0.0) {
            return Err(EngineError::Config(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if !(0.0 < self.min_probability
            && self.min_probability < self.max_probability
            && self.max_probability < 1.0)
        {
            return Err(EngineError::Config(format!(
                "probability bounds must satisfy 0 < min < max < 1, got [{}, {}]",
                self.min_probability, self.max_probability
            )));
        }
        for (name, value) in [
            ("initial_guess", self.initial_guess),
            ("initial_no_slip", self.initial_no_slip),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(EngineError::Config(format!(
                    "{} must lie in (0, 1), got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Settings for remedial item selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemedialConfig {
    /// Items returned when the caller does not ask for a specific count
    /// Default: 10
    pub num_remedial: usize,
}

impl Default for RemedialConfig {
    fn default() -> Self {
        Self { num_remedial: 10 }
    }
}

/// How unknown cohort identifiers are handled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortPolicy {
    /// Cohort used when an unknown one is requested
    /// Default: 4
    pub default_cohort: CohortId,

    /// Reject unknown cohorts with a not-found error instead of falling back
    /// Default: false
    pub strict: bool,
}

impl Default for CohortPolicy {
    fn default() -> Self {
        Self {
            default_cohort: CohortId(4),
            strict: false,
        }
    }
}

/// Complete engine configuration
///
/// Every section may be omitted from a TOML file:
///
/// ```toml
/// [calibration]
/// max_iterations = 100
/// tolerance = 0.0001
///
/// [remedial]
/// num_remedial = 10
///
/// [cohorts]
/// default_cohort = 4
/// strict = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// EM settings
    pub calibration: CalibrationConfig,
    /// Remedial selection settings
    pub remedial: RemedialConfig,
    /// Unknown-cohort policy
    pub cohorts: CohortPolicy,
}

impl EngineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), EngineError> {
        self.calibration.validate()
    }
}
