//! Diagnos Engine
//!
//! Cognitive diagnosis under the DINA model: item calibration, skill-pattern
//! estimation and remedial item selection.
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Calibration**: EM estimation of per-item guess / no-slip probabilities
//! - **Estimation**: maximum-likelihood skill pattern over all `2^K` latent classes
//! - **Remedial selection**: items whose skill requirements are closest to a pattern
//! - **Simulation**: seeded synthetic data for testing and demos
//!
//! # Model
//!
//! Item `i` is answered correctly with probability `no_slip[i]` by a student
//! who masters every skill the item requires (`eta = 1`), and with
//! probability `guess[i]` otherwise.
//!
//! | Component | Input | Output |
//! |-----------|-------|--------|
//! | [`DinaCalibrator`] | Q-matrix, response snapshot | [`CalibrationReport`] |
//! | [`SkillEstimator`] | Q-matrix, parameters, one response | [`SkillEstimate`] |
//! | [`RemedialSelector`] | Q-matrix, skill pattern | ranked [`RemedialItem`]s |
//!
//! # Usage
//!
//! ## Through the service
//!
//! ```no_run
//! use diagnos_domain::CohortId;
//! use diagnos_engine::{DiagnosisService, EngineConfig};
//! use diagnos_store::{FileQMatrixStore, FileResponseLog};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grade4 = CohortId(4);
//! let qmatrices = FileQMatrixStore::new().with_cohort(grade4, "grade4-qmatrix.txt");
//! let log = FileResponseLog::new().with_cohort(grade4, "score4.txt", 42);
//! let service = DiagnosisService::new(qmatrices, log, EngineConfig::default());
//!
//! let responses = "1 0 1 1 0 1 1 1 0 0 1 0 1 1 1 0 1 0 0 1 1 0 1 1 1 0 1 0 1 1 0 0 1 1 0 1 0 1 1 0 1 1".parse()?;
//! let diagnosis = service.diagnose(grade4, &responses)?;
//! let remedial = service.remedial(grade4, &diagnosis.estimate.pattern, None)?;
//! println!("{} remedial items", remedial.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Components directly
//!
//! ```
//! use std::sync::Arc;
//! use diagnos_engine::{simulate, CalibrationConfig, DinaCalibrator, SimulationConfig, SkillEstimator};
//!
//! let data = simulate(&SimulationConfig { items: 10, skills: 3, students: 80, ..Default::default() }).unwrap();
//! let report = DinaCalibrator::new(CalibrationConfig::quick())
//!     .calibrate(&data.qmatrix, &data.responses)
//!     .unwrap();
//!
//! let estimator = SkillEstimator::new(Arc::new(data.qmatrix.clone()), report.parameters).unwrap();
//! let estimate = estimator.estimate(data.responses.row(0)).unwrap();
//! assert_eq!(estimate.pattern.len(), 3);
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [calibration]
//! max_iterations = 100
//! tolerance = 0.0001
//! update_prior = false
//!
//! [remedial]
//! num_remedial = 10
//!
//! [cohorts]
//! default_cohort = 4
//! strict = false
//! ```

#![warn(missing_docs)]

mod calibrator;
mod config;
mod error;
mod estimator;
pub mod likelihood;
mod remedial;
mod report;
mod service;
mod simulate;

pub use calibrator::DinaCalibrator;
pub use config::{CalibrationConfig, CohortPolicy, EngineConfig, RemedialConfig};
pub use error::EngineError;
pub use estimator::{SkillEstimate, SkillEstimator};
pub use remedial::{RemedialItem, RemedialSelector};
pub use report::CalibrationReport;
pub use service::{Diagnosis, DiagnosisService};
pub use simulate::{simulate, SimulatedData, SimulationConfig};
