//! DINA item parameters

use crate::error::DiagnosisError;
use serde::{Deserialize, Serialize};

/// Lower clamp for calibrated probabilities
pub const MIN_PROBABILITY: f64 = 0.001;

/// Upper clamp for calibrated probabilities
pub const MAX_PROBABILITY: f64 = 0.999;

/// Guess and no-slip probabilities of one item
///
/// - `guess`: P(correct | some required skill missing)
/// - `no_slip`: P(correct | all required skills mastered), i.e. `1 - slip`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParameters {
    /// Probability of a lucky correct answer
    pub guess: f64,
    /// Probability that a master does not slip
    pub no_slip: f64,
}

impl ItemParameters {
    /// Create parameters, requiring both values in the open interval (0, 1)
    ///
    /// # Examples
    ///
    /// ```
    /// use diagnos_domain::ItemParameters;
    ///
    /// let p = ItemParameters::new(0.2, 0.8).unwrap();
    /// assert!((p.slip() - 0.2).abs() < 1e-12);
    /// assert!(ItemParameters::new(0.0, 0.8).is_err());
    /// ```
    pub fn new(guess: f64, no_slip: f64) -> Result<Self, DiagnosisError> {
        for (name, value) in [("guess", guess), ("no_slip", no_slip)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(DiagnosisError::MalformedData(format!(
                    "{} probability {} is outside (0, 1)",
                    name, value
                )));
            }
        }
        Ok(Self { guess, no_slip })
    }

    /// The same value for every item
    pub fn uniform(items: usize, guess: f64, no_slip: f64) -> Vec<Self> {
        vec![Self { guess, no_slip }; items]
    }

    /// Slip probability (`1 - no_slip`)
    pub fn slip(&self) -> f64 {
        1.0 - self.no_slip
    }

    /// Gap between masters and non-masters; near zero means the item tells little
    pub fn discrimination(&self) -> f64 {
        self.no_slip - self.guess
    }

    /// P(correct) for a student whose ideal response is `eta`
    pub fn probability_correct(&self, eta: bool) -> f64 {
        if eta {
            self.no_slip
        } else {
            self.guess
        }
    }

    /// Clamp both probabilities into `[min, max]`
    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self {
            guess: self.guess.clamp(min, max),
            no_slip: self.no_slip.clamp(min, max),
        }
    }
}
