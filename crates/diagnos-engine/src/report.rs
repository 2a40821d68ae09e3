//! Calibration results

use diagnos_domain::ItemParameters;
use serde::{Deserialize, Serialize};

/// Outcome of one EM calibration run
///
/// Serializable so a caller can keep a calibration snapshot on disk and
/// estimate against it later without re-running EM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// One `(guess, no_slip)` pair per item, in item order
    pub parameters: Vec<ItemParameters>,

    /// EM iterations performed
    pub iterations: usize,

    /// Whether the tolerance was reached before the iteration cap
    pub converged: bool,

    /// Marginal log-likelihood of the responses at the start of the last iteration
    pub log_likelihood: f64,

    /// Summed absolute parameter change of the last iteration
    pub final_delta: f64,

    /// Students in the calibration sample
    pub students: usize,

    /// Skills in the Q-matrix
    pub skills: usize,
}

impl CalibrationReport {
    /// Number of calibrated items
    pub fn items(&self) -> usize {
        self.parameters.len()
    }

    /// Mean guess probability across items
    pub fn mean_guess(&self) -> f64 {
        mean(self.parameters.iter().map(|p| p.guess))
    }

    /// Mean no-slip probability across items
    pub fn mean_no_slip(&self) -> f64 {
        mean(self.parameters.iter().map(|p| p.no_slip))
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let lines = vec![
            "Calibration Summary".to_string(),
            "===================".to_string(),
            format!("Students:        {}", self.students),
            format!("Items:           {}", self.items()),
            format!("Skills:          {}", self.skills),
            format!(
                "Iterations:      {}{}",
                self.iterations,
                if self.converged { "" } else { " (cap reached)" }
            ),
            format!("Log-likelihood:  {:.4}", self.log_likelihood),
            format!("Final delta:     {:.6}", self.final_delta),
            format!("Mean guess:      {:.4}", self.mean_guess()),
            format!("Mean no-slip:    {:.4}", self.mean_no_slip()),
        ];
        lines.join("\n")
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> CalibrationReport {
        CalibrationReport {
            parameters: vec![
                ItemParameters::new(0.1, 0.9).unwrap(),
                ItemParameters::new(0.3, 0.7).unwrap(),
            ],
            iterations: 12,
            converged: true,
            log_likelihood: -42.5,
            final_delta: 0.00005,
            students: 30,
            skills: 2,
        }
    }

    #[test]
    fn test_means() {
        let r = report();
        assert!((r.mean_guess() - 0.2).abs() < 1e-12);
        assert!((r.mean_no_slip() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_summary_mentions_cap() {
        let mut r = report();
        assert!(!r.summary().contains("cap reached"));
        r.converged = false;
        assert!(r.summary().contains("cap reached"));
    }

    #[test]
    fn test_json_snapshot() {
        let r = report();
        let json = serde_json::to_string(&r).unwrap();
        let back: CalibrationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
