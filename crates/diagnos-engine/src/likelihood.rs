//! Shared DINA likelihood arithmetic
//!
//! All likelihoods are kept in log space: with dozens of items the raw
//! product of per-item probabilities underflows long before `2^K` classes
//! have been compared.

use diagnos_domain::{ItemParameters, QMatrix};

/// Per-item log probabilities, indexed by the ideal response `eta`
#[derive(Debug, Clone)]
pub struct LogTables {
    /// `ln P(correct | eta)`, `[eta = 0, eta = 1]`
    correct: Vec<[f64; 2]>,
    /// `ln P(incorrect | eta)`, `[eta = 0, eta = 1]`
    incorrect: Vec<[f64; 2]>,
}

impl LogTables {
    /// Precompute the log tables for a parameter set
    pub fn new(params: &[ItemParameters]) -> Self {
        let correct = params
            .iter()
            .map(|p| [p.guess.ln(), p.no_slip.ln()])
            .collect();
        let incorrect = params
            .iter()
            .map(|p| [(1.0 - p.guess).ln(), (1.0 - p.no_slip).ln()])
            .collect();
        Self { correct, incorrect }
    }

    /// Number of items covered
    pub fn items(&self) -> usize {
        self.correct.len()
    }

    /// `ln P(response | class)` under the DINA model
    ///
    /// `response` must have one entry per Q-matrix item.
    pub fn log_likelihood(&self, q: &QMatrix, response: &[u8], class: u32) -> f64 {
        q.requirement_masks()
            .iter()
            .zip(response)
            .enumerate()
            .map(|(item, (&mask, &x))| {
                let eta = usize::from(mask & !class == 0);
                if x == 1 {
                    self.correct[item][eta]
                } else {
                    self.incorrect[item][eta]
                }
            })
            .sum()
    }
}

/// `ln(sum(exp(values)))` without overflow
///
/// Returns negative infinity for an empty slice.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Turn log weights into probabilities in place
///
/// Returns the log normalizer (the log of the unnormalized total).
pub fn normalize_log_weights(weights: &mut [f64]) -> f64 {
    let total = log_sum_exp(weights);
    for w in weights.iter_mut() {
        *w = (*w - total).exp();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sum_exp_matches_naive() {
        let values = [0.1f64.ln(), 0.2f64.ln(), 0.7f64.ln()];
        assert!(log_sum_exp(&values).abs() < 1e-12);
    }

    #[test]
    fn test_log_sum_exp_large_magnitudes() {
        let values = [-1000.0, -1000.0];
        let expected = -1000.0 + 2f64.ln();
        assert!((log_sum_exp(&values) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_log_sum_exp_empty() {
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_normalize() {
        let mut w = [2f64.ln(), 6f64.ln()];
        let total = normalize_log_weights(&mut w);
        assert!((total - 8f64.ln()).abs() < 1e-12);
        assert!((w[0] - 0.25).abs() < 1e-12);
        assert!((w[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_log_likelihood_by_hand() {
        let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let params = vec![
            ItemParameters::new(0.2, 0.9).unwrap(),
            ItemParameters::new(0.3, 0.8).unwrap(),
        ];
        let tables = LogTables::new(&params);

        // class 0b01 masters skill 0: item 0 eta=1, item 1 eta=0
        let ll = tables.log_likelihood(&q, &[1, 0], 0b01);
        let expected = 0.9f64.ln() + 0.7f64.ln();
        assert!((ll - expected).abs() < 1e-12);
    }
}
