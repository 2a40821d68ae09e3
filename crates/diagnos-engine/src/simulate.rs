//! Seeded synthetic data under the DINA model
//!
//! Item parameters follow four-parameter beta draws: guess from `Beta(1, 2)`
//! scaled to `[0, 0.6]`, no-slip from `Beta(2, 1)` scaled to `[0.4, 1]`.

use crate::EngineError;
use diagnos_domain::params::{MAX_PROBABILITY, MIN_PROBABILITY};
use diagnos_domain::{BinaryMatrix, ItemParameters, QMatrix, ResponseMatrix, SkillPattern, MAX_SKILLS};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Shape and seed of a synthetic data set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of items
    /// Default: 42
    pub items: usize,

    /// Number of skills
    /// Default: 15
    pub skills: usize,

    /// Number of simulated students
    /// Default: 500
    pub students: usize,

    /// RNG seed; the same seed always yields the same data
    /// Default: 42
    pub seed: u64,

    /// Probability that a student masters any given skill
    /// Default: 0.7
    pub mastery_rate: f64,

    /// Probability that an item requires any given skill
    /// Default: 0.5
    pub requirement_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            items: 42,
            skills: 15,
            students: 500,
            seed: 42,
            mastery_rate: 0.7,
            requirement_rate: 0.5,
        }
    }
}

impl SimulationConfig {
    /// Check that the settings describe a valid data set
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.items == 0 || self.skills == 0 {
            return Err(EngineError::Config(
                "simulation needs at least one item and one skill".into(),
            ));
        }
        if self.skills > MAX_SKILLS {
            return Err(EngineError::Config(format!(
                "simulation supports at most {} skills, got {}",
                MAX_SKILLS, self.skills
            )));
        }
        for (name, rate) in [
            ("mastery_rate", self.mastery_rate),
            ("requirement_rate", self.requirement_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(EngineError::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, rate
                )));
            }
        }
        Ok(())
    }
}

/// A synthetic data set together with the truth it was drawn from
#[derive(Debug, Clone)]
pub struct SimulatedData {
    /// Generated Q-matrix; every item requires at least one skill
    pub qmatrix: QMatrix,
    /// True item parameters
    pub parameters: Vec<ItemParameters>,
    /// True skill pattern of each student
    pub profiles: Vec<SkillPattern>,
    /// Observed responses, one row per student
    pub responses: ResponseMatrix,
}

/// Draw a data set
pub fn simulate(config: &SimulationConfig) -> Result<SimulatedData, EngineError> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let guess_dist = beta(1.0, 2.0)?;
    let no_slip_dist = beta(2.0, 1.0)?;

    let mut q_rows = Vec::with_capacity(config.items);
    for _ in 0..config.items {
        let mut row: Vec<u8> = (0..config.skills)
            .map(|_| u8::from(rng.gen_bool(config.requirement_rate)))
            .collect();
        if row.iter().all(|&v| v == 0) {
            let k = rng.gen_range(0..config.skills);
            row[k] = 1;
        }
        q_rows.push(row);
    }
    let qmatrix = QMatrix::from_rows(q_rows)?;

    let parameters: Vec<ItemParameters> = (0..config.items)
        .map(|_| {
            ItemParameters {
                guess: 0.6 * guess_dist.sample(&mut rng),
                no_slip: 0.4 + 0.6 * no_slip_dist.sample(&mut rng),
            }
            .clamped(MIN_PROBABILITY, MAX_PROBABILITY)
        })
        .collect();

    let mut profiles = Vec::with_capacity(config.students);
    let mut responses = BinaryMatrix::empty(config.items);
    for _ in 0..config.students {
        let bits: Vec<u8> = (0..config.skills)
            .map(|_| u8::from(rng.gen_bool(config.mastery_rate)))
            .collect();
        let pattern = SkillPattern::new(bits)?;
        let class = pattern.to_class()?;

        let row: Vec<u8> = parameters
            .iter()
            .enumerate()
            .map(|(item, p)| {
                let eta = qmatrix.eta(item, class);
                u8::from(rng.gen_bool(p.probability_correct(eta)))
            })
            .collect();
        responses.push_row(&row)?;
        profiles.push(pattern);
    }

    info!(
        "Simulated {} students on {} items and {} skills (seed {})",
        config.students, config.items, config.skills, config.seed
    );

    Ok(SimulatedData {
        qmatrix,
        parameters,
        profiles,
        responses: ResponseMatrix::new(responses),
    })
}

fn beta(alpha: f64, beta: f64) -> Result<Beta<f64>, EngineError> {
    Beta::new(alpha, beta).map_err(|e| EngineError::Config(format!("beta distribution: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationConfig {
        SimulationConfig {
            items: 12,
            skills: 3,
            students: 50,
            seed: 7,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_shapes() {
        let data = simulate(&small()).unwrap();
        assert_eq!(data.qmatrix.items(), 12);
        assert_eq!(data.qmatrix.skills(), 3);
        assert_eq!(data.parameters.len(), 12);
        assert_eq!(data.profiles.len(), 50);
        assert_eq!(data.responses.students(), 50);
        assert_eq!(data.responses.items(), 12);
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = simulate(&small()).unwrap();
        let b = simulate(&small()).unwrap();
        assert_eq!(a.responses, b.responses);
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.qmatrix, b.qmatrix);
    }

    #[test]
    fn test_every_item_requires_a_skill() {
        let config = SimulationConfig {
            requirement_rate: 0.0,
            ..small()
        };
        let data = simulate(&config).unwrap();
        assert!((0..data.qmatrix.items()).all(|i| data.qmatrix.requirement_mask(i) != 0));
    }

    #[test]
    fn test_parameter_ranges() {
        let data = simulate(&SimulationConfig::default()).unwrap();
        for p in &data.parameters {
            assert!(p.guess >= MIN_PROBABILITY && p.guess <= 0.6);
            assert!(p.no_slip >= 0.4 && p.no_slip <= MAX_PROBABILITY);
        }
    }

    #[test]
    fn test_invalid_config() {
        let config = SimulationConfig {
            skills: 21,
            ..small()
        };
        assert!(matches!(simulate(&config), Err(EngineError::Config(_))));
    }
}
