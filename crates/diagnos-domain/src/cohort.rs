//! Cohort identifiers (a grade or exam group)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects which Q-matrix and response log to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortId(pub u32);

impl CohortId {
    /// Raw numeric value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CohortId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for CohortId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for CohortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
