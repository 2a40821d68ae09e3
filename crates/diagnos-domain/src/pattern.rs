//! Skill-mastery patterns and Hamming distance

use crate::error::DiagnosisError;
use crate::matrix::{ensure_binary, format_row, parse_row};
use crate::qmatrix::MAX_SKILLS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary mastery flag per skill (1 = mastered)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct SkillPattern(Vec<u8>);

impl SkillPattern {
    /// Create a pattern, rejecting non-binary entries
    pub fn new(bits: Vec<u8>) -> Result<Self, DiagnosisError> {
        ensure_binary(&bits, "skill pattern")?;
        Ok(Self(bits))
    }

    /// Expand a latent class index into its pattern
    ///
    /// Skill `k` is mastered iff bit `k` of `class` is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagnos_domain::SkillPattern;
    ///
    /// let p = SkillPattern::from_class(0b101, 3);
    /// assert_eq!(p.as_slice(), &[1, 0, 1]);
    /// assert_eq!(p.to_class().unwrap(), 0b101);
    /// ```
    pub fn from_class(class: u32, skills: usize) -> Self {
        Self((0..skills).map(|k| ((class >> k) & 1) as u8).collect())
    }

    /// Collapse the pattern back into a latent class index
    pub fn to_class(&self) -> Result<u32, DiagnosisError> {
        if self.0.len() > MAX_SKILLS {
            return Err(DiagnosisError::TooManySkills {
                skills: self.0.len(),
                max: MAX_SKILLS,
            });
        }
        Ok(self
            .0
            .iter()
            .enumerate()
            .fold(0u32, |class, (k, &bit)| class | (u32::from(bit) << k)))
    }

    /// Number of skills covered
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length pattern
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the flags
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of mastered skills
    pub fn mastered_count(&self) -> usize {
        self.0.iter().filter(|&&b| b == 1).count()
    }

    /// Indices of skills not yet mastered
    pub fn unmastered(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == 0)
            .map(|(k, _)| k)
            .collect()
    }
}

impl TryFrom<Vec<u8>> for SkillPattern {
    type Error = DiagnosisError;

    fn try_from(bits: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<SkillPattern> for Vec<u8> {
    fn from(pattern: SkillPattern) -> Self {
        pattern.0
    }
}

impl FromStr for SkillPattern {
    type Err = DiagnosisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_row(s, 1)?)
    }
}

impl fmt::Display for SkillPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_row(&self.0))
    }
}

/// Count of positions where two equal-length binary rows differ
///
/// Callers check lengths first; extra trailing entries of the longer
/// slice are ignored.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    debug_assert_eq!(a.len(), b.len(), "hamming distance over unequal lengths");
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let p: SkillPattern = "1 0 1 1".parse().unwrap();
        assert_eq!(p.as_slice(), &[1, 0, 1, 1]);
        assert_eq!(p.to_string(), "1 0 1 1");
        assert_eq!(p.mastered_count(), 3);
        assert_eq!(p.unmastered(), vec![1]);
    }

    #[test]
    fn test_parse_bracketed() {
        let p: SkillPattern = "[0 1]".parse().unwrap();
        assert_eq!(p.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_rejects_non_binary() {
        assert!(SkillPattern::new(vec![0, 2]).is_err());
        assert!("1 -1".parse::<SkillPattern>().is_err());
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(&[1, 0], &[1, 0]), 0);
        assert_eq!(hamming_distance(&[0, 1], &[1, 0]), 2);
        assert_eq!(hamming_distance(&[1, 1], &[1, 0]), 1);
    }

    #[test]
    fn test_serde_rejects_non_binary() {
        let ok: SkillPattern = serde_json::from_str("[1,0,1]").unwrap();
        assert_eq!(ok.len(), 3);
        assert!(serde_json::from_str::<SkillPattern>("[1,7]").is_err());
    }
}
