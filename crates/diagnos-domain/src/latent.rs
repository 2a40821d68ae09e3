//! Latent class space: every possible skill pattern

use crate::error::DiagnosisError;
use crate::pattern::SkillPattern;
use crate::qmatrix::MAX_SKILLS;
use std::ops::Range;

/// Enumeration of all `2^K` skill patterns for `K` skills
///
/// Class `c` has skill `k` iff bit `k` of `c` is set, so class 0 masters
/// nothing and class `2^K - 1` masters everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatentClassSpace {
    skills: usize,
}

impl LatentClassSpace {
    /// Create the space for `skills` skills
    ///
    /// # Errors
    /// `TooManySkills` above [`MAX_SKILLS`].
    pub fn new(skills: usize) -> Result<Self, DiagnosisError> {
        if skills > MAX_SKILLS {
            return Err(DiagnosisError::TooManySkills {
                skills,
                max: MAX_SKILLS,
            });
        }
        Ok(Self { skills })
    }

    /// Number of skills
    pub fn skills(&self) -> usize {
        self.skills
    }

    /// Number of classes (`2^K`)
    pub fn len(&self) -> usize {
        1usize << self.skills
    }

    /// Always false; even zero skills give one class
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Class indices in ascending order
    pub fn classes(&self) -> Range<u32> {
        0..(1u32 << self.skills)
    }

    /// Pattern of one class
    pub fn pattern(&self, class: u32) -> SkillPattern {
        SkillPattern::from_class(class, self.skills)
    }
}
