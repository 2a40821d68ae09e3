//! Remedial item selection by Hamming distance

use crate::{EngineError, RemedialConfig};
use diagnos_domain::{hamming_distance, DiagnosisError, QMatrix, SkillPattern};
use serde::Serialize;
use tracing::warn;

/// One recommended item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemedialItem {
    /// Zero-based item index in the Q-matrix
    pub index: usize,
    /// Hamming distance between the item's skill requirements and the pattern
    pub distance: usize,
}

/// Picks the items whose skill requirements are closest to a mastery pattern
///
/// Items are ranked by ascending distance with the item index as tie-breaker,
/// so the selection is deterministic. Asking for more items than exist
/// returns every item and logs a warning.
///
/// # Examples
///
/// ```
/// use diagnos_domain::{QMatrix, SkillPattern};
/// use diagnos_engine::RemedialSelector;
///
/// let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
/// let pattern: SkillPattern = "1 0".parse().unwrap();
///
/// let items = RemedialSelector::new(2).select(&q, &pattern).unwrap();
/// let indices: Vec<usize> = items.iter().map(|i| i.index).collect();
/// assert_eq!(indices, vec![0, 2]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemedialSelector {
    num_remedial: usize,
}

impl Default for RemedialSelector {
    fn default() -> Self {
        Self::from_config(&RemedialConfig::default())
    }
}

impl RemedialSelector {
    /// Selector returning `num_remedial` items by default
    pub fn new(num_remedial: usize) -> Self {
        Self { num_remedial }
    }

    /// Selector configured from a [`RemedialConfig`]
    pub fn from_config(config: &RemedialConfig) -> Self {
        Self::new(config.num_remedial)
    }

    /// Default number of items returned
    pub fn num_remedial(&self) -> usize {
        self.num_remedial
    }

    /// Select the configured number of items
    pub fn select(&self, q: &QMatrix, pattern: &SkillPattern) -> Result<Vec<RemedialItem>, EngineError> {
        self.select_n(q, pattern, self.num_remedial)
    }

    /// Select `n` items
    ///
    /// # Errors
    /// `DimensionMismatch` if the pattern length differs from the skill count.
    pub fn select_n(
        &self,
        q: &QMatrix,
        pattern: &SkillPattern,
        n: usize,
    ) -> Result<Vec<RemedialItem>, EngineError> {
        let mut ranked = rank(q, pattern)?;
        if n > ranked.len() {
            warn!(
                "{}; returning all items",
                DiagnosisError::InsufficientItems {
                    requested: n,
                    available: ranked.len(),
                }
            );
        }
        ranked.truncate(n);
        Ok(ranked)
    }
}

/// Every item with its distance, closest first
fn rank(q: &QMatrix, pattern: &SkillPattern) -> Result<Vec<RemedialItem>, DiagnosisError> {
    DiagnosisError::check_dimension("skill pattern vs Q-matrix skills", q.skills(), pattern.len())?;

    let mut ranked: Vec<RemedialItem> = (0..q.items())
        .map(|index| RemedialItem {
            index,
            distance: hamming_distance(q.row(index), pattern.as_slice()),
        })
        .collect();
    ranked.sort_by_key(|item| (item.distance, item.index));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_q() -> QMatrix {
        QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap()
    }

    fn pattern(text: &str) -> SkillPattern {
        text.parse().unwrap()
    }

    #[test]
    fn test_distances() {
        let ranked = rank(&sample_q(), &pattern("1 0")).unwrap();
        let by_index: Vec<usize> = {
            let mut v = ranked.clone();
            v.sort_by_key(|i| i.index);
            v.iter().map(|i| i.distance).collect()
        };
        assert_eq!(by_index, vec![0, 2, 1]);
    }

    #[test]
    fn test_top_two() {
        let items = RemedialSelector::new(2).select(&sample_q(), &pattern("1 0")).unwrap();
        assert_eq!(
            items,
            vec![
                RemedialItem { index: 0, distance: 0 },
                RemedialItem { index: 2, distance: 1 },
            ]
        );
    }

    #[test]
    fn test_ties_broken_by_index() {
        // Items 0 and 1 are both one skill away from "0 0"
        let items = RemedialSelector::new(3).select(&sample_q(), &pattern("0 0")).unwrap();
        let indices: Vec<usize> = items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_more_than_available_returns_all() {
        let items = RemedialSelector::new(10).select(&sample_q(), &pattern("1 1")).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].index, 2);
    }

    #[test]
    fn test_zero_requested() {
        let items = RemedialSelector::default()
            .select_n(&sample_q(), &pattern("1 1"), 0)
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_pattern_length_checked() {
        let err = RemedialSelector::default()
            .select(&sample_q(), &pattern("1 0 1"))
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DiagnosisError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn test_default_count() {
        assert_eq!(RemedialSelector::default().num_remedial(), 10);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn q_and_pattern() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<u8>)> {
        (1usize..6, 1usize..15).prop_flat_map(|(skills, items)| {
            (
                proptest::collection::vec(proptest::collection::vec(0u8..=1, skills), items),
                proptest::collection::vec(0u8..=1, skills),
            )
        })
    }

    proptest! {
        /// Property: the selection has no duplicates, never exceeds the
        /// item count and is sorted by distance
        #[test]
        fn test_selection_well_formed((rows, bits) in q_and_pattern(), n in 0usize..20) {
            let q = QMatrix::from_rows(rows).unwrap();
            let pattern = SkillPattern::new(bits).unwrap();
            let items = RemedialSelector::default().select_n(&q, &pattern, n).unwrap();

            prop_assert_eq!(items.len(), n.min(q.items()));
            let unique: HashSet<usize> = items.iter().map(|i| i.index).collect();
            prop_assert_eq!(unique.len(), items.len());
            prop_assert!(items.windows(2).all(|w| (w[0].distance, w[0].index) < (w[1].distance, w[1].index)));
        }
    }
}
