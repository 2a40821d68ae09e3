//! Q-matrix: which skills each item requires

use crate::error::DiagnosisError;
use crate::matrix::BinaryMatrix;

/// Largest skill count the engine will enumerate (`2^20` latent classes)
pub const MAX_SKILLS: usize = 20;

/// Immutable items x skills requirement matrix
///
/// Each item's requirement row is also kept as a bitmask (bit `k` set when
/// skill `k` is required), matching the bit order of latent class indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QMatrix {
    matrix: BinaryMatrix,
    masks: Vec<u32>,
}

impl QMatrix {
    /// Wrap a validated binary matrix
    ///
    /// # Errors
    /// `MalformedData` if there are no items or no skills,
    /// `TooManySkills` if the skill count exceeds [`MAX_SKILLS`].
    pub fn new(matrix: BinaryMatrix) -> Result<Self, DiagnosisError> {
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Err(DiagnosisError::MalformedData(format!(
                "Q-matrix must have at least one item and one skill, got {}x{}",
                matrix.rows(),
                matrix.cols()
            )));
        }
        if matrix.cols() > MAX_SKILLS {
            return Err(DiagnosisError::TooManySkills {
                skills: matrix.cols(),
                max: MAX_SKILLS,
            });
        }

        let masks = matrix
            .iter_rows()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| **v == 1)
                    .fold(0u32, |mask, (k, _)| mask | (1 << k))
            })
            .collect();

        Ok(Self { matrix, masks })
    }

    /// Build from nested rows (one row per item)
    ///
    /// # Examples
    ///
    /// ```
    /// use diagnos_domain::QMatrix;
    ///
    /// let q = QMatrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
    /// assert_eq!(q.items(), 3);
    /// assert_eq!(q.skills(), 2);
    /// assert_eq!(q.requirement_mask(2), 0b11);
    /// ```
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, DiagnosisError> {
        Self::new(BinaryMatrix::from_rows(rows)?)
    }

    /// Parse the whitespace-delimited text format (items x skills)
    pub fn parse(text: &str) -> Result<Self, DiagnosisError> {
        Self::new(BinaryMatrix::parse(text)?)
    }

    /// Number of items
    pub fn items(&self) -> usize {
        self.matrix.rows()
    }

    /// Number of skills
    pub fn skills(&self) -> usize {
        self.matrix.cols()
    }

    /// Requirement row of one item
    pub fn row(&self, item: usize) -> &[u8] {
        self.matrix.row(item)
    }

    /// Requirement bitmask of one item
    pub fn requirement_mask(&self, item: usize) -> u32 {
        self.masks[item]
    }

    /// All requirement bitmasks in item order
    pub fn requirement_masks(&self) -> &[u32] {
        &self.masks
    }

    /// DINA ideal response: does `class` have every skill `item` requires?
    pub fn eta(&self, item: usize, class: u32) -> bool {
        self.masks[item] & !class == 0
    }

    /// Borrow the underlying matrix
    pub fn as_matrix(&self) -> &BinaryMatrix {
        &self.matrix
    }
}
