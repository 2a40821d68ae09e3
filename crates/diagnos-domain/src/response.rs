//! Student response vectors and response-log snapshots

use crate::error::DiagnosisError;
use crate::matrix::{ensure_binary, format_row, parse_row, BinaryMatrix};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One student's graded answers, one entry per item (1 = correct)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ResponseVector(Vec<u8>);

impl ResponseVector {
    /// Create a response vector, rejecting non-binary entries
    pub fn new(values: Vec<u8>) -> Result<Self, DiagnosisError> {
        ensure_binary(&values, "response vector")?;
        Ok(Self(values))
    }

    /// Build from per-item correctness flags
    pub fn from_bools(correct: &[bool]) -> Self {
        Self(correct.iter().map(|&c| u8::from(c)).collect())
    }

    /// Number of items answered
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length vector
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw entries
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of correct answers
    pub fn score(&self) -> usize {
        self.0.iter().filter(|&&v| v == 1).count()
    }
}

impl TryFrom<Vec<u8>> for ResponseVector {
    type Error = DiagnosisError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<ResponseVector> for Vec<u8> {
    fn from(vector: ResponseVector) -> Self {
        vector.0
    }
}

impl FromStr for ResponseVector {
    type Err = DiagnosisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_row(s, 1)?)
    }
}

impl fmt::Display for ResponseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_row(&self.0))
    }
}

/// Immutable snapshot of a response log (students x items)
///
/// Rows keep insertion order; the newest response is the last row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMatrix {
    matrix: BinaryMatrix,
}

impl ResponseMatrix {
    /// Wrap a binary matrix
    pub fn new(matrix: BinaryMatrix) -> Self {
        Self { matrix }
    }

    /// Zero students, `items` columns
    pub fn empty(items: usize) -> Self {
        Self::new(BinaryMatrix::empty(items))
    }

    /// Stack response vectors, all of which must have `items` entries
    pub fn from_vectors(items: usize, vectors: &[ResponseVector]) -> Result<Self, DiagnosisError> {
        let mut matrix = BinaryMatrix::empty(items);
        for vector in vectors {
            matrix.push_row(vector.as_slice())?;
        }
        Ok(Self::new(matrix))
    }

    /// Number of logged students
    pub fn students(&self) -> usize {
        self.matrix.rows()
    }

    /// Number of items per response
    pub fn items(&self) -> usize {
        self.matrix.cols()
    }

    /// True when nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// One student's responses
    pub fn row(&self, student: usize) -> &[u8] {
        self.matrix.row(student)
    }

    /// Iterate over students in insertion order
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.matrix.iter_rows()
    }

    /// Most recently logged response
    pub fn last(&self) -> Option<ResponseVector> {
        match self.students() {
            0 => None,
            n => Some(ResponseVector(self.row(n - 1).to_vec())),
        }
    }

    /// Borrow the underlying matrix
    pub fn as_matrix(&self) -> &BinaryMatrix {
        &self.matrix
    }
}
