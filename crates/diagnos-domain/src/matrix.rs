//! Dense binary matrices and their text format
//!
//! Q-matrices and response logs are stored as whitespace-delimited integer
//! matrices, one row per line. Blank lines are ignored when parsing; rows
//! are written with single spaces between values.

use crate::error::DiagnosisError;
use serde::{Deserialize, Serialize};

/// Row-major matrix whose entries are all 0 or 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct BinaryMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

/// Unchecked serialized form of [`BinaryMatrix`]
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl TryFrom<RawMatrix> for BinaryMatrix {
    type Error = DiagnosisError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let expected = raw.rows.checked_mul(raw.cols).ok_or_else(|| {
            DiagnosisError::MalformedData(format!("{} x {} matrix is too large", raw.rows, raw.cols))
        })?;
        DiagnosisError::check_dimension("matrix data length", expected, raw.data.len())?;
        ensure_binary(&raw.data, "matrix data")?;
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl BinaryMatrix {
    /// A matrix with zero rows and the given column count
    pub fn empty(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    /// Build from nested rows
    ///
    /// # Errors
    /// `MalformedData` for an entry other than 0/1, `DimensionMismatch` for ragged rows.
    /// An empty row list yields an empty matrix with zero columns.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, DiagnosisError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut matrix = Self::empty(cols);
        for row in &rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    /// Parse the text format, taking the column count from the first row
    ///
    /// # Examples
    ///
    /// ```
    /// use diagnos_domain::BinaryMatrix;
    ///
    /// let m = BinaryMatrix::parse("1 0\n0 1\n\n1 1\n").unwrap();
    /// assert_eq!(m.rows(), 3);
    /// assert_eq!(m.row(2), &[1, 1]);
    /// ```
    pub fn parse(text: &str) -> Result<Self, DiagnosisError> {
        let mut matrix: Option<Self> = None;
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = parse_row(line, line_no + 1)?;
            let m = matrix.get_or_insert_with(|| Self::empty(row.len()));
            m.push_row_at(&row, line_no + 1)?;
        }
        Ok(matrix.unwrap_or_else(|| Self::empty(0)))
    }

    /// Parse the text format, requiring every row to have `cols` entries
    ///
    /// Text with no rows yields a zero-row matrix with `cols` columns.
    pub fn parse_with_width(text: &str, cols: usize) -> Result<Self, DiagnosisError> {
        let mut matrix = Self::empty(cols);
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = parse_row(line, line_no + 1)?;
            matrix.push_row_at(&row, line_no + 1)?;
        }
        Ok(matrix)
    }

    /// Append a row
    pub fn push_row(&mut self, row: &[u8]) -> Result<(), DiagnosisError> {
        let line = self.rows + 1;
        self.push_row_at(row, line)
    }

    fn push_row_at(&mut self, row: &[u8], line: usize) -> Result<(), DiagnosisError> {
        DiagnosisError::check_dimension(format!("row {}", line), self.cols, row.len())?;
        ensure_binary(row, &format!("row {}", line))?;
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Entry at `(row, col)`
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(col < self.cols, "column {} out of bounds", col);
        self.data[row * self.cols + col]
    }

    /// Borrow one row
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate over rows in order
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        (0..self.rows).map(move |r| self.row(r))
    }

    /// Render in the text format, one line per row with a trailing newline
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in self.iter_rows() {
            out.push_str(&format_row(row));
            out.push('\n');
        }
        out
    }
}

/// Render one row as space-separated digits
pub fn format_row(row: &[u8]) -> String {
    row.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse one whitespace-delimited row of 0/1 integers
///
/// Surrounding square brackets are tolerated so that printed arrays such as
/// `[1 0 1]` are accepted.
pub fn parse_row(line: &str, line_no: usize) -> Result<Vec<u8>, DiagnosisError> {
    let trimmed = line.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .split_whitespace()
        .map(|token| match token.parse::<i64>() {
            Ok(0) => Ok(0),
            Ok(1) => Ok(1),
            Ok(other) => Err(DiagnosisError::MalformedData(format!(
                "line {}: value {} is not binary",
                line_no, other
            ))),
            Err(_) => Err(DiagnosisError::MalformedData(format!(
                "line {}: '{}' is not an integer",
                line_no, token
            ))),
        })
        .collect()
}

/// Fail with `MalformedData` if any entry is not 0 or 1
pub fn ensure_binary(values: &[u8], context: &str) -> Result<(), DiagnosisError> {
    match values.iter().position(|&v| v > 1) {
        Some(pos) => Err(DiagnosisError::MalformedData(format!(
            "{}: entry {} has non-binary value {}",
            context, pos, values[pos]
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rejects_inconsistent_shape() {
        let err = serde_json::from_str::<BinaryMatrix>(r#"{"rows":2,"cols":3,"data":[1]}"#).unwrap_err();
        assert!(err.to_string().contains("Dimension mismatch"));
    }

    #[test]
    fn test_deserialize_rejects_non_binary() {
        let err = serde_json::from_str::<BinaryMatrix>(r#"{"rows":1,"cols":2,"data":[1,9]}"#).unwrap_err();
        assert!(err.to_string().contains("non-binary"));
    }

    #[test]
    fn test_serde_keeps_valid_matrix() {
        let m = BinaryMatrix::parse("1 0\n0 1\n").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<BinaryMatrix>(&json).unwrap(), m);
    }

    #[test]
    fn test_parse_basic() {
        let m = BinaryMatrix::parse("1 0 1\n0 0 1\n").unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(1, 2), 1);
        assert_eq!(m.row(0), &[1, 0, 1]);
    }

    #[test]
    fn test_parse_tolerates_tabs_and_blank_lines() {
        let m = BinaryMatrix::parse("\n1\t0\n\n  0   1  \n").unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(1), &[0, 1]);
    }

    #[test]
    fn test_parse_rejects_non_binary() {
        let err = BinaryMatrix::parse("1 0\n2 1\n").unwrap_err();
        assert!(matches!(err, DiagnosisError::MalformedData(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_rejects_garbage_token() {
        let err = BinaryMatrix::parse("1 x\n").unwrap_err();
        assert!(matches!(err, DiagnosisError::MalformedData(_)));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = BinaryMatrix::parse("1 0 1\n0 1\n").unwrap_err();
        assert!(matches!(
            err,
            DiagnosisError::DimensionMismatch { expected: 3, actual: 2, .. }
        ));
    }

    #[test]
    fn test_parse_with_width_empty_text() {
        let m = BinaryMatrix::parse_with_width("", 6).unwrap();
        assert_eq!(m.rows(), 0);
        assert_eq!(m.cols(), 6);
        assert!(m.is_empty());
    }

    #[test]
    fn test_parse_with_width_enforces_width() {
        let err = BinaryMatrix::parse_with_width("1 0 1 0 1\n", 6).unwrap_err();
        assert!(matches!(
            err,
            DiagnosisError::DimensionMismatch { expected: 6, actual: 5, .. }
        ));
    }

    #[test]
    fn test_bracketed_row() {
        assert_eq!(parse_row("[1 0 1]", 1).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_to_text() {
        let m = BinaryMatrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        assert_eq!(m.to_text(), "1 0\n0 1\n");
        assert_eq!(BinaryMatrix::parse(&m.to_text()).unwrap(), m);
    }

    #[test]
    fn test_from_rows_rejects_non_binary() {
        let err = BinaryMatrix::from_rows(vec![vec![1, 3]]).unwrap_err();
        assert!(matches!(err, DiagnosisError::MalformedData(_)));
    }
}
