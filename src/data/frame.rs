//! Dense table with named columns.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::preprocessing::error::{PreprocessingError, Result};

/// A dense numeric table whose columns carry unique names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameParts")]
pub struct Frame {
    columns: Vec<String>,
    values: Array2<f64>,
}

#[derive(Deserialize)]
struct FrameParts {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl TryFrom<FrameParts> for Frame {
    type Error = PreprocessingError;

    fn try_from(parts: FrameParts) -> Result<Self> {
        Frame::new(parts.columns, parts.values)
    }
}

impl Frame {
    /// Create a frame, checking that every column has a unique name.
    pub fn new<S: Into<String>>(columns: Vec<S>, values: Array2<f64>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        if columns.len() != values.ncols() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} columns", columns.len()),
                got: format!("{} columns", values.ncols()),
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(PreprocessingError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self { columns, values })
    }

    /// Read a CSV file with a header row. Empty cells and `NaN` become NaN.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Read headed CSV from any reader. Empty cells and `NaN` become NaN.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut flat = Vec::new();
        let mut n_rows = 0;

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for (col, field) in record.iter().enumerate() {
                flat.push(parse_cell(field).ok_or_else(|| {
                    PreprocessingError::CsvError(format!(
                        "row {}, column '{}': cannot parse '{}' as a number",
                        row + 1,
                        columns[col],
                        field
                    ))
                })?);
            }
            n_rows += 1;
        }

        let values = Array2::from_shape_vec((n_rows, columns.len()), flat).map_err(|e| {
            PreprocessingError::InvalidShape {
                expected: format!("({}, {})", n_rows, columns.len()),
                got: e.to_string(),
            }
        })?;
        Self::new(columns, values)
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The numeric block.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Split into names and numeric block.
    pub fn into_parts(self) -> (Vec<String>, Array2<f64>) {
        (self.columns, self.values)
    }

    /// `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Position of a named column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// View of a named column.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.position(name).map(|i| self.values.column(i))
    }

    /// New frame holding only the columns at `indices`, in that order.
    pub(crate) fn select(&self, indices: &[usize]) -> Frame {
        Frame {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            values: self.values.select(Axis(1), indices),
        }
    }

    /// Replace the numeric block, keeping the column names.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Result<Frame> {
        Frame::new(self.columns.clone(), values)
    }
}

fn parse_cell(field: &str) -> Option<f64> {
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    field.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_checks_width() {
        let result = Frame::new(vec!["a"], array![[1.0, 2.0]]);
        assert!(matches!(result, Err(PreprocessingError::InvalidShape { .. })));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = Frame::new(vec!["a", "a"], array![[1.0, 2.0]]);
        assert!(matches!(result, Err(PreprocessingError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn test_deserialize_validates() {
        let good = Frame::new(vec!["a", "b"], array![[1.0, 2.0]]).unwrap();
        let json = serde_json::to_string(&good).unwrap();
        assert_eq!(serde_json::from_str::<Frame>(&json).unwrap(), good);

        let duplicated = json.replace("\"b\"", "\"a\"");
        assert!(serde_json::from_str::<Frame>(&duplicated).is_err());
    }

    #[test]
    fn test_column_lookup() {
        let frame = Frame::new(vec!["a", "b"], array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(frame.position("b"), Some(1));
        assert_eq!(frame.column("a").unwrap().to_vec(), vec![1.0, 3.0]);
        assert!(frame.column("z").is_none());
    }

    #[test]
    fn test_select() {
        let frame = Frame::new(vec!["a", "b", "c"], array![[1.0, 2.0, 3.0]]).unwrap();
        let picked = frame.select(&[2, 0]);
        assert_eq!(picked.columns(), &["c".to_string(), "a".to_string()]);
        assert_eq!(picked.values(), &array![[3.0, 1.0]]);
    }

    #[test]
    fn test_from_csv_reader() {
        let csv = "a, b ,c\n1,2,3\n4,,NaN\n";
        let frame = Frame::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(frame.columns(), &["a", "b", "c"]);
        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(frame.values()[[1, 0]], 4.0);
        assert!(frame.values()[[1, 1]].is_nan());
        assert!(frame.values()[[1, 2]].is_nan());
    }

    #[test]
    fn test_from_csv_reader_bad_number() {
        let csv = "a,b\n1,abc\n";
        let result = Frame::from_csv_reader(csv.as_bytes());
        assert!(matches!(result, Err(PreprocessingError::CsvError(_))));
    }

    #[test]
    fn test_from_csv_reader_ragged_row() {
        let csv = "a,b\n1,2\n3\n";
        assert!(Frame::from_csv_reader(csv.as_bytes()).is_err());
    }
}
