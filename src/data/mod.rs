//! Tabular data containers consumed by the transformers.
//!
//! - [`Dataset`]: a numeric matrix in either dense or sparse layout.
//! - [`FeatureMatrix`]: the interface both layouts share (shape, per-feature
//!   statistics, in-place column scaling).
//! - [`Frame`]: a dense matrix with named columns.
//!
//! NaN is the missing-value sentinel everywhere.

pub(crate) mod dense;
pub mod frame;
pub mod sparse;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::moments::Moments;

pub use frame::Frame;
pub use sparse::{SparseFormat, SparseMatrix};

/// Operations shared by every matrix layout.
///
/// Rows are samples, columns are features.
pub trait FeatureMatrix {
    /// `(n_rows, n_cols)`.
    fn shape(&self) -> (usize, usize);

    /// Number of samples.
    fn n_rows(&self) -> usize {
        self.shape().0
    }

    /// Number of features.
    fn n_features(&self) -> usize {
        self.shape().1
    }

    /// Per-feature count/mean/M2 of this batch, NaN excluded.
    fn column_moments(&self) -> Vec<Moments>;

    /// Per-feature number of non-NaN entries.
    fn observed_counts(&self) -> Vec<u64>;

    /// First infinite entry as `(row, col, value)`, if any.
    fn find_infinite(&self) -> Option<(usize, usize, f64)>;

    /// Divide every entry of column `j` by `divisors[j]`.
    fn divide_columns(&mut self, divisors: &[f64]);

    /// Multiply every entry of column `j` by `factors[j]`.
    fn multiply_columns(&mut self, factors: &[f64]);
}

/// A numeric dataset in dense or sparse layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dataset {
    /// Row-major dense matrix.
    Dense(Array2<f64>),
    /// Compressed sparse matrix (CSR or CSC).
    Sparse(SparseMatrix),
}

impl Dataset {
    /// Wrap a dense matrix.
    pub fn dense(values: Array2<f64>) -> Self {
        Dataset::Dense(values)
    }

    /// Build a dense dataset from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(PreprocessingError::InvalidShape {
                    expected: format!("{} values in row {}", n_cols, i),
                    got: row.len().to_string(),
                });
            }
            flat.extend_from_slice(row);
        }
        let values = Array2::from_shape_vec((rows.len(), n_cols), flat).map_err(|e| {
            PreprocessingError::InvalidShape {
                expected: format!("({}, {})", rows.len(), n_cols),
                got: e.to_string(),
            }
        })?;
        Ok(Dataset::Dense(values))
    }

    /// Returns true for the sparse layout.
    pub fn is_sparse(&self) -> bool {
        matches!(self, Dataset::Sparse(_))
    }

    /// Borrow the dense matrix, if this is one.
    pub fn as_dense(&self) -> Option<&Array2<f64>> {
        match self {
            Dataset::Dense(values) => Some(values),
            Dataset::Sparse(_) => None,
        }
    }

    /// Borrow the sparse matrix, if this is one.
    pub fn as_sparse(&self) -> Option<&SparseMatrix> {
        match self {
            Dataset::Dense(_) => None,
            Dataset::Sparse(matrix) => Some(matrix),
        }
    }

    /// Materialise as a dense matrix (implicit zeros filled in).
    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            Dataset::Dense(values) => values.clone(),
            Dataset::Sparse(matrix) => matrix.to_dense(),
        }
    }

    /// Convert into a dense matrix, reusing the buffer when already dense.
    pub fn into_dense(self) -> Array2<f64> {
        match self {
            Dataset::Dense(values) => values,
            Dataset::Sparse(matrix) => matrix.to_dense(),
        }
    }

    /// Fail with [`PreprocessingError::NonFiniteValue`] on the first infinity.
    pub(crate) fn ensure_no_infinite(&self) -> Result<()> {
        match self.find_infinite() {
            Some((row, col, value)) => Err(PreprocessingError::NonFiniteValue { row, col, value }),
            None => Ok(()),
        }
    }
}

impl From<Array2<f64>> for Dataset {
    fn from(values: Array2<f64>) -> Self {
        Dataset::Dense(values)
    }
}

impl From<SparseMatrix> for Dataset {
    fn from(matrix: SparseMatrix) -> Self {
        Dataset::Sparse(matrix)
    }
}

impl FeatureMatrix for Dataset {
    fn shape(&self) -> (usize, usize) {
        match self {
            Dataset::Dense(values) => values.dim(),
            Dataset::Sparse(matrix) => matrix.shape(),
        }
    }

    fn column_moments(&self) -> Vec<Moments> {
        match self {
            Dataset::Dense(values) => values.column_moments(),
            Dataset::Sparse(matrix) => matrix.column_moments(),
        }
    }

    fn observed_counts(&self) -> Vec<u64> {
        match self {
            Dataset::Dense(values) => values.observed_counts(),
            Dataset::Sparse(matrix) => matrix.observed_counts(),
        }
    }

    fn find_infinite(&self) -> Option<(usize, usize, f64)> {
        match self {
            Dataset::Dense(values) => values.find_infinite(),
            Dataset::Sparse(matrix) => matrix.find_infinite(),
        }
    }

    fn divide_columns(&mut self, divisors: &[f64]) {
        match self {
            Dataset::Dense(values) => values.divide_columns(divisors),
            Dataset::Sparse(matrix) => matrix.divide_columns(divisors),
        }
    }

    fn multiply_columns(&mut self, factors: &[f64]) {
        match self {
            Dataset::Dense(values) => values.multiply_columns(factors),
            Dataset::Sparse(matrix) => matrix.multiply_columns(factors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_rows() {
        let data = Dataset::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(data.shape(), (3, 2));
        assert_eq!(data.as_dense().unwrap()[[2, 1]], 6.0);
        assert!(!data.is_sparse());
    }

    #[test]
    fn test_from_rows_ragged() {
        let result = Dataset::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(PreprocessingError::InvalidShape { .. })));
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let values = array![[0.0, 1.0, f64::NAN], [2.0, 0.0, 3.0], [0.0, 0.0, 5.0]];
        let dense = Dataset::dense(values.clone());
        let sparse = Dataset::from(SparseMatrix::from_dense(&values, SparseFormat::Csr));

        assert_eq!(dense.shape(), sparse.shape());
        assert_eq!(dense.observed_counts(), sparse.observed_counts());
        for (d, s) in dense.column_moments().iter().zip(sparse.column_moments().iter()) {
            assert_eq!(d.count, s.count);
            assert!((d.mean - s.mean).abs() < 1e-12);
            assert!((d.m2 - s.m2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ensure_no_infinite() {
        let data = Dataset::dense(array![[1.0, f64::NAN], [f64::NEG_INFINITY, 0.0]]);
        match data.ensure_no_infinite() {
            Err(PreprocessingError::NonFiniteValue { row, col, .. }) => {
                assert_eq!((row, col), (1, 0));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_into_dense_from_sparse() {
        let values = array![[0.0, 1.0], [2.0, 0.0]];
        let data = Dataset::from(SparseMatrix::from_dense(&values, SparseFormat::Csc));
        assert_eq!(data.into_dense(), values);
    }
}
