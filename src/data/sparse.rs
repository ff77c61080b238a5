//! Compressed sparse matrices (CSR and CSC).
//!
//! Both formats store `indptr`, `indices` and `data` arrays. For CSR the
//! major axis is rows and `indices` hold column numbers; for CSC it is the
//! other way round. Entries that are not stored are implicit zeros, so only
//! operations that map 0 to 0 (column scaling) can run without densifying.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::FeatureMatrix;
use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::moments::Moments;

/// Storage order of a [`SparseMatrix`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SparseFormat {
    /// Compressed sparse row.
    Csr,
    /// Compressed sparse column.
    Csc,
}

/// A compressed sparse matrix of `f64`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparseParts")]
pub struct SparseMatrix {
    format: SparseFormat,
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

/// Unchecked wire form of a [`SparseMatrix`], validated on the way in.
#[derive(Deserialize)]
struct SparseParts {
    format: SparseFormat,
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl TryFrom<SparseParts> for SparseMatrix {
    type Error = PreprocessingError;

    fn try_from(parts: SparseParts) -> Result<Self> {
        Self::from_parts(
            parts.format,
            parts.n_rows,
            parts.n_cols,
            parts.indptr,
            parts.indices,
            parts.data,
        )
    }
}

impl SparseMatrix {
    /// Build a CSR matrix from raw arrays.
    pub fn csr(
        n_rows: usize,
        n_cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        Self::from_parts(SparseFormat::Csr, n_rows, n_cols, indptr, indices, data)
    }

    /// Build a CSC matrix from raw arrays.
    pub fn csc(
        n_rows: usize,
        n_cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        Self::from_parts(SparseFormat::Csc, n_rows, n_cols, indptr, indices, data)
    }

    /// Validate and assemble a matrix.
    ///
    /// `indptr` must start at 0, be non-decreasing and end at `data.len()`.
    /// Minor indices must be in range and strictly increasing within each
    /// major slice (no duplicates).
    pub fn from_parts(
        format: SparseFormat,
        n_rows: usize,
        n_cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        let (n_major, n_minor) = match format {
            SparseFormat::Csr => (n_rows, n_cols),
            SparseFormat::Csc => (n_cols, n_rows),
        };

        if indptr.len() != n_major + 1 {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("indptr of length {}", n_major + 1),
                got: indptr.len().to_string(),
            });
        }
        if indices.len() != data.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} indices", data.len()),
                got: indices.len().to_string(),
            });
        }
        if indptr[0] != 0 || indptr[n_major] != data.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("indptr spanning 0..{}", data.len()),
                got: format!("{}..{}", indptr[0], indptr[n_major]),
            });
        }

        for major in 0..n_major {
            let (start, end) = (indptr[major], indptr[major + 1]);
            if start > end {
                return Err(PreprocessingError::InvalidShape {
                    expected: "non-decreasing indptr".to_string(),
                    got: format!("indptr[{}] = {} > {}", major, start, end),
                });
            }
            let slice = &indices[start..end];
            if let Some(&bad) = slice.iter().find(|&&i| i >= n_minor) {
                return Err(PreprocessingError::InvalidShape {
                    expected: format!("minor index < {}", n_minor),
                    got: bad.to_string(),
                });
            }
            if slice.windows(2).any(|w| w[0] >= w[1]) {
                return Err(PreprocessingError::InvalidShape {
                    expected: "strictly increasing indices per slice".to_string(),
                    got: format!("{:?}", slice),
                });
            }
        }

        Ok(Self {
            format,
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        })
    }

    /// Store every non-zero entry of `values` (NaN counts as non-zero).
    pub fn from_dense(values: &Array2<f64>, format: SparseFormat) -> Self {
        let (n_rows, n_cols) = values.dim();
        let (n_major, n_minor) = match format {
            SparseFormat::Csr => (n_rows, n_cols),
            SparseFormat::Csc => (n_cols, n_rows),
        };

        let mut indptr = Vec::with_capacity(n_major + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for major in 0..n_major {
            for minor in 0..n_minor {
                let v = match format {
                    SparseFormat::Csr => values[[major, minor]],
                    SparseFormat::Csc => values[[minor, major]],
                };
                if v != 0.0 {
                    indices.push(minor);
                    data.push(v);
                }
            }
            indptr.push(data.len());
        }

        Self {
            format,
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    /// Storage format.
    pub fn format(&self) -> SparseFormat {
        self.format
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Stored values in storage order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Index pointer array.
    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    /// Minor-axis index of each stored value.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate stored entries as `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.indptr.len() - 1).flat_map(move |major| {
            (self.indptr[major]..self.indptr[major + 1]).map(move |k| {
                let minor = self.indices[k];
                match self.format {
                    SparseFormat::Csr => (major, minor, self.data[k]),
                    SparseFormat::Csc => (minor, major, self.data[k]),
                }
            })
        })
    }

    /// Materialise as a dense matrix.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows, self.n_cols));
        for (row, col, v) in self.iter() {
            dense[[row, col]] = v;
        }
        dense
    }

    /// Same matrix in CSR order.
    pub fn to_csr(&self) -> SparseMatrix {
        self.to_format(SparseFormat::Csr)
    }

    /// Same matrix in CSC order.
    pub fn to_csc(&self) -> SparseMatrix {
        self.to_format(SparseFormat::Csc)
    }

    fn to_format(&self, format: SparseFormat) -> SparseMatrix {
        if format == self.format {
            return self.clone();
        }

        // Counting sort on the current minor axis, which becomes the new major.
        let n_new_major = match format {
            SparseFormat::Csr => self.n_rows,
            SparseFormat::Csc => self.n_cols,
        };
        let mut indptr = vec![0usize; n_new_major + 1];
        for &minor in &self.indices {
            indptr[minor + 1] += 1;
        }
        for i in 0..n_new_major {
            indptr[i + 1] += indptr[i];
        }

        let mut next = indptr.clone();
        let mut indices = vec![0usize; self.nnz()];
        let mut data = vec![0.0f64; self.nnz()];
        for major in 0..self.indptr.len() - 1 {
            for k in self.indptr[major]..self.indptr[major + 1] {
                let slot = next[self.indices[k]];
                indices[slot] = major;
                data[slot] = self.data[k];
                next[self.indices[k]] += 1;
            }
        }

        SparseMatrix {
            format,
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            indptr,
            indices,
            data,
        }
    }

    /// Column of each stored value, in storage order.
    fn stored_columns(&self) -> Vec<usize> {
        match self.format {
            SparseFormat::Csr => self.indices.clone(),
            SparseFormat::Csc => (0..self.n_cols)
                .flat_map(|col| {
                    std::iter::repeat(col).take(self.indptr[col + 1] - self.indptr[col])
                })
                .collect(),
        }
    }

    fn stored_by_column(&self) -> Vec<Vec<f64>> {
        let mut columns = vec![Vec::new(); self.n_cols];
        for (col, &v) in self.stored_columns().into_iter().zip(self.data.iter()) {
            columns[col].push(v);
        }
        columns
    }
}

impl FeatureMatrix for SparseMatrix {
    fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn column_moments(&self) -> Vec<Moments> {
        self.stored_by_column()
            .into_iter()
            .map(|stored| {
                let implicit_zeros = (self.n_rows - stored.len()) as u64;
                Moments::from_values(stored, implicit_zeros)
            })
            .collect()
    }

    fn observed_counts(&self) -> Vec<u64> {
        let mut counts = vec![self.n_rows as u64; self.n_cols];
        for (col, v) in self.stored_columns().into_iter().zip(self.data.iter()) {
            if v.is_nan() {
                counts[col] -= 1;
            }
        }
        counts
    }

    fn find_infinite(&self) -> Option<(usize, usize, f64)> {
        self.iter().find(|&(_, _, v)| v.is_infinite())
    }

    fn divide_columns(&mut self, divisors: &[f64]) {
        for (col, v) in self.stored_columns().into_iter().zip(self.data.iter_mut()) {
            *v /= divisors[col];
        }
    }

    fn multiply_columns(&mut self, factors: &[f64]) {
        for (col, v) in self.stored_columns().into_iter().zip(self.data.iter_mut()) {
            *v *= factors[col];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Array2<f64> {
        array![[1.0, 0.0, 2.0], [0.0, 0.0, 3.0], [4.0, 5.0, 0.0]]
    }

    #[test]
    fn test_from_dense_csr_layout() {
        let m = SparseMatrix::from_dense(&sample(), SparseFormat::Csr);
        assert_eq!(m.indptr(), &[0, 2, 3, 5]);
        assert_eq!(m.indices(), &[0, 2, 2, 0, 1]);
        assert_eq!(m.data(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(m.nnz(), 5);
    }

    #[test]
    fn test_from_dense_csc_layout() {
        let m = SparseMatrix::from_dense(&sample(), SparseFormat::Csc);
        assert_eq!(m.indptr(), &[0, 2, 3, 5]);
        assert_eq!(m.indices(), &[0, 2, 2, 0, 1]);
        assert_eq!(m.data(), &[1.0, 4.0, 5.0, 2.0, 3.0]);
    }

    #[test]
    fn test_deserialize_validates() {
        let m = SparseMatrix::from_dense(&sample(), SparseFormat::Csr);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<SparseMatrix>(&json).unwrap(), m);

        let empty_indptr = r#"{"format":"Csr","n_rows":2,"n_cols":2,"indptr":[],"indices":[],"data":[]}"#;
        assert!(serde_json::from_str::<SparseMatrix>(empty_indptr).is_err());

        let out_of_range = r#"{"Sparse":{"format":"Csc","n_rows":2,"n_cols":1,"indptr":[0,1],"indices":[5],"data":[1.0]}}"#;
        assert!(serde_json::from_str::<crate::data::Dataset>(out_of_range).is_err());
    }

    #[test]
    fn test_dense_roundtrip_both_formats() {
        let dense = sample();
        for format in [SparseFormat::Csr, SparseFormat::Csc] {
            assert_eq!(SparseMatrix::from_dense(&dense, format).to_dense(), dense);
        }
    }

    #[test]
    fn test_format_conversion() {
        let csr = SparseMatrix::from_dense(&sample(), SparseFormat::Csr);
        let csc = csr.to_csc();
        assert_eq!(csc.format(), SparseFormat::Csc);
        assert_eq!(csc, SparseMatrix::from_dense(&sample(), SparseFormat::Csc));
        assert_eq!(csc.to_csr(), csr);
    }

    #[test]
    fn test_invalid_indptr_length() {
        let result = SparseMatrix::csr(2, 2, vec![0, 1], vec![0], vec![1.0]);
        assert!(matches!(result, Err(PreprocessingError::InvalidShape { .. })));
    }

    #[test]
    fn test_index_out_of_range() {
        let result = SparseMatrix::csr(1, 2, vec![0, 1], vec![2], vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_indices_rejected() {
        let result = SparseMatrix::csc(2, 1, vec![0, 2], vec![1, 1], vec![1.0, 2.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_observed_counts_with_nan() {
        let dense = array![[f64::NAN, 0.0], [1.0, f64::NAN], [0.0, 0.0]];
        let m = SparseMatrix::from_dense(&dense, SparseFormat::Csr);
        assert_eq!(m.observed_counts(), vec![2, 2]);
    }

    #[test]
    fn test_column_moments_include_implicit_zeros() {
        let m = SparseMatrix::from_dense(&sample(), SparseFormat::Csc);
        let moments = m.column_moments();
        assert_eq!(moments[0].count, 3);
        assert!((moments[0].mean - 5.0 / 3.0).abs() < 1e-12);
        assert!((moments[1].mean - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_divide_columns_keeps_structure() {
        let mut m = SparseMatrix::from_dense(&sample(), SparseFormat::Csc);
        m.divide_columns(&[2.0, 5.0, 1.0]);
        assert_eq!(m.nnz(), 5);
        assert_eq!(
            m.to_dense(),
            array![[0.5, 0.0, 2.0], [0.0, 0.0, 3.0], [2.0, 1.0, 0.0]]
        );
    }
}
