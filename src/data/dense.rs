//! Dense layout: `ndarray::Array2<f64>`.

use ndarray::{Array2, Axis, Zip};

use super::FeatureMatrix;
use crate::preprocessing::moments::Moments;

impl FeatureMatrix for Array2<f64> {
    fn shape(&self) -> (usize, usize) {
        self.dim()
    }

    fn column_moments(&self) -> Vec<Moments> {
        self.axis_iter(Axis(1))
            .map(|column| Moments::from_values(column.iter().copied(), 0))
            .collect()
    }

    fn observed_counts(&self) -> Vec<u64> {
        self.axis_iter(Axis(1))
            .map(|column| column.iter().filter(|v| !v.is_nan()).count() as u64)
            .collect()
    }

    fn find_infinite(&self) -> Option<(usize, usize, f64)> {
        self.indexed_iter()
            .find(|(_, v)| v.is_infinite())
            .map(|((row, col), &v)| (row, col, v))
    }

    fn divide_columns(&mut self, divisors: &[f64]) {
        for mut row in self.axis_iter_mut(Axis(0)) {
            Zip::from(&mut row)
                .and(divisors)
                .for_each(|v, &d| *v /= d);
        }
    }

    fn multiply_columns(&mut self, factors: &[f64]) {
        for mut row in self.axis_iter_mut(Axis(0)) {
            Zip::from(&mut row)
                .and(factors)
                .for_each(|v, &f| *v *= f);
        }
    }
}

/// Subtract `offsets[j]` from every entry of column `j`.
pub(crate) fn subtract_columns(values: &mut Array2<f64>, offsets: &[f64]) {
    for mut row in values.axis_iter_mut(Axis(0)) {
        Zip::from(&mut row)
            .and(offsets)
            .for_each(|v, &o| *v -= o);
    }
}

/// Add `offsets[j]` to every entry of column `j`.
pub(crate) fn add_columns(values: &mut Array2<f64>, offsets: &[f64]) {
    for mut row in values.axis_iter_mut(Axis(0)) {
        Zip::from(&mut row)
            .and(offsets)
            .for_each(|v, &o| *v += o);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_column_moments_ignore_nan() {
        let values = array![[1.0, 10.0], [f64::NAN, 20.0], [3.0, 30.0]];
        let moments = values.column_moments();

        assert_eq!(moments[0].count, 2);
        assert!((moments[0].mean - 2.0).abs() < 1e-12);
        assert_eq!(moments[1].count, 3);
        assert!((moments[1].mean - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_observed_counts() {
        let values = array![[f64::NAN, 1.0], [f64::NAN, 2.0], [0.0, f64::NAN]];
        assert_eq!(values.observed_counts(), vec![1, 2]);
    }

    #[test]
    fn test_column_arithmetic() {
        let mut values = array![[1.0, 4.0], [3.0, 8.0]];
        subtract_columns(&mut values, &[1.0, 2.0]);
        values.divide_columns(&[2.0, 2.0]);
        assert_eq!(values, array![[0.0, 1.0], [1.0, 3.0]]);

        values.multiply_columns(&[2.0, 2.0]);
        add_columns(&mut values, &[1.0, 2.0]);
        assert_eq!(values, array![[1.0, 4.0], [3.0, 8.0]]);
    }

    #[test]
    fn test_nan_survives_arithmetic() {
        let mut values = array![[f64::NAN, 1.0]];
        subtract_columns(&mut values, &[5.0, 0.0]);
        values.divide_columns(&[2.0, 1.0]);
        assert!(values[[0, 0]].is_nan());
    }
}
