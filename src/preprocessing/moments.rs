//! Per-feature running moments (count, mean, sum of squared deviations).
//!
//! Batches are summarised with a two-pass mean/M2 computation and combined
//! with Chan, Golub & LeVeque's pairwise update:
//!
//! ```text
//! n    = n_a + n_b
//! d    = mean_b - mean_a
//! mean = mean_a + d * n_b / n
//! M2   = M2_a + M2_b + d^2 * n_a * n_b / n
//! ```
//!
//! Variance is always the biased (divide-by-n) estimator.

use serde::{Deserialize, Serialize};

/// Count, mean and M2 of the observed (non-NaN) values of one feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Number of observed values.
    pub count: u64,
    /// Mean of the observed values (0 when `count == 0`).
    pub mean: f64,
    /// Sum of squared deviations from the mean.
    pub m2: f64,
}

impl Moments {
    /// Summarise one batch of a feature.
    ///
    /// NaN entries of `values` are skipped. `implicit_zeros` counts zero
    /// entries that are not materialised (sparse storage).
    pub fn from_values<I>(values: I, implicit_zeros: u64) -> Self
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        let values = values.into_iter().filter(|v| !v.is_nan());

        // Constant batch: exact mean, zero M2.
        if implicit_zeros == 0 {
            let mut rest = values.clone();
            if let Some(first) = rest.next() {
                if rest.all(|v| v == first) {
                    let count = values.count() as u64;
                    return Self {
                        count,
                        mean: first,
                        m2: 0.0,
                    };
                }
            }
        }

        let (stored, sum) = values
            .clone()
            .fold((0u64, 0.0f64), |(n, s), v| (n + 1, s + v));
        let count = stored + implicit_zeros;
        if count == 0 {
            return Self::default();
        }

        let mean = sum / count as f64;
        let m2 = values.map(|v| (v - mean) * (v - mean)).sum::<f64>()
            + implicit_zeros as f64 * mean * mean;

        Self { count, mean, m2 }
    }

    /// Combine two summaries as if their batches had been concatenated.
    pub fn merge(&self, other: &Moments) -> Moments {
        if other.count == 0 {
            return *self;
        }
        if self.count == 0 {
            return *other;
        }

        let count = self.count + other.count;
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = count as f64;
        let delta = other.mean - self.mean;

        Moments {
            count,
            mean: self.mean + delta * n_b / n,
            m2: self.m2 + other.m2 + delta * delta * n_a * n_b / n,
        }
    }

    /// Population variance (`M2 / n`), 0 when nothing has been observed.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_values_basic() {
        let m = Moments::from_values(vec![1.0, 2.0, 3.0, 4.0], 0);
        assert_eq!(m.count, 4);
        assert_relative_eq!(m.mean, 2.5);
        assert_relative_eq!(m.variance(), 1.25);
    }

    #[test]
    fn test_from_values_skips_nan() {
        let m = Moments::from_values(vec![1.0, f64::NAN, 3.0], 0);
        assert_eq!(m.count, 2);
        assert_relative_eq!(m.mean, 2.0);
        assert_relative_eq!(m.variance(), 1.0);
    }

    #[test]
    fn test_from_values_implicit_zeros() {
        // Same as [0, 0, 2, 4]
        let m = Moments::from_values(vec![2.0, 4.0], 2);
        let dense = Moments::from_values(vec![0.0, 0.0, 2.0, 4.0], 0);
        assert_eq!(m.count, 4);
        assert_relative_eq!(m.mean, dense.mean);
        assert_relative_eq!(m.m2, dense.m2, epsilon = 1e-12);
    }

    #[test]
    fn test_from_values_constant_is_exact() {
        let m = Moments::from_values(vec![123456.789; 10], 0);
        assert_eq!(m.count, 10);
        assert_eq!(m.mean, 123456.789);
        assert_eq!(m.m2, 0.0);

        let merged = m.merge(&Moments::from_values(vec![123456.789, f64::NAN], 0));
        assert_eq!(merged.mean, 123456.789);
        assert_eq!(merged.m2, 0.0);
    }

    #[test]
    fn test_from_values_all_missing() {
        let m = Moments::from_values(vec![f64::NAN, f64::NAN], 0);
        assert_eq!(m, Moments::default());
        assert_eq!(m.variance(), 0.0);
    }

    #[test]
    fn test_merge_matches_concatenation() {
        let a = Moments::from_values(vec![1.0, 5.0, 2.0], 0);
        let b = Moments::from_values(vec![10.0, -3.0], 0);
        let all = Moments::from_values(vec![1.0, 5.0, 2.0, 10.0, -3.0], 0);

        let merged = a.merge(&b);
        assert_eq!(merged.count, all.count);
        assert_relative_eq!(merged.mean, all.mean, epsilon = 1e-12);
        assert_relative_eq!(merged.variance(), all.variance(), epsilon = 1e-12);
    }

    #[test]
    fn test_merge_with_empty() {
        let a = Moments::from_values(vec![1.0, 2.0], 0);
        assert_eq!(a.merge(&Moments::default()), a);
        assert_eq!(Moments::default().merge(&a), a);
    }
}
