//! Standard Scaler (Z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance.
//!
//! The standard score of a sample `x` is calculated as:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the mean of the training samples (or zero with
//! `with_mean(false)`) and `s` is their standard deviation (or one with
//! `with_std(false)`).
//!
//! Statistics are accumulated incrementally: [`StandardScaler::partial_fit`]
//! folds each batch into the running per-feature count, mean and variance,
//! so the scaler can learn from data that does not fit in memory at once.
//! [`StandardScaler::fit`] starts over from scratch.
//!
//! NaN values are treated as missing: they are ignored while fitting and left
//! untouched by the transforms. The standard deviation uses the biased
//! (divide-by-n) estimator.
//!
//! Sparse input is accepted as long as centering is disabled, since
//! subtracting a mean would turn every implicit zero into a stored value.
//!
//! # Example
//! ```ignore
//! use pipeline_transforms::data::Dataset;
//! use pipeline_transforms::preprocessing::StandardScaler;
//!
//! let data = Dataset::from_rows(&[vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 1.0]])?;
//! let mut scaler = StandardScaler::new();
//! scaler.fit(&data)?;
//! assert_eq!(scaler.mean()?, Some(vec![0.5, 0.5]));
//!
//! let scaled = scaler.transform(&Dataset::from_rows(&[vec![2.0, 2.0]])?)?;
//! // [[3.0, 3.0]]
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::dense::{add_columns, subtract_columns};
use crate::data::{Dataset, FeatureMatrix};
use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::moments::Moments;
use crate::preprocessing::traits::{
    IncrementalTransformer, InvertibleTransformer, PersistableTransformer, Transformer,
};

/// Scales at or below this value are treated as zero and replaced by 1.
const SCALE_EPSILON: f64 = 10.0 * f64::EPSILON;

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, center the data before scaling.
    pub with_mean: bool,
    /// If true, scale the data to unit variance.
    pub with_std: bool,
    /// If true, [`StandardScaler::transform_cow`] and
    /// [`StandardScaler::inverse_transform_cow`] leave their argument alone
    /// and return a new dataset.
    pub copy: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
            copy: true,
        }
    }
}

/// Number of samples the scaler has seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SamplesSeen {
    /// Every feature saw the same number of non-missing values.
    Uniform(u64),
    /// Per-feature counts (missing-value patterns differ).
    PerFeature(Vec<u64>),
}

/// Statistics learned by a fitted scaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedStats {
    /// Non-missing values seen per feature.
    pub n_samples_seen: Vec<u64>,
    /// Running moments per feature. Absent when both centering and scaling
    /// are disabled.
    pub moments: Option<Vec<Moments>>,
    /// `sqrt(variance)` per feature with zeros replaced by 1. Absent when
    /// scaling is disabled.
    pub scale: Option<Vec<f64>>,
}

impl FittedStats {
    fn n_features(&self) -> usize {
        self.n_samples_seen.len()
    }
}

/// Learned state of a [`StandardScaler`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ScalerState {
    /// Nothing learned yet.
    #[default]
    Unfitted,
    /// Statistics from one or more batches.
    Fitted(FittedStats),
}

/// Serializable snapshot of a StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Configuration options.
    pub config: StandardScalerConfig,
    /// Learned state.
    pub state: ScalerState,
}

/// Standardizes features by removing the mean and scaling to unit variance.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    config: StandardScalerConfig,
    state: ScalerState,
}

impl StandardScaler {
    /// Create a new StandardScaler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfitted scaler from a configuration.
    pub fn from_config(config: StandardScalerConfig) -> Self {
        Self {
            config,
            state: ScalerState::Unfitted,
        }
    }

    /// Set whether to center data by mean. Resets any learned state.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self.state = ScalerState::Unfitted;
        self
    }

    /// Set whether to scale data to unit variance. Resets any learned state.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self.state = ScalerState::Unfitted;
        self
    }

    /// Set the copy policy of the `*_cow` transforms.
    pub fn with_copy(mut self, copy: bool) -> Self {
        self.config.copy = copy;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &StandardScalerConfig {
        &self.config
    }

    /// The learned state.
    pub fn state(&self) -> &ScalerState {
        &self.state
    }

    /// Returns true once `fit` or `partial_fit` has succeeded.
    pub fn is_fitted(&self) -> bool {
        matches!(self.state, ScalerState::Fitted(_))
    }

    fn fitted(&self) -> Result<&FittedStats> {
        match &self.state {
            ScalerState::Fitted(stats) => Ok(stats),
            ScalerState::Unfitted => Err(PreprocessingError::NotFitted("StandardScaler")),
        }
    }

    /// Number of features seen during fit.
    pub fn n_features_in(&self) -> Result<usize> {
        Ok(self.fitted()?.n_features())
    }

    /// Samples seen so far, collapsed to a single count when uniform.
    pub fn n_samples_seen(&self) -> Result<SamplesSeen> {
        let counts = &self.fitted()?.n_samples_seen;
        match counts.split_first() {
            Some((&first, rest)) if rest.iter().all(|&c| c == first) => {
                Ok(SamplesSeen::Uniform(first))
            }
            _ => Ok(SamplesSeen::PerFeature(counts.clone())),
        }
    }

    /// Per-feature mean, or `None` when centering is disabled.
    pub fn mean(&self) -> Result<Option<Vec<f64>>> {
        let stats = self.fitted()?;
        if !self.config.with_mean {
            return Ok(None);
        }
        Ok(stats
            .moments
            .as_ref()
            .map(|moments| moments.iter().map(|m| m.mean).collect()))
    }

    /// Per-feature biased variance, or `None` when scaling is disabled.
    pub fn variance(&self) -> Result<Option<Vec<f64>>> {
        let stats = self.fitted()?;
        if !self.config.with_std {
            return Ok(None);
        }
        Ok(stats
            .moments
            .as_ref()
            .map(|moments| moments.iter().map(Moments::variance).collect()))
    }

    /// Per-feature scale, or `None` when scaling is disabled.
    pub fn scale(&self) -> Result<Option<&[f64]>> {
        Ok(self.fitted()?.scale.as_deref())
    }

    /// Compute mean and standard deviation from scratch.
    ///
    /// Learned state is cleared before the batch is processed, so on error
    /// the scaler is left unfitted.
    pub fn fit(&mut self, data: &Dataset) -> Result<&mut Self> {
        if self.is_fitted() {
            debug!("StandardScaler: resetting learned state before fit");
        }
        self.state = ScalerState::Unfitted;
        self.partial_fit(data)
    }

    /// Online computation of mean and standard deviation.
    ///
    /// The batch is merged into the running statistics with Chan, Golub &
    /// LeVeque's pairwise update. On error the previous state is kept.
    pub fn partial_fit(&mut self, data: &Dataset) -> Result<&mut Self> {
        let (rows, cols) = data.shape();

        if rows == 0 || cols == 0 {
            return Err(PreprocessingError::EmptyData(format!(
                "Cannot fit StandardScaler on data of shape ({}, {})",
                rows, cols
            )));
        }
        if data.is_sparse() && self.config.with_mean {
            return Err(PreprocessingError::InvalidConfiguration(
                "Cannot center sparse matrices: use with_mean(false) instead".to_string(),
            ));
        }
        let previous = match &self.state {
            ScalerState::Fitted(stats) => {
                if stats.n_features() != cols {
                    return Err(PreprocessingError::FeatureMismatch {
                        expected_features: stats.n_features(),
                        got_features: cols,
                    });
                }
                Some(stats)
            }
            ScalerState::Unfitted => None,
        };
        data.ensure_no_infinite()?;

        let updated = if self.config.with_mean || self.config.with_std {
            let batch = data.column_moments();
            let moments: Vec<Moments> = match previous.and_then(|s| s.moments.as_ref()) {
                Some(old) => old.iter().zip(batch.iter()).map(|(a, b)| a.merge(b)).collect(),
                None => batch,
            };
            let scale: Option<Vec<f64>> = self.config.with_std.then(|| {
                moments
                    .iter()
                    .map(scale_from_moments)
                    .collect()
            });
            FittedStats {
                n_samples_seen: moments.iter().map(|m| m.count).collect(),
                moments: Some(moments),
                scale,
            }
        } else {
            let batch = data.observed_counts();
            let n_samples_seen = match previous {
                Some(old) => old
                    .n_samples_seen
                    .iter()
                    .zip(batch.iter())
                    .map(|(a, b)| a + b)
                    .collect(),
                None => batch,
            };
            FittedStats {
                n_samples_seen,
                moments: None,
                scale: None,
            }
        };

        if let Some(j) = updated.n_samples_seen.iter().position(|&c| c == 0) {
            warn!(
                feature = j,
                "StandardScaler: feature has no non-missing values yet"
            );
        }
        debug!(
            rows,
            cols,
            sparse = data.is_sparse(),
            "StandardScaler: merged batch into running statistics"
        );

        self.state = ScalerState::Fitted(updated);
        Ok(self)
    }

    /// Standardize a copy of `data`.
    pub fn transform(&self, data: &Dataset) -> Result<Dataset> {
        self.check_transform_input(data, "center")?;
        data.ensure_no_infinite()?;
        let mut out = data.clone();
        self.apply_forward(&mut out)?;
        Ok(out)
    }

    /// Standardize `data` in place.
    pub fn transform_inplace(&self, data: &mut Dataset) -> Result<()> {
        self.check_transform_input(data, "center")?;
        data.ensure_no_infinite()?;
        self.apply_forward(data)
    }

    /// Standardize honouring the configured copy policy: a new dataset when
    /// `copy` is set, otherwise `data` rewritten in place and borrowed back.
    pub fn transform_cow<'a>(&self, data: &'a mut Dataset) -> Result<Cow<'a, Dataset>> {
        if self.config.copy {
            self.transform(data).map(Cow::Owned)
        } else {
            self.transform_inplace(data)?;
            Ok(Cow::Borrowed(data))
        }
    }

    /// Scale a copy of `data` back to the original representation.
    pub fn inverse_transform(&self, data: &Dataset) -> Result<Dataset> {
        self.check_transform_input(data, "uncenter")?;
        let mut out = data.clone();
        self.apply_inverse(&mut out)?;
        Ok(out)
    }

    /// Scale `data` back to the original representation in place.
    pub fn inverse_transform_inplace(&self, data: &mut Dataset) -> Result<()> {
        self.check_transform_input(data, "uncenter")?;
        self.apply_inverse(data)
    }

    /// Inverse transform honouring the configured copy policy.
    pub fn inverse_transform_cow<'a>(&self, data: &'a mut Dataset) -> Result<Cow<'a, Dataset>> {
        if self.config.copy {
            self.inverse_transform(data).map(Cow::Owned)
        } else {
            self.inverse_transform_inplace(data)?;
            Ok(Cow::Borrowed(data))
        }
    }

    fn check_transform_input(&self, data: &Dataset, verb: &str) -> Result<()> {
        let stats = self.fitted()?;
        let cols = data.n_features();
        if cols != stats.n_features() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: stats.n_features(),
                got_features: cols,
            });
        }
        if data.is_sparse() && self.config.with_mean {
            return Err(PreprocessingError::InvalidConfiguration(format!(
                "Cannot {} sparse matrices: use with_mean(false) instead",
                verb
            )));
        }
        Ok(())
    }

    fn apply_forward(&self, data: &mut Dataset) -> Result<()> {
        let stats = self.fitted()?;
        if let (true, Dataset::Dense(values)) = (self.config.with_mean, &mut *data) {
            subtract_columns(values, &means(stats)?);
        }
        if let Some(scale) = &stats.scale {
            data.divide_columns(scale);
        }
        Ok(())
    }

    fn apply_inverse(&self, data: &mut Dataset) -> Result<()> {
        let stats = self.fitted()?;
        if let Some(scale) = &stats.scale {
            data.multiply_columns(scale);
        }
        if let (true, Dataset::Dense(values)) = (self.config.with_mean, &mut *data) {
            add_columns(values, &means(stats)?);
        }
        Ok(())
    }
}

fn means(stats: &FittedStats) -> Result<Vec<f64>> {
    stats
        .moments
        .as_ref()
        .map(|moments| moments.iter().map(|m| m.mean).collect())
        .ok_or_else(|| {
            PreprocessingError::InvalidConfiguration(
                "centering requested but no mean was learned".to_string(),
            )
        })
}

/// Standard deviation of a feature, or 1 for features that are constant
/// up to floating point error, so they are left unscaled.
fn scale_from_moments(moments: &Moments) -> f64 {
    let var = moments.variance();
    if is_constant_feature(var, moments.mean, moments.count) {
        return 1.0;
    }
    handle_zero_scale(var.sqrt())
}

/// A variance within the accumulated rounding error of the mean and
/// variance computations counts as zero.
fn is_constant_feature(var: f64, mean: f64, count: u64) -> bool {
    let n = count as f64;
    let eps = f64::EPSILON;
    let upper_bound = n * eps * var + (n * mean * eps).powi(2);
    var <= upper_bound
}

/// Replace (near-)zero scales by 1 so constant features are left unscaled.
fn handle_zero_scale(scale: f64) -> f64 {
    if scale <= SCALE_EPSILON {
        1.0
    } else {
        scale
    }
}

impl Transformer for StandardScaler {
    type Input = Dataset;
    type Output = Dataset;

    fn fit(&mut self, data: &Dataset) -> Result<&mut Self> {
        StandardScaler::fit(self, data)
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        StandardScaler::transform(self, data)
    }
}

impl IncrementalTransformer for StandardScaler {
    fn partial_fit(&mut self, data: &Dataset) -> Result<&mut Self> {
        StandardScaler::partial_fit(self, data)
    }
}

impl InvertibleTransformer for StandardScaler {
    fn inverse_transform(&self, data: &Dataset) -> Result<Dataset> {
        StandardScaler::inverse_transform(self, data)
    }
}

impl PersistableTransformer for StandardScaler {
    type Params = StandardScalerParams;

    fn extract_params(&self) -> StandardScalerParams {
        StandardScalerParams {
            config: self.config.clone(),
            state: self.state.clone(),
        }
    }

    fn from_params(params: StandardScalerParams) -> Result<Self> {
        if let ScalerState::Fitted(stats) = &params.state {
            validate_stats(&params.config, stats)?;
        }
        Ok(Self {
            config: params.config,
            state: params.state,
        })
    }
}

fn validate_stats(config: &StandardScalerConfig, stats: &FittedStats) -> Result<()> {
    let n = stats.n_features();
    let invalid = |msg: &str| Err(PreprocessingError::SerializationError(msg.to_string()));

    match (&stats.moments, config.with_mean || config.with_std) {
        (Some(moments), true) => {
            if moments.len() != n {
                return invalid("moments length differs from n_samples_seen");
            }
            if moments
                .iter()
                .zip(&stats.n_samples_seen)
                .any(|(m, &c)| m.count != c)
            {
                return invalid("moment counts differ from n_samples_seen");
            }
        }
        (None, false) => {}
        (Some(_), false) => {
            return invalid("moments present although scaler neither centers nor scales")
        }
        (None, true) => return invalid("moments missing for a centering or scaling scaler"),
    }

    match (&stats.scale, config.with_std) {
        (Some(scale), true) if scale.len() == n => Ok(()),
        (Some(_), true) => invalid("scale length differs from n_samples_seen"),
        (None, false) => Ok(()),
        (Some(_), false) => invalid("scale present although with_std is disabled"),
        (None, true) => invalid("scale missing although with_std is enabled"),
    }
}
