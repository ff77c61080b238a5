//! Core traits for preprocessing transformers.
//!
//! - [`Transformer`]: learn from data, then transform compatible data.
//! - [`IncrementalTransformer`]: learn from a stream of batches.
//! - [`InvertibleTransformer`]: map transformed data back.
//! - [`PersistableTransformer`]: export learned state for deployment.
//!
//! Fitting takes `&mut self` and transforming takes `&self`, so a transformer
//! can serve any number of concurrent transforms but never while it is being
//! fitted.

use std::path::Path;

use crate::preprocessing::error::Result;
use crate::serialization::SerializableParams;

/// A transformer that learns parameters from data.
///
/// # Example
/// ```ignore
/// use pipeline_transforms::preprocessing::{StandardScaler, Transformer};
///
/// let mut scaler = StandardScaler::new();
/// scaler.fit(&train)?;
/// let scaled = scaler.transform(&test)?;
/// ```
pub trait Transformer {
    /// Input data type.
    type Input;
    /// Output data type.
    type Output;

    /// Learn parameters from `data`, discarding anything learned before.
    fn fit(&mut self, data: &Self::Input) -> Result<&mut Self>;

    /// Transform `data` with the learned parameters. The input is untouched.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output>;

    /// Fit, then transform the same data.
    fn fit_transform(&mut self, data: &Self::Input) -> Result<Self::Output> {
        self.fit(data)?;
        self.transform(data)
    }
}

/// A transformer whose parameters can be updated batch by batch.
pub trait IncrementalTransformer: Transformer {
    /// Fold `data` into the learned parameters without discarding earlier
    /// batches. On error the previous parameters are kept.
    fn partial_fit(&mut self, data: &Self::Input) -> Result<&mut Self>;
}

/// A transformer that can undo its transformation.
pub trait InvertibleTransformer: Transformer {
    /// Map transformed data back to the original representation.
    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input>;
}

/// A transformer whose configuration and learned state can be saved.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
pub trait PersistableTransformer: Sized {
    /// Serializable representation of the transformer.
    type Params: SerializableParams;

    /// Snapshot the configuration and learned state.
    fn extract_params(&self) -> Self::Params;

    /// Rebuild a transformer from a snapshot.
    fn from_params(params: Self::Params) -> Result<Self>;

    /// Save the transformer to a file (bincode).
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.extract_params().to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a transformer from a file written by [`Self::save_to_file`].
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_params(Self::Params::from_bytes(&bytes)?)
    }

    /// Encode the transformer as JSON.
    fn to_json(&self) -> Result<String> {
        self.extract_params().to_json()
    }

    /// Decode a transformer from [`Self::to_json`] output.
    fn from_json(json: &str) -> Result<Self> {
        Self::from_params(Self::Params::from_json(json)?)
    }
}
