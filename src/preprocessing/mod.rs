//! Data preprocessing transformers for machine learning pipelines.
//!
//! # Design
//!
//! - **Explicit state**: a transformer is either unfitted or carries its
//!   learned statistics; fitted-only calls fail with
//!   [`PreprocessingError::NotFitted`] instead of inspecting attributes.
//! - **Layout agnostic**: the scaler works on dense and sparse [`Dataset`]s
//!   through one [`FeatureMatrix`] interface.
//! - **Serializable**: transformers can be saved and loaded for serving.
//! - **sklearn-compatible**: `fit`, `partial_fit`, `transform`,
//!   `inverse_transform` behave like their scikit-learn namesakes.
//!
//! # Available Transformers
//!
//! - [`StandardScaler`]: Z-score normalization with incremental fitting
//! - [`DropColumns`]: remove named columns from a [`Frame`]
//! - [`Pipeline`]: chain frame transformers
//!
//! # Example
//!
//! ```ignore
//! use pipeline_transforms::preprocessing::{PersistableTransformer, StandardScaler};
//!
//! let mut scaler = StandardScaler::new().with_mean(true).with_std(true);
//! scaler.fit(&training_data)?;
//! let scaled_train = scaler.transform(&training_data)?;
//!
//! // Save for later use
//! scaler.save_to_file("scaler.bin")?;
//! let loaded = StandardScaler::load_from_file("scaler.bin")?;
//! let scaled_test = loaded.transform(&test_data)?;
//! ```
//!
//! [`Dataset`]: crate::data::Dataset
//! [`FeatureMatrix`]: crate::data::FeatureMatrix
//! [`Frame`]: crate::data::Frame

pub mod columns;
pub mod error;
pub mod moments;
pub mod pipeline;
pub mod scaling;
pub mod traits;

// Re-export main types
pub use columns::{DropColumns, DropColumnsConfig, UnknownColumns};
pub use error::{PreprocessingError, Result};
pub use moments::Moments;
pub use pipeline::{Pipeline, PipelineParams, PipelineStep, PipelineStepParams};
pub use scaling::{
    FittedStats, SamplesSeen, ScalerState, StandardScaler, StandardScalerConfig,
    StandardScalerParams,
};
pub use traits::{
    IncrementalTransformer, InvertibleTransformer, PersistableTransformer, Transformer,
};
