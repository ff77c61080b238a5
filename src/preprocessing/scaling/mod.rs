//! Scaling transformers for feature normalization.
//!
//! | Transformer | Description | Use Case |
//! |-------------|-------------|----------|
//! | [`StandardScaler`] | Z-score normalization (mean=0, std=1), incremental | Default choice for most algorithms |
//!
//! # Example
//!
//! ```ignore
//! use pipeline_transforms::preprocessing::scaling::StandardScaler;
//!
//! let mut scaler = StandardScaler::new();
//! for batch in batches {
//!     scaler.partial_fit(&batch)?;
//! }
//! let scaled = scaler.transform(&new_data)?;
//! ```

pub mod standard;

pub use standard::{
    FittedStats, SamplesSeen, ScalerState, StandardScaler, StandardScalerConfig,
    StandardScalerParams,
};
