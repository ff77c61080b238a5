//! # pipeline-transforms
//!
//! Pipeline-ready transformers for tabular data, with the semantics of their
//! scikit-learn counterparts:
//!
//! - [`StandardScaler`](preprocessing::StandardScaler) standardizes features
//!   with statistics accumulated incrementally over any number of batches,
//!   on dense or sparse data, treating NaN as missing.
//! - [`DropColumns`](preprocessing::DropColumns) removes named columns from a
//!   [`Frame`](data::Frame).
//!
//! ## Quick Start
//!
//! ```rust
//! use pipeline_transforms::data::Dataset;
//! use pipeline_transforms::preprocessing::StandardScaler;
//!
//! let data = Dataset::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.0, 0.0],
//!     vec![1.0, 1.0],
//!     vec![1.0, 1.0],
//! ])
//! .unwrap();
//!
//! let mut scaler = StandardScaler::new();
//! scaler.fit(&data).unwrap();
//! assert_eq!(scaler.mean().unwrap(), Some(vec![0.5, 0.5]));
//!
//! let new = Dataset::from_rows(&[vec![2.0, 2.0]]).unwrap();
//! let scaled = scaler.transform(&new).unwrap();
//! assert_eq!(scaled.to_dense()[[0, 0]], 3.0);
//! ```
//!
//! ## Module Structure
//!
//! - `data`: dense/sparse datasets and named-column frames
//! - `preprocessing`: transformers, their traits and errors
//! - `serialization`: parameter persistence formats

/// Dense, sparse and named-column data containers.
pub mod data;

/// Data preprocessing transformers for ML pipelines.
pub mod preprocessing;

/// Parameter persistence and format conversion utilities.
pub mod serialization;

pub use data::{Dataset, FeatureMatrix, Frame, SparseFormat, SparseMatrix};
pub use preprocessing::{DropColumns, Pipeline, PreprocessingError, StandardScaler};
