//! Drop Columns.
//!
//! Removes a fixed set of named columns from a [`Frame`]. Row order and the
//! order of the remaining columns are preserved. There is nothing to learn,
//! so `fit` is a no-op and the transform may be called right away.
//!
//! # Example
//! ```ignore
//! use pipeline_transforms::preprocessing::{DropColumns, UnknownColumns};
//!
//! let dropper = DropColumns::new(["id", "notes"]).on_unknown(UnknownColumns::Ignore);
//! let trimmed = dropper.transform(&frame)?;
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::Frame;
use crate::preprocessing::error::{PreprocessingError, Result};
use crate::preprocessing::traits::{PersistableTransformer, Transformer};

/// What to do with a requested column that the frame does not have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownColumns {
    /// Fail with [`PreprocessingError::ColumnNotFound`].
    #[default]
    Error,
    /// Skip it.
    Ignore,
}

/// Configuration for DropColumns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnsConfig {
    /// Names of the columns to remove.
    pub columns: Vec<String>,
    /// Policy for names missing from the input.
    pub unknown: UnknownColumns,
}

/// Stateless transformer removing named columns.
#[derive(Clone, Debug, Default)]
pub struct DropColumns {
    config: DropColumnsConfig,
}

impl DropColumns {
    /// Drop `columns`, failing on names the input does not have.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: DropColumnsConfig {
                columns: columns.into_iter().map(Into::into).collect(),
                unknown: UnknownColumns::Error,
            },
        }
    }

    /// Create from a configuration.
    pub fn from_config(config: DropColumnsConfig) -> Self {
        Self { config }
    }

    /// Set the unknown-column policy.
    pub fn on_unknown(mut self, policy: UnknownColumns) -> Self {
        self.config.unknown = policy;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &DropColumnsConfig {
        &self.config
    }

    /// Names of the columns to remove.
    pub fn columns(&self) -> &[String] {
        &self.config.columns
    }

    /// Return a copy of `frame` without the configured columns.
    pub fn transform(&self, frame: &Frame) -> Result<Frame> {
        let keep = self.kept_indices(frame)?;
        debug!(
            dropped = frame.columns().len() - keep.len(),
            kept = keep.len(),
            "DropColumns: projected frame"
        );
        Ok(frame.select(&keep))
    }

    /// Remove the configured columns from `frame` itself.
    pub fn transform_inplace(&self, frame: &mut Frame) -> Result<()> {
        *frame = self.transform(frame)?;
        Ok(())
    }

    fn kept_indices(&self, frame: &Frame) -> Result<Vec<usize>> {
        let present: HashSet<&str> = frame.columns().iter().map(String::as_str).collect();
        for name in &self.config.columns {
            if present.contains(name.as_str()) {
                continue;
            }
            match self.config.unknown {
                UnknownColumns::Error => {
                    return Err(PreprocessingError::ColumnNotFound(name.clone()))
                }
                UnknownColumns::Ignore => {
                    warn!(column = %name, "DropColumns: column not in frame, ignoring")
                }
            }
        }

        let dropped: HashSet<&str> = self.config.columns.iter().map(String::as_str).collect();
        Ok(frame
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !dropped.contains(name.as_str()))
            .map(|(i, _)| i)
            .collect())
    }
}

impl Transformer for DropColumns {
    type Input = Frame;
    type Output = Frame;

    /// Nothing to learn.
    fn fit(&mut self, _data: &Frame) -> Result<&mut Self> {
        Ok(self)
    }

    fn transform(&self, data: &Frame) -> Result<Frame> {
        DropColumns::transform(self, data)
    }
}

impl PersistableTransformer for DropColumns {
    type Params = DropColumnsConfig;

    fn extract_params(&self) -> DropColumnsConfig {
        self.config.clone()
    }

    fn from_params(params: DropColumnsConfig) -> Result<Self> {
        Ok(Self::from_config(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_test_frame() -> Frame {
        Frame::new(
            vec!["a", "b", "c"],
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_drop_single_column() {
        let frame = create_test_frame();
        let out = DropColumns::new(["b"]).transform(&frame).unwrap();

        assert_eq!(out.columns(), &["a", "c"]);
        assert_eq!(out.values(), &array![[1.0, 3.0], [4.0, 6.0]]);
        // input untouched
        assert_eq!(frame, create_test_frame());
    }

    #[test]
    fn test_drop_keeps_column_order() {
        let frame = create_test_frame();
        let out = DropColumns::new(["c", "a"]).transform(&frame).unwrap();
        assert_eq!(out.columns(), &["b"]);
        assert_eq!(out.values(), &array![[2.0], [5.0]]);
    }

    #[test]
    fn test_unknown_column_strict() {
        let result = DropColumns::new(["b", "zzz"]).transform(&create_test_frame());
        assert!(matches!(result, Err(PreprocessingError::ColumnNotFound(name)) if name == "zzz"));
    }

    #[test]
    fn test_unknown_column_ignored() {
        let out = DropColumns::new(["b", "zzz"])
            .on_unknown(UnknownColumns::Ignore)
            .transform(&create_test_frame())
            .unwrap();
        assert_eq!(out.columns(), &["a", "c"]);
    }

    #[test]
    fn test_idempotent_with_ignore() {
        let dropper = DropColumns::new(["b"]).on_unknown(UnknownColumns::Ignore);
        let once = dropper.transform(&create_test_frame()).unwrap();
        let twice = dropper.transform(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_drop_all_columns() {
        let out = DropColumns::new(["a", "b", "c"])
            .transform(&create_test_frame())
            .unwrap();
        assert_eq!(out.shape(), (2, 0));
    }

    #[test]
    fn test_transform_inplace() {
        let mut frame = create_test_frame();
        DropColumns::new(["a"]).transform_inplace(&mut frame).unwrap();
        assert_eq!(frame.columns(), &["b", "c"]);
    }

    #[test]
    fn test_failed_inplace_leaves_frame() {
        let mut frame = create_test_frame();
        assert!(DropColumns::new(["nope"]).transform_inplace(&mut frame).is_err());
        assert_eq!(frame, create_test_frame());
    }

    #[test]
    fn test_fit_transform_is_plain_transform() {
        let mut dropper = DropColumns::new(["a"]);
        let out = Transformer::fit_transform(&mut dropper, &create_test_frame()).unwrap();
        assert_eq!(out.columns(), &["b", "c"]);
    }

    #[test]
    fn test_params_json_roundtrip() {
        let dropper = DropColumns::new(["a", "c"]).on_unknown(UnknownColumns::Ignore);
        let json = dropper.to_json().unwrap();
        let restored = DropColumns::from_json(&json).unwrap();
        assert_eq!(restored.config(), dropper.config());
    }
}
