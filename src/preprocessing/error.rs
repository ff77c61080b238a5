//! Error types for preprocessing operations.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// The requested combination of options cannot be applied to this input.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A fitted-only operation was called on an unfitted transformer.
    #[error("Not fitted: {0} must be fitted before use")]
    NotFitted(&'static str),
    /// Feature dimension mismatch.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// A named column does not exist in the frame.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// A column name appears more than once.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    /// Shape mismatch between expected and actual dimensions.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// Infinite value where only finite numbers or NaN are accepted.
    #[error("Non-finite value {value} at row {row}, column {col}")]
    NonFiniteValue { row: usize, col: usize, value: f64 },
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    CsvError(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for PreprocessingError {
    fn from(err: serde_json::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for PreprocessingError {
    fn from(err: csv::Error) -> Self {
        PreprocessingError::CsvError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_configuration() {
        let err = PreprocessingError::InvalidConfiguration("sparse input".to_string());
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_error_display_not_fitted() {
        let err = PreprocessingError::NotFitted("StandardScaler");
        assert_eq!(
            err.to_string(),
            "Not fitted: StandardScaler must be fitted before use"
        );
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PreprocessingError::FeatureMismatch {
            expected_features: 5,
            got_features: 3,
        };
        assert_eq!(
            err.to_string(),
            "Feature mismatch: expected 5 features, got 3"
        );
    }

    #[test]
    fn test_error_display_column_not_found() {
        let err = PreprocessingError::ColumnNotFound("age".to_string());
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_error_display_non_finite() {
        let err = PreprocessingError::NonFiniteValue {
            row: 1,
            col: 2,
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "Non-finite value inf at row 1, column 2");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PreprocessingError = io_err.into();
        assert!(matches!(err, PreprocessingError::IoError(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let bincode_result: std::result::Result<String, bincode::Error> =
            bincode::deserialize(bad_bytes);
        if let Err(e) = bincode_result {
            let err: PreprocessingError = e.into();
            assert!(matches!(err, PreprocessingError::SerializationError(_)));
        }
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<Vec<f64>>("not json").unwrap_err();
        let err: PreprocessingError = json_err.into();
        assert!(matches!(err, PreprocessingError::SerializationError(_)));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PreprocessingError::EmptyData("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
