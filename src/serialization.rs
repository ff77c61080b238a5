//! Serialization of fitted transformer parameters.
//!
//! Parameter structs are plain data (`Vec<f64>`, flags, names), so any type
//! implementing serde's traits gets binary (bincode) and JSON encodings for
//! free through the blanket impl below.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::preprocessing::error::Result;

/// Parameter representations that can be turned into bytes and back.
pub trait SerializableParams: Sized {
    /// Compact binary encoding.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Decode from [`SerializableParams::to_bytes`] output.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Human-readable JSON encoding.
    fn to_json(&self) -> Result<String>;

    /// Decode from [`SerializableParams::to_json`] output.
    fn from_json(json: &str) -> Result<Self>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::error::PreprocessingError;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        weights: Vec<f64>,
        enabled: bool,
    }

    #[test]
    fn test_bytes_roundtrip() {
        let params = Params {
            weights: vec![0.5, -1.0],
            enabled: true,
        };
        let bytes = params.to_bytes().unwrap();
        assert_eq!(Params::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn test_json_is_readable() {
        let params = Params {
            weights: vec![1.0],
            enabled: false,
        };
        let json = params.to_json().unwrap();
        assert_eq!(json, r#"{"weights":[1.0],"enabled":false}"#);
    }

    #[test]
    fn test_from_bytes_garbage() {
        let result = Params::from_bytes(&[0xff]);
        assert!(matches!(
            result,
            Err(PreprocessingError::SerializationError(_))
        ));
    }
}
