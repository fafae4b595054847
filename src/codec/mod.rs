//! JSON codec over serde.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("JSON deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Compact or pretty JSON encoding of serde types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub const COMPACT: JsonCodec = JsonCodec { pretty: false };
    pub const PRETTY: JsonCodec = JsonCodec { pretty: true };

    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.map_err(CodecError::Serialize)
    }

    pub fn deserialize<T: DeserializeOwned>(&self, json: &str) -> Result<T, CodecError> {
        serde_json::from_str(json).map_err(CodecError::Deserialize)
    }

    pub fn deserialize_reader<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<T, CodecError> {
        serde_json::from_reader(reader).map_err(CodecError::Deserialize)
    }

    /// Decodes `json`, falling back to `T::default()` on any error.
    pub fn deserialize_or_default<T: DeserializeOwned + Default>(&self, json: &str) -> T {
        match self.deserialize(json) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Using default after failed decode: {}", e);
                T::default()
            }
        }
    }

    pub fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<serde_json::Value, CodecError> {
        serde_json::to_value(value).map_err(CodecError::Serialize)
    }
}
