//! # Codec
//!
//! Deterministic binary encoding (bincode over serde) and the `Any`
//! envelope used to carry type-tagged client, consensus and header values.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::TypesError;

/// Encode a value to bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, TypesError> {
    bincode::serialize(value).map_err(|e| TypesError::Encode(e.to_string()))
}

/// Decode a value from bytes. Trailing bytes are rejected.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TypesError> {
    use bincode::Options;
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .deserialize(bytes)
        .map_err(|e| TypesError::Decode(e.to_string()))
}

/// A type-tagged opaque value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Any {
    /// Type URL naming the concrete variant.
    pub type_url: String,
    /// Encoded variant.
    pub value: Vec<u8>,
}

impl Any {
    /// Pack `value` under `type_url`.
    pub fn pack<T: Serialize>(type_url: &str, value: &T) -> Result<Self, TypesError> {
        Ok(Self {
            type_url: type_url.to_string(),
            value: encode(value)?,
        })
    }

    /// Unpack the value, requiring `type_url` to match.
    pub fn unpack<T: DeserializeOwned>(&self, type_url: &str) -> Result<T, TypesError> {
        if self.type_url != type_url {
            return Err(TypesError::UnknownType(self.type_url.clone()));
        }
        decode(&self.value)
    }

    /// Bytes of the whole envelope, as committed to a store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypesError> {
        encode(self)
    }

    /// Parse an envelope from committed bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        decode(bytes)
    }
}
