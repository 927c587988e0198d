//! # Type Errors
//!
//! Errors raised while parsing or decoding shared IBC types.

use thiserror::Error;

/// Errors for the shared type layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Serialization of a value failed.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Bytes could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A height string was not of the form `<revision>-<height>`.
    #[error("Invalid height: {0}")]
    InvalidHeight(String),

    /// An `Any` envelope carried a type URL nobody understands.
    #[error("Unknown type url: {0}")]
    UnknownType(String),

    /// An identifier was empty or contained a path separator.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A channel acknowledgement envelope was malformed.
    #[error("Invalid acknowledgement: {0}")]
    InvalidAcknowledgement(String),
}

/// Check that an identifier is usable as a store path segment.
pub fn validate_identifier(id: &str) -> Result<(), TypesError> {
    if id.trim().is_empty() {
        return Err(TypesError::InvalidIdentifier("identifier cannot be blank".into()));
    }
    if id.contains('/') {
        return Err(TypesError::InvalidIdentifier(format!(
            "identifier {id} cannot contain '/'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("07-tendermint-0").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier("a/b").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = TypesError::UnknownType("/foo.Bar".into());
        assert_eq!(err.to_string(), "Unknown type url: /foo.Bar");
    }
}
