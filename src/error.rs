//! Error types for the gridclerk library.

use std::io;
use thiserror::Error;

/// Result type alias for gridclerk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document conversion.
///
/// Document *content* problems (malformed spans, unmatched tables,
/// non-numeric amount cells) are repaired or degraded in place and never
/// surface here; this enum covers only the genuine failure surface of the
/// crate: I/O, serialization, and invalid caller input.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An explicitly requested document type string is not one of the
    /// nine supported identifiers.
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    /// Error serializing the result payload to JSON.
    #[error("JSON serialization error: {0}")]
    Serialize(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownDocumentType("fooReport".to_string());
        assert_eq!(err.to_string(), "Unknown document type: fooReport");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
