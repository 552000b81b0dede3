//! Board error types

use thiserror::Error;

use crate::share::CodecError;

/// Errors raised by record collection operations
#[derive(Error, Debug)]
pub enum BoardError {
    /// No record has the requested id
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Record violates the total invariant or is otherwise malformed
    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// Serializing the collection for a share link failed
    #[error("Share encoding failed: {0}")]
    Encode(#[from] CodecError),
}

/// Result type alias for board operations
pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::RecordNotFound("42".to_string());
        assert_eq!(err.to_string(), "Record not found: 42");

        let err = BoardError::InvalidRecord {
            id: "7".to_string(),
            reason: "total mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid record 7: total mismatch");
    }
}
