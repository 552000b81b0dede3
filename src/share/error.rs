//! Share codec error types
//!
//! A [`CodecError`] describes why one link format could not read a token.
//! A [`DecodeFailure`] collects those reasons across every format tried.

use std::fmt;
use thiserror::Error;

use super::codec::ShareFormat;

/// Failure of a single decoding format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The transform produced no text
    #[error("decoded payload is empty")]
    Empty,

    /// Token is longer than any link this codec produces
    #[error("token is {length} characters, limit is {max}")]
    TooLong { length: usize, max: usize },

    /// LZ stream is malformed or uses symbols outside the URI alphabet
    #[error("decompression failed: {0}")]
    Decompress(String),

    /// Not valid base64
    #[error("base64 error: {0}")]
    Base64(String),

    /// Decoded bytes are not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(String),

    /// Payload is not valid JSON
    #[error("JSON error: {0}")]
    Json(String),

    /// Payload parsed but is not an array
    #[error("expected an array of records, found {0}")]
    NotASequence(&'static str),

    /// An array entry is not a valid triage record
    #[error("record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

impl From<base64::DecodeError> for CodecError {
    fn from(err: base64::DecodeError) -> Self {
        CodecError::Base64(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for CodecError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        CodecError::Utf8(err.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}

/// Every format rejected the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Attempted formats in order, each with its rejection reason
    pub attempts: Vec<(ShareFormat, CodecError)>,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no share format could decode the token")?;
        for (format, err) in &self.attempts {
            write!(f, "; {}: {}", format, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeFailure {}
