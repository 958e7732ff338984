//! Error handling for annotation parsing and mask conversion.
//!
//! One enum covers the whole library: malformed tokens, truncated and
//! structurally broken files, invalid arguments, and failures of the
//! CSV/JSON collaborators used by export and point lookup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchoregionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid format '{value}': {reason}")]
    Format { value: String, reason: String },

    #[error("Unexpected end of file in {source_name} at line {line}: expected {expected}")]
    TruncatedFile {
        source_name: String,
        line: usize,
        expected: String,
    },

    #[error("Parse error in {source_name} at line {line}: {reason}")]
    Parse {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("Invalid argument type: {message}")]
    InvalidType { message: String },
}

impl EchoregionsError {
    pub fn format(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn truncated(
        source_name: impl Into<String>,
        line: usize,
        expected: impl Into<String>,
    ) -> Self {
        Self::TruncatedFile {
            source_name: source_name.into(),
            line,
            expected: expected.into(),
        }
    }

    pub fn parse(source_name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::InvalidType {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EchoregionsError>;
