//! Error types for relq

use crate::wire::WireKind;
use thiserror::Error;

/// Result type alias for relq operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for query construction, rendering and row decoding
#[derive(Debug, Error)]
pub enum SqlError {
    /// Identifier failed validation
    #[error("Invalid identifier: {0}")]
    Identifier(String),

    /// Operation refused by the active dialect
    #[error("{operation} is not supported by the {dialect} dialect")]
    Unsupported {
        operation: String,
        dialect: &'static str,
    },

    /// Builder API misuse (fail fast, not recoverable)
    #[error("Usage error: {0}")]
    Usage(String),

    /// NULL encountered while reading through a non-nullable type
    #[error("Column {index}: unexpected NULL for non-nullable {wire_name}")]
    UnexpectedNull { index: usize, wire_name: String },

    /// Column value could not be coerced to the expected native type
    #[error(
        "Column {index}: cannot read {actual} value as {expected} (accepted: {accepted})"
    )]
    TypeMismatch {
        index: usize,
        actual: WireKind,
        expected: String,
        accepted: String,
        #[source]
        cause: Option<Box<SqlError>>,
    },

    /// The driver cannot produce this wire shape through its typed getter
    #[error("Typed read not supported for {0}")]
    TypedRead(WireKind),

    /// Native value could not be converted to its wire representation
    #[error("Value conversion error: {0}")]
    Value(String),

    /// One or more resource releases failed; all failures are reported together
    #[error("Resource release failed: {message}")]
    Resource {
        message: String,
        suppressed: Vec<SqlError>,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl SqlError {
    /// Create a dialect-refusal error
    pub fn unsupported(operation: impl Into<String>, dialect: &'static str) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            dialect,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create an identifier validation error
    pub fn identifier(message: impl Into<String>) -> Self {
        Self::Identifier(message.into())
    }

    /// Create a value conversion error
    pub fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a coercion failure naming the column index, the wire shape that was
    /// actually present and the list of shapes the reader accepts.
    pub fn type_mismatch(
        index: usize,
        actual: WireKind,
        expected: impl Into<String>,
        accepted: &[WireKind],
        cause: Option<SqlError>,
    ) -> Self {
        let accepted = accepted
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self::TypeMismatch {
            index,
            actual,
            expected: expected.into(),
            accepted,
            cause: cause.map(Box::new),
        }
    }

    /// Combine a set of failures (a read error plus the release errors that
    /// followed it) into a single reported error, so that no failure masks another.
    ///
    /// With a single error this is the identity; with several, the message names
    /// them all and the tail is kept as `suppressed`.
    pub fn aggregate(errors: Vec<SqlError>) -> Self {
        let mut errors = errors;
        match errors.len() {
            0 => Self::usage("aggregate called with no errors"),
            1 => errors.remove(0),
            _ => {
                let message = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                Self::Resource {
                    message,
                    suppressed: errors,
                }
            }
        }
    }

    /// Check if this is a dialect-refusal error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is a coercion failure
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
