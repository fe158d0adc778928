// src/error.rs
//
// Error taxonomy for the decision core.
//
// Caller-facing operations surface these with a stable string code so the
// (external) request layer can map them to response statuses without matching
// on variant internals.

use std::fmt;

/// Errors produced by the environment, replay buffer and decision loop.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Missing or malformed required input. Client error.
    InvalidArgument { field: String, message: String },
    /// A referenced entity (place, activity, feedback row) does not exist.
    /// Client error.
    NotFound { what: String },
    /// The resolved location has zero activities, so no action index is
    /// meaningful. Surfaced to callers like `NotFound`.
    EmptyActionSpace { location: String },
    /// The store returned a state or location label outside the vocabulary
    /// fixed at environment construction. Fatal to the current request.
    Encoding { kind: &'static str, label: String },
    /// `sample` was called on an empty replay buffer. Programming error.
    EmptyBuffer,
    /// Store gateway failure. Propagated uncaught; the core never retries.
    Store { op: &'static str, message: String },
}

impl CoreError {
    /// Stable machine-readable code for the request layer.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidArgument { .. } => "invalid_argument",
            CoreError::NotFound { .. } => "not_found",
            CoreError::EmptyActionSpace { .. } => "not_found",
            CoreError::Encoding { .. } => "encoding_error",
            CoreError::EmptyBuffer => "empty_buffer",
            CoreError::Store { .. } => "store_error",
        }
    }

    /// True for errors the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidArgument { .. }
                | CoreError::NotFound { .. }
                | CoreError::EmptyActionSpace { .. }
        )
    }

    pub fn invalid_argument(field: &str, message: &str) -> Self {
        CoreError::InvalidArgument {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound { what: what.into() }
    }

    pub fn store(op: &'static str, message: impl Into<String>) -> Self {
        CoreError::Store {
            op,
            message: message.into(),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidArgument { field, message } => {
                write!(f, "Invalid argument '{}': {}", field, message)
            }
            CoreError::NotFound { what } => write!(f, "Not found: {}", what),
            CoreError::EmptyActionSpace { location } => {
                write!(f, "No activities available at '{}'", location)
            }
            CoreError::Encoding { kind, label } => {
                write!(f, "Unknown {} label '{}' (vocabulary is fixed)", kind, label)
            }
            CoreError::EmptyBuffer => write!(f, "Cannot sample from an empty replay buffer"),
            CoreError::Store { op, message } => {
                write!(f, "Store gateway failure in '{}': {}", op, message)
            }
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
