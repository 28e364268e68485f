//! Error types for the pet scheduler client.
//!
//! # Design
//! Network failures, HTTP rejections and form validation failures are kept
//! apart so callers can tell a retryable failure from one the user must fix.
//! `HttpError::body` carries whatever message the failing operation surfaces:
//! the response text for pet mutations, a fixed string for list and status
//! calls. Its `Display` is exactly that message.

use std::fmt;

/// A form field that failed client-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Pet,
    DueAt,
    PetName,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Field::Title => "Please enter a title.",
            Field::Pet => "Please select a pet.",
            Field::DueAt => "Please select date and time.",
            Field::PetName => "Please enter a pet name.",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The transport could not complete the exchange (connect, timeout, reset).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The server answered with a non-success status.
    #[error("{body}")]
    HttpError { status: u16, body: String },

    /// A form field was missing or malformed; nothing was sent.
    #[error("{field}")]
    ValidationError { field: Field },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether repeating the same request unchanged might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkFailure(_) => true,
            ApiError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The message to show the user, or `fallback` when the server sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            fallback.to_string()
        } else {
            msg
        }
    }
}
