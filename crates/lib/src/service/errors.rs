//! Error types for the user service.

use thiserror::Error;

/// Errors raised by [`UserService`](super::UserService) itself.
///
/// Backend failures are not wrapped here; they propagate as
/// [`crate::Error::Backend`] unchanged.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A response matched none of the shapes the operation accepts.
    #[error(
        "The loaded result does not match any expected format ({operation}: expected {expected}, got {found})"
    )]
    UnexpectedFormat {
        /// The service operation that received the response
        operation: &'static str,
        /// The JSON shape the operation accepts
        expected: &'static str,
        /// The JSON shape actually received
        found: &'static str,
    },

    /// An operation that addresses a single record was given no id.
    #[error("{operation} requires a user id")]
    MissingId {
        /// The service operation that was called
        operation: &'static str,
    },
}

impl ServiceError {
    /// Check if this error is a response of unexpected shape.
    pub fn is_format_error(&self) -> bool {
        matches!(self, ServiceError::UnexpectedFormat { .. })
    }

    /// Check if this error is a failed presence check.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ServiceError::MissingId { .. })
    }
}

// Conversion from ServiceError to the main Error type
impl From<ServiceError> for crate::Error {
    fn from(err: ServiceError) -> Self {
        crate::Error::Service(err)
    }
}
