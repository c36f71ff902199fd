//! Error types for the Userbase backends.
//!
//! Backend failures surface to service callers unchanged; the service never
//! translates or retries them.

use thiserror::Error;

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Record not found by id.
    #[error("Record not found: {path}/{id}")]
    NotFound {
        /// The collection that was searched
        path: String,
        /// The id that was not found
        id: String,
    },

    /// The remote side answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The requested URL
        url: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("Request to {url} failed: {reason}")]
    Request {
        /// The requested URL
        url: String,
        /// Description of the transport failure
        reason: String,
    },

    /// A request or response body was not valid JSON for the expected type.
    #[error("Invalid body")]
    InvalidBody {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error while persisting or restoring a store.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A URL could not be built from the configured base and path.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL or fragment
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

impl BackendError {
    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::NotFound { .. } => true,
            BackendError::Status { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Check if this error is related to transport or addressing.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            BackendError::Request { .. } | BackendError::InvalidUrl { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. } | BackendError::InvalidBody { .. }
        )
    }

    /// Get the HTTP status if the remote side reported one.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = BackendError::NotFound {
            path: "Users".to_string(),
            id: "u1".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Record not found: Users/u1");

        let err = BackendError::Status {
            status: 404,
            url: "http://localhost/Users/u1".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = BackendError::Request {
            url: "http://localhost".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.is_transport_error());
        assert!(!err.is_not_found());

        let err = BackendError::FileIo {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "test"),
        };
        assert!(err.is_io_error());
    }

    #[test]
    fn test_error_conversion() {
        let err: crate::Error = BackendError::NotFound {
            path: "Users".to_string(),
            id: "x".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(err.is_backend_error());
        assert_eq!(err.module(), "backend");
    }
}
