//! Userbase: a cached, observable collection of user records backed by a remote service.
//!
//! ## Core Concepts
//!
//! * **Users (`user::User`)**: The record type. Built from raw backend JSON with `User::from_raw`.
//! * **Backends (`backend::Backend`)**: A pluggable remote store. Calls return a tagged
//!   `backend::Payload`, either a response envelope or a JSON value.
//!     * **InMemory (`backend::InMemory`)**: A thread-safe store for development and tests.
//!     * **HttpBackend (`backend::HttpBackend`)**: A REST client built on `reqwest`.
//! * **UserService (`service::UserService`)**: Loads, creates, updates and deletes users,
//!   keeping an in-memory copy that is republished after every mutation.
//! * **Snapshots (`snapshot::Snapshot`)**: Immutable point-in-time copies of the cached users.
//!   A new container is allocated for each publication.
//! * **Dispatchers (`dispatch::Dispatcher`)**: Decide where publications run, either inline
//!   or on a dedicated task queue.

pub mod backend;
pub mod clock;
pub mod dispatch;
pub mod pagination;
pub mod server;
pub mod service;
pub mod snapshot;
pub mod user;

pub use backend::{Backend, Envelope, Payload};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use pagination::Pagination;
pub use service::UserService;
pub use snapshot::Snapshot;
pub use user::User;

/// Result type used throughout the Userbase library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Userbase library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured backend errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured service errors from the service module
    #[error(transparent)]
    Service(service::ServiceError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Service(_) => "service",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a response that matched none of the expected shapes.
    pub fn is_format_error(&self) -> bool {
        match self {
            Error::Service(service_err) => service_err.is_format_error(),
            _ => false,
        }
    }

    /// Check if this error was raised by the backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is a failed local presence check.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Service(service_err) => service_err.is_validation_error(),
            _ => false,
        }
    }
}
