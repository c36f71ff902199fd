//! Backend implementations for Userbase
//!
//! This module provides the [`Backend`] trait that the service talks to and
//! the concrete implementations shipped with the crate.
//!
//! A backend performs the remote calls for a named collection (the service
//! uses `"Users"`) and hands back a [`Payload`]. The payload is tagged by the
//! backend itself, so callers never have to sniff the runtime shape of a
//! response to decide whether it needs deserializing.

use async_trait::async_trait;
use serde_json::Value;

use crate::{Pagination, Result, user::User};

mod errors;
pub mod http;
pub mod in_memory;

pub use errors::BackendError;
pub use http::{HttpBackend, HttpBackendConfig};
pub use in_memory::InMemory;

/// A raw response that still has to be deserialized.
///
/// HTTP-style backends return one of these per call; the body is only
/// parsed when the caller asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Status code reported by the remote side.
    pub status: u16,
    /// Undecoded response body.
    pub body: String,
}

impl Envelope {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Deserialize the body as JSON.
    ///
    /// An empty body decodes to `null` so bodiless success responses (such
    /// as `204 No Content`) can still be acknowledged.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|source| BackendError::InvalidBody { source }.into())
    }
}

/// The result of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A response envelope whose body must be deserialized.
    Envelope(Envelope),
    /// An already-decoded JSON value.
    Value(Value),
}

impl Payload {
    /// Resolve the payload to a JSON value, deserializing envelopes.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Payload::Envelope(envelope) => envelope.json(),
            Payload::Value(value) => Ok(value),
        }
    }

    /// Short description of the payload's form, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Envelope(_) => "envelope",
            Payload::Value(value) => json_kind(value),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

impl From<Envelope> for Payload {
    fn from(envelope: Envelope) -> Self {
        Payload::Envelope(envelope)
    }
}

/// Name of a JSON value's type.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Remote store abstraction used by [`UserService`](crate::UserService).
///
/// Every call addresses a collection by `path` (for example `"Users"`).
/// Implementations must be `Send + Sync` so a single backend can be shared
/// between services and tasks.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List a collection, optionally paginated.
    async fn load(&self, path: &str, pagination: Option<&Pagination>) -> Result<Payload>;

    /// Fetch a single record by id.
    async fn get_by_id(&self, path: &str, id: &str) -> Result<Payload>;

    /// Create a record from a serialized JSON body.
    async fn push(&self, path: &str, body: String) -> Result<Payload>;

    /// Replace the record with the given id.
    async fn set(&self, path: &str, id: &str, user: &User) -> Result<Payload>;

    /// Remove the record with the given id.
    async fn remove(&self, path: &str, id: &str) -> Result<Payload>;

    /// Identifier of the currently authenticated user, if any.
    fn user_id(&self) -> Option<String>;
}
