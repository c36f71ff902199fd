//! Core data types for user records

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user record as held by the service cache.
///
/// Serialized with camelCase field names to match the wire format of the
/// `Users` collection. `password` is write-only: it is accepted when
/// deserializing but never sent back out, and it is never populated when a
/// record is built from backend data. `deleting` is a transient UI flag and
/// does not travel over the wire at all.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend-assigned identifier. `None` until the record has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub username: String,

    /// Cleartext password, only used when registering a new user.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Identifier of the account that owns this user.
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub verified: bool,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub deleted: bool,

    /// Set by UIs while a delete is in flight.
    #[serde(skip)]
    pub deleting: bool,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default)]
    pub modified_by: Option<String>,
}

impl User {
    /// A fresh, unsaved user carrying the fields needed for registration.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Set the identifier, consuming and returning the record.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.username, self.email)?;
        match &self.id {
            Some(id) => write!(f, " [{id}]"),
            None => write!(f, " [unsaved]"),
        }
    }
}

/// Registration payload sent to the backend by `UserService::add`.
///
/// `owner` is always the backend's authenticated user, never a value taken
/// from the record being registered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl NewUser {
    /// Build the payload for `user`, owned by `owner`.
    pub fn from_user(user: &User, owner: Option<String>) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            owner,
        }
    }
}
