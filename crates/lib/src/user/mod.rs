//! User records
//!
//! Defines the [`User`] record and the rules for building one from raw,
//! loosely-typed backend JSON.

mod types;


use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

pub use types::{NewUser, User};

impl User {
    /// Build a user from a raw backend entry.
    ///
    /// The backend may omit any field, so every field is defaulted:
    /// `email`/`username` fall back to empty strings, `verified`/`active` to
    /// `false`, and the optional references and timestamps to `None`. Values
    /// that are present but falsy (empty strings, `0`, `false`, `null`) count
    /// as absent. The password is never read from backend data.
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: text_field(raw, "id"),
            email: text_field(raw, "email").unwrap_or_default(),
            username: text_field(raw, "username").unwrap_or_default(),
            password: None,
            owner: text_field(raw, "owner"),
            verified: flag_field(raw, "verified"),
            active: flag_field(raw, "active"),
            deleted: flag_field(raw, "deleted"),
            deleting: false,
            role: text_field(raw, "role"),
            created_at: timestamp_field(raw, "createdAt"),
            modified_at: timestamp_field(raw, "modifiedAt"),
            created_by: text_field(raw, "createdBy"),
            modified_by: text_field(raw, "modifiedBy"),
        }
    }
}

/// Whether a JSON value counts as "set" when defaulting fields.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        v if !is_truthy(v) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn flag_field(raw: &Value, key: &str) -> bool {
    raw.get(key).is_some_and(is_truthy)
}

fn timestamp_field(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    let value = raw.get(key).filter(|v| is_truthy(v))?;
    let parsed = match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!("ignoring unparseable {key} timestamp: {value}");
    }
    parsed
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
