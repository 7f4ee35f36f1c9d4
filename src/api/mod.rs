//! Typed calls against the coaching backend's REST endpoints.
//!
//! Each area gets a small borrowed handle over the [`SessionStore`] so that
//! every call goes through the store's credential handling and 401
//! interception:
//!
//! ```no_run
//! # async fn demo(session: &coachdash::session::SessionStore) -> Result<(), coachdash::http::ApiError> {
//! use coachdash::api::admin::AdminApi;
//!
//! let trainers = AdminApi::new(session).trainers().await?;
//! println!("{} trainers", trainers.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`SessionStore`]: crate::session::SessionStore

pub mod admin;
pub mod auth;
pub mod categories;
pub mod codes;
pub mod questions;
pub mod reminders;
pub mod trainer;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::http::ApiError;

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 with offset, naive date-times (taken as UTC) and bare
/// dates.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate a record id before it is placed in a URL path.
pub(crate) fn path_segment(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ApiError::Invalid(format!("invalid id: {id:?}")));
    }
    Ok(id)
}

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ids are UUID strings on most tables and integers on some; keep both as text.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| serde::de::Error::custom("expected a string or numeric id"))
}

/// Optional variant of [`de_id`].
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(id_from_value))
}
