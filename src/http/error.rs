//! Error taxonomy for calls against the coaching API.
//!
//! Every failure is terminal for the user action that caused it: nothing in
//! this crate retries. Callers turn an [`ApiError`] into a notice with
//! [`ApiError::user_message`].

use serde_json::Value;
use thiserror::Error;

/// Notice shown for connectivity failures.
pub const NETWORK_NOTICE: &str = "Unable to reach the server. Check your connection and try again.";

/// Notice shown when a session is no longer accepted by the backend.
pub const EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

/// A failed API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 401: the credential was missing, invalid or expired.
    #[error("unauthorized{}", fmt_detail(.detail))]
    Unauthorized { detail: Option<String> },

    /// Any other 4xx: the backend refused the payload or the action.
    #[error("request rejected (HTTP {status}){}", fmt_detail(.detail))]
    Rejected { status: u16, detail: Option<String> },

    /// 5xx: the backend failed while handling the request.
    #[error("server error (HTTP {status}){}", fmt_detail(.detail))]
    Server { status: u16, detail: Option<String> },

    /// A 2xx body that does not match the expected shape.
    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    /// The request failed local validation and was never sent.
    #[error("{0}")]
    Invalid(String),

    /// The operation needs a signed-in session and there is none.
    #[error("not signed in")]
    NotAuthenticated,
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl ApiError {
    /// Classify a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        match status {
            401 => Self::Unauthorized { detail },
            500..=599 => Self::Server { status, detail },
            _ => Self::Rejected { status, detail },
        }
    }

    /// True for HTTP 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The backend's error detail, if the response carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail }
            | Self::Rejected { detail, .. }
            | Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The backend detail, or `fallback` when there is none.
    ///
    /// Used by the auth flows, which surface whatever reason the backend gave
    /// regardless of the status code.
    #[must_use]
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            Self::Invalid(message) => message.clone(),
            _ => self.detail().unwrap_or(fallback).to_string(),
        }
    }

    /// The notice to show the user for this failure.
    ///
    /// Validation failures are surfaced verbatim; server faults and
    /// undecodable responses fall back to the caller's generic message.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Network(_) => NETWORK_NOTICE.to_string(),
            Self::Unauthorized { .. } => EXPIRED_NOTICE.to_string(),
            Self::Rejected { detail, .. } => detail.clone().unwrap_or_else(|| fallback.to_string()),
            Self::Server { .. } | Self::Decode { .. } => fallback.to_string(),
            Self::Invalid(message) => message.clone(),
            Self::NotAuthenticated => "Please log in to continue.".to_string(),
        }
    }
}

/// Pull a human-readable reason out of an error body.
///
/// The backend answers with `{"detail": "..."}`; request validation errors
/// come back as `{"detail": [{"msg": "...", ...}, ...]}`.
#[must_use]
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Invalid(errors.to_string())
    }
}
