//! Registration codes: invite codes a trainer consumes once at sign-up.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::auth::MessageResponse;
use crate::api::{de_id, de_opt_id, parse_timestamp, path_segment};
use crate::http::{ApiError, ApiRequest};
use crate::session::SessionStore;

const CODES_PATH: &str = "/admin/registration-codes";

/// A registration code as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationCode {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub code: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub created_by: Option<String>,
    pub expires_at: Option<String>,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub used_by: Option<String>,
    pub created_at: Option<String>,
    pub description: Option<String>,
}

/// Display status of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Active,
    Used,
    Expired,
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
        })
    }
}

impl RegistrationCode {
    /// Parsed expiry, if set and readable.
    #[must_use]
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at.as_deref().and_then(parse_timestamp)
    }

    /// Status as of `now`. A used code stays used even after it expires.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> CodeStatus {
        if self.is_used {
            CodeStatus::Used
        } else if self.expiry().is_some_and(|expiry| expiry <= now) {
            CodeStatus::Expired
        } else {
            CodeStatus::Active
        }
    }

    /// Status as of now.
    #[must_use]
    pub fn status(&self) -> CodeStatus {
        self.status_at(Utc::now())
    }
}

fn no_whitespace(code: &str) -> Result<(), ValidationError> {
    if code.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("whitespace");
        err.message = Some("Registration codes cannot contain spaces".into());
        return Err(err);
    }
    Ok(())
}

/// Body of `POST /admin/registration-codes`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewRegistrationCode {
    #[validate(
        length(min = 1, max = 64, message = "Registration code must be 1-64 characters"),
        custom(function = "no_whitespace")
    )]
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCode {
    #[serde(default)]
    pub message: String,
    pub code: RegistrationCode,
}

/// Registration code management (admin only).
pub struct CodeApi<'a> {
    session: &'a SessionStore,
}

impl<'a> CodeApi<'a> {
    #[must_use]
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    /// All codes, newest first.
    pub async fn list(&self) -> Result<Vec<RegistrationCode>, ApiError> {
        self.session.send(ApiRequest::get(CODES_PATH)).await
    }

    /// Create a code. Duplicate codes are rejected by the backend.
    pub async fn create(&self, new_code: &NewRegistrationCode) -> Result<RegistrationCode, ApiError> {
        new_code.validate()?;
        let created: CreatedCode = self
            .session
            .send(ApiRequest::post(CODES_PATH).with_json(new_code)?)
            .await?;
        Ok(created.code)
    }

    /// Mark a code usable again.
    pub async fn activate(&self, code_id: &str) -> Result<MessageResponse, ApiError> {
        let id = path_segment(code_id)?;
        self.session
            .send(ApiRequest::put(format!("{CODES_PATH}/{id}/activate")))
            .await
    }

    /// Mark a code as used so it can no longer be redeemed.
    pub async fn deactivate(&self, code_id: &str) -> Result<MessageResponse, ApiError> {
        let id = path_segment(code_id)?;
        self.session
            .send(ApiRequest::put(format!("{CODES_PATH}/{id}/deactivate")))
            .await
    }

    /// Delete an unused code.
    pub async fn delete(&self, code_id: &str) -> Result<MessageResponse, ApiError> {
        let id = path_segment(code_id)?;
        self.session
            .send(ApiRequest::delete(format!("{CODES_PATH}/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn code(is_used: bool, expires_at: Option<&str>) -> RegistrationCode {
        RegistrationCode {
            id: "c1".into(),
            code: "WELCOME".into(),
            created_by: None,
            expires_at: expires_at.map(str::to_string),
            is_used,
            used_by: None,
            created_at: None,
            description: None,
        }
    }

    #[test]
    fn test_code_status() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(code(false, None).status_at(now), CodeStatus::Active);
        assert_eq!(
            code(false, Some("2024-07-01T00:00:00+00:00")).status_at(now),
            CodeStatus::Active
        );
        assert_eq!(
            code(false, Some("2024-05-01T00:00:00+00:00")).status_at(now),
            CodeStatus::Expired
        );
        assert_eq!(
            code(true, Some("2024-05-01T00:00:00+00:00")).status_at(now),
            CodeStatus::Used
        );
    }

    #[test]
    fn test_new_code_validation() {
        let ok = NewRegistrationCode {
            code: "SPRING-24".into(),
            expires_at: None,
        };
        assert!(ok.validate().is_ok());

        let spaced = NewRegistrationCode {
            code: "SPRING 24".into(),
            expires_at: None,
        };
        assert!(spaced.validate().is_err());

        let empty = NewRegistrationCode {
            code: String::new(),
            expires_at: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_code_row_decoding() {
        let row: RegistrationCode = serde_json::from_str(
            r#"{"id": "9f1c", "code": "ABC123", "created_by": "a1", "expires_at": null, "is_used": false, "used_by": null, "created_at": "2024-01-01T00:00:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(row.code, "ABC123");
        assert_eq!(row.expiry(), None);
    }
}
