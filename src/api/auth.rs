//! Wire types for `/auth/*`.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /auth/login`
pub const LOGIN_PATH: &str = "/auth/login";
/// `POST /auth/register`
pub const REGISTER_PATH: &str = "/auth/register";
/// `GET /auth/me`
pub const ME_PATH: &str = "/auth/me";
/// `PUT /auth/change-name`
pub const CHANGE_NAME_PATH: &str = "/auth/change-name";
/// `PUT /auth/change-password`
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Registration code is required"))]
    pub registration_code: String,
}

/// Issued by `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChangeNameRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

/// Generic `{"message": ...}` acknowledgement used by most mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
