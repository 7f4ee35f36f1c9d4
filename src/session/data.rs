//! Data structures for the client-side session.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::http::Credential;

/// Role attached to a user profile by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Nutrition trainer.
    Trainer,
    /// Chatbot end user. Never issued a dashboard session by the backend.
    #[serde(rename = "user", alias = "end_user", alias = "end-user")]
    EndUser,
    /// Any role this client does not recognize, or no role at all.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Lowercase name used in output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Trainer => "trainer",
            Self::EndUser => "end-user",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn role_or_unknown<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Role>::deserialize(deserializer)?.unwrap_or_default())
}

/// Profile returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role; missing or unrecognized values become [`Role::Unknown`].
    #[serde(default, deserialize_with = "role_or_unknown")]
    pub role: Role,
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Before the boot-time restore has run.
    #[default]
    Uninitialized,
    /// A persisted token is being validated against `/auth/me`.
    Restoring,
    /// A validated token and profile are held.
    Authenticated,
    /// No usable token.
    Anonymous,
}

impl SessionPhase {
    /// True while the session is not yet settled.
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Restoring)
    }
}

/// Point-in-time view of the session, handed to the route guard and router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Current bearer credential.
    pub token: Option<Credential>,
    /// Validated profile; only present alongside `token`.
    pub user: Option<UserProfile>,
    /// True while restoring.
    pub loading: bool,
    /// Lifecycle phase.
    pub phase: SessionPhase,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            loading: true,
            phase: SessionPhase::Uninitialized,
        }
    }
}

impl Session {
    /// An authenticated session, mostly useful for tests and routing checks.
    #[must_use]
    pub fn authenticated(token: Credential, user: UserProfile) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            loading: false,
            phase: SessionPhase::Authenticated,
        }
    }

    /// A settled session with no identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
            loading: false,
            phase: SessionPhase::Anonymous,
        }
    }

    /// Signed in with a validated profile.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.token.is_some() && self.user.is_some()
    }

    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated() {
            self.user.as_ref().map(|user| user.role)
        } else {
            None
        }
    }

    /// Signed in as an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Signed in as a trainer.
    #[must_use]
    pub fn is_trainer(&self) -> bool {
        self.role() == Some(Role::Trainer)
    }
}
