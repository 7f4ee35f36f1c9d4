//! Route guard: may a screen render for the current session?

use serde::Serialize;

use crate::session::{Role, Session};

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    /// The guarded screen may render.
    Render,
    /// The session is still being restored; show the loading indicator.
    Pending,
    /// Send the user to the login screen.
    RedirectToLogin,
}

/// Static guard configuration for one route.
///
/// An empty role set admits any authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    allowed: &'static [Role],
}

impl RouteGuard {
    /// Admit any authenticated user.
    #[must_use]
    pub const fn any() -> Self {
        Self { allowed: &[] }
    }

    /// Admit authenticated users whose role is in `roles`.
    #[must_use]
    pub const fn only(roles: &'static [Role]) -> Self {
        Self { allowed: roles }
    }

    /// Decide for `session`. Pure; the session is not touched.
    #[must_use]
    pub fn check(&self, session: &Session) -> GuardDecision {
        if session.loading {
            return GuardDecision::Pending;
        }
        match session.role() {
            Some(role) if self.allowed.is_empty() || self.allowed.contains(&role) => GuardDecision::Render,
            _ => GuardDecision::RedirectToLogin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Credential;
    use crate::session::UserProfile;

    fn signed_in(role: Role) -> Session {
        Session::authenticated(
            Credential::new("tok"),
            UserProfile {
                id: "1".into(),
                name: "Pat".into(),
                email: "pat@example.com".into(),
                role,
            },
        )
    }

    #[test]
    fn test_any_admits_every_authenticated_role() {
        let guard = RouteGuard::any();
        assert_eq!(guard.check(&signed_in(Role::Admin)), GuardDecision::Render);
        assert_eq!(guard.check(&signed_in(Role::Unknown)), GuardDecision::Render);
        assert_eq!(guard.check(&Session::anonymous()), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn test_trainer_denied_admin_route() {
        let guard = RouteGuard::only(&[Role::Admin]);
        assert_eq!(guard.check(&signed_in(Role::Trainer)), GuardDecision::RedirectToLogin);
        assert_eq!(guard.check(&signed_in(Role::Admin)), GuardDecision::Render);
    }

    #[test]
    fn test_loading_is_pending() {
        let guard = RouteGuard::only(&[Role::Admin]);
        assert_eq!(guard.check(&Session::default()), GuardDecision::Pending);
    }
}
