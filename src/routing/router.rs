//! Role router: which screen mounts for a route and session.

use std::fmt;

use serde::Serialize;

use crate::routing::guard::{GuardDecision, RouteGuard};
use crate::session::{Role, Session, UserProfile};

/// Navigable routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Register,
    /// Role-dispatched dashboard, also the default route.
    Dashboard,
    Admin,
    Trainer,
}

/// What actually gets shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Register,
    Loading,
    AdminDashboard,
    TrainerDashboard,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Loading => "loading",
            Self::AdminDashboard => "admin dashboard",
            Self::TrainerDashboard => "trainer dashboard",
        })
    }
}

impl Route {
    pub const ALL: [Route; 5] = [Self::Login, Self::Register, Self::Dashboard, Self::Admin, Self::Trainer];

    /// Guard for the route, `None` for public routes.
    #[must_use]
    pub fn guard(self) -> Option<RouteGuard> {
        match self {
            Self::Login | Self::Register => None,
            Self::Dashboard => Some(RouteGuard::any()),
            Self::Admin => Some(RouteGuard::only(&[Role::Admin])),
            Self::Trainer => Some(RouteGuard::only(&[Role::Trainer])),
        }
    }
}

/// Dashboard for a signed-in profile. Roles without a dashboard go to login.
#[must_use]
pub fn dashboard_for(user: &UserProfile) -> Screen {
    match user.role {
        Role::Admin => Screen::AdminDashboard,
        Role::Trainer => Screen::TrainerDashboard,
        Role::EndUser | Role::Unknown => Screen::Login,
    }
}

/// Where to go right after a successful login or registration.
#[must_use]
pub fn landing_screen(user: &UserProfile) -> Screen {
    dashboard_for(user)
}

/// Apply the route's guard, then the role dispatch.
#[must_use]
pub fn resolve(route: Route, session: &Session) -> Screen {
    let Some(guard) = route.guard() else {
        return match route {
            Route::Register => Screen::Register,
            _ => Screen::Login,
        };
    };

    match guard.check(session) {
        GuardDecision::Pending => Screen::Loading,
        GuardDecision::RedirectToLogin => Screen::Login,
        GuardDecision::Render => match route {
            Route::Admin => Screen::AdminDashboard,
            Route::Trainer => Screen::TrainerDashboard,
            _ => session.user.as_ref().map_or(Screen::Login, dashboard_for),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Credential;

    fn user(role: Role) -> UserProfile {
        UserProfile {
            id: "u1".into(),
            name: "Lee".into(),
            email: "lee@example.com".into(),
            role,
        }
    }

    #[test]
    fn test_dashboard_for_roles() {
        assert_eq!(dashboard_for(&user(Role::Admin)), Screen::AdminDashboard);
        assert_eq!(dashboard_for(&user(Role::Trainer)), Screen::TrainerDashboard);
        assert_eq!(dashboard_for(&user(Role::EndUser)), Screen::Login);
        assert_eq!(dashboard_for(&user(Role::Unknown)), Screen::Login);
    }

    #[test]
    fn test_resolve_dashboard_dispatches_by_role() {
        let admin = Session::authenticated(Credential::new("a"), user(Role::Admin));
        assert_eq!(resolve(Route::Dashboard, &admin), Screen::AdminDashboard);
        assert_eq!(resolve(Route::Trainer, &admin), Screen::Login);

        let trainer = Session::authenticated(Credential::new("t"), user(Role::Trainer));
        assert_eq!(resolve(Route::Dashboard, &trainer), Screen::TrainerDashboard);
        assert_eq!(resolve(Route::Admin, &trainer), Screen::Login);
    }

    #[test]
    fn test_public_routes() {
        assert_eq!(resolve(Route::Login, &Session::default()), Screen::Login);
        assert_eq!(resolve(Route::Register, &Session::anonymous()), Screen::Register);
    }

    #[test]
    fn test_loading_session() {
        assert_eq!(resolve(Route::Dashboard, &Session::default()), Screen::Loading);
    }
}
