//! Role-gated navigation: the route guard and the role router.

pub mod guard;
pub mod router;

pub use guard::{GuardDecision, RouteGuard};
pub use router::{dashboard_for, landing_screen, resolve, Route, Screen};
