//! Admin dashboard load.

use serde::Serialize;

use crate::api::admin::{AdminAnalytics, AdminApi, EndUserSummary, SystemHealth, TrainerSummary};
use crate::api::categories::{Category, CategoryApi};
use crate::api::codes::{CodeApi, CodeStatus, RegistrationCode};
use crate::dashboard::gather::{DegradationReport, Gathered};
use crate::http::ApiError;
use crate::session::SessionStore;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminDashboard {
    pub trainers: Vec<TrainerSummary>,
    pub users: Vec<EndUserSummary>,
    pub analytics: AdminAnalytics,
    pub codes: Vec<RegistrationCode>,
    pub categories: Vec<Category>,
    pub health: SystemHealth,
}

impl AdminDashboard {
    #[must_use]
    pub fn active_trainers(&self) -> usize {
        self.trainers.iter().filter(|t| t.is_active).count()
    }

    /// Codes that can still be redeemed.
    #[must_use]
    pub fn active_codes(&self) -> usize {
        self.codes
            .iter()
            .filter(|c| c.status() == CodeStatus::Active)
            .count()
    }
}

/// Fetch every admin source concurrently.
///
/// # Errors
///
/// Only [`ApiError::Unauthorized`]; other failures fall back per source.
pub async fn load_admin_dashboard(session: &SessionStore) -> Result<Gathered<AdminDashboard>, ApiError> {
    let admin = AdminApi::new(session);
    let codes = CodeApi::new(session);
    let categories = CategoryApi::new(session);

    let (trainers, users, analytics, code_list, category_list, health) = tokio::join!(
        admin.trainers(),
        admin.users(),
        admin.analytics(),
        codes.list(),
        categories.list(),
        admin.system_health(),
    );

    let mut report = DegradationReport::new();
    let dashboard = AdminDashboard {
        trainers: report.recover_default("trainers", trainers),
        users: report.recover_default("users", users),
        analytics: report.recover_default("analytics", analytics),
        codes: report.recover_default("registration codes", code_list),
        categories: report.recover_default("categories", category_list),
        health: report.recover(
            "system health",
            health,
            SystemHealth {
                status: "unknown".to_string(),
                ..SystemHealth::default()
            },
        ),
    };
    report.finish(dashboard)
}
