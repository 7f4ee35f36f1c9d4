//! Admin endpoints: trainers, end users, analytics and system health.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::{de_id, de_opt_id, path_segment};
use crate::http::{ApiError, ApiRequest};
use crate::session::SessionStore;

fn default_true() -> bool {
    true
}

/// Row of `GET /admin/trainers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSummary {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub message_count: u64,
    pub last_activity: Option<String>,
}

/// Row of `GET /admin/users`: a chatbot end user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndUserSummary {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub location: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub selected_trainer_id: Option<String>,
    pub trainer_name: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    pub last_interaction: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsOverview {
    pub total_trainers: u64,
    pub total_users: u64,
    pub total_messages: u64,
    pub active_trainers: u64,
    pub recent_messages_7_days: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerPerformance {
    pub trainer_id: String,
    pub trainer_name: String,
    pub total_messages: u64,
    pub total_users: u64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeUsageStats {
    pub total_codes: u64,
    pub used_codes: u64,
    pub active_codes: u64,
    pub usage_rate: f64,
}

/// `GET /admin/analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminAnalytics {
    pub overview: AnalyticsOverview,
    pub trainer_performance: Vec<TrainerPerformance>,
    pub daily_messages: BTreeMap<String, u64>,
    pub registration_codes: CodeUsageStats,
}

/// `GET /admin/system-health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemHealth {
    pub status: String,
    pub checks: BTreeMap<String, String>,
    pub timestamp: Option<String>,
}

impl SystemHealth {
    /// Checks whose value is not `healthy`.
    #[must_use]
    pub fn failing_checks(&self) -> Vec<(&str, &str)> {
        self.checks
            .iter()
            .filter(|(_, status)| status.as_str() != "healthy")
            .map(|(name, status)| (name.as_str(), status.as_str()))
            .collect()
    }
}

/// `PUT /admin/trainers/{id}/toggle-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerStatusChange {
    #[serde(default)]
    pub message: String,
    #[serde(deserialize_with = "de_id")]
    pub trainer_id: String,
    pub is_active: bool,
}

/// Admin-only calls.
pub struct AdminApi<'a> {
    session: &'a SessionStore,
}

impl<'a> AdminApi<'a> {
    #[must_use]
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    pub async fn trainers(&self) -> Result<Vec<TrainerSummary>, ApiError> {
        self.session.send(ApiRequest::get("/admin/trainers")).await
    }

    /// Flip a trainer between active and inactive.
    pub async fn toggle_trainer(&self, trainer_id: &str) -> Result<TrainerStatusChange, ApiError> {
        let id = path_segment(trainer_id)?;
        self.session
            .send(ApiRequest::put(format!("/admin/trainers/{id}/toggle-status")))
            .await
    }

    pub async fn users(&self) -> Result<Vec<EndUserSummary>, ApiError> {
        self.session.send(ApiRequest::get("/admin/users")).await
    }

    pub async fn analytics(&self) -> Result<AdminAnalytics, ApiError> {
        self.session.send(ApiRequest::get("/admin/analytics")).await
    }

    pub async fn system_health(&self) -> Result<SystemHealth, ApiError> {
        self.session.send(ApiRequest::get("/admin/system-health")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainer_summary_defaults() {
        let trainer: TrainerSummary = serde_json::from_str(
            r#"{"id": "t1", "name": "John", "email": "john@fit.io", "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(trainer.is_active);
        assert_eq!(trainer.user_count, 0);
        assert_eq!(trainer.last_activity, None);
    }

    #[test]
    fn test_admin_analytics_partial_payload() {
        let analytics: AdminAnalytics = serde_json::from_str(
            r#"{
                "overview": {"total_trainers": 2, "total_users": 5},
                "trainer_performance": [{"trainer_id": "1", "trainer_name": "John Trainer", "total_messages": 25, "total_users": 5, "is_active": true}],
                "registration_codes": {"total_codes": 2, "used_codes": 1, "active_codes": 1, "usage_rate": 50.0}
            }"#,
        )
        .unwrap();
        assert_eq!(analytics.overview.total_trainers, 2);
        assert_eq!(analytics.overview.total_messages, 0);
        assert_eq!(analytics.trainer_performance[0].total_messages, 25);
        assert!(analytics.daily_messages.is_empty());
        assert!((analytics.registration_codes.usage_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_end_user_numeric_ids() {
        let user: EndUserSummary = serde_json::from_str(
            r#"{"id": 123456789, "name": "Dana", "weight": 72.5, "selected_trainer_id": null, "trainer_name": "No trainer"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "123456789");
        assert_eq!(user.selected_trainer_id, None);
        assert_eq!(user.weight, Some(72.5));
    }

    #[test]
    fn test_system_health_failing_checks() {
        let health: SystemHealth = serde_json::from_str(
            r#"{"status": "degraded", "checks": {"database": "healthy", "users_table": "error: timeout"}}"#,
        )
        .unwrap();
        assert_eq!(health.failing_checks(), vec![("users_table", "error: timeout")]);
    }
}
