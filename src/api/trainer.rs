//! Trainer endpoints: bot configuration, analytics and the trainer's users.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::api::auth::MessageResponse;
use crate::api::{de_id, de_opt_id};
use crate::http::{ApiError, ApiRequest};
use crate::session::SessionStore;

/// Most onboarding questions a trainer config may carry.
pub const MAX_ONBOARDING_QUESTIONS: usize = 5;

/// One onboarding question the bot asks new users. Fields beyond the question
/// text are kept as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OnboardingQuestion {
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// `GET /trainer/config`. A trainer without a stored config gets defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    #[serde(deserialize_with = "de_opt_id")]
    pub trainer_id: Option<String>,
    pub onboarding_questions: Vec<OnboardingQuestion>,
    pub diet_preferences: Vec<String>,
    pub general_notes: Option<String>,
    pub bot_personality: Option<String>,
    pub reminder_settings: Value,
}

/// `PUT /trainer/config`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct TrainerConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5, message = "At most 5 onboarding questions are allowed"))]
    pub onboarding_questions: Option<Vec<OnboardingQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_personality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_settings: Option<Value>,
}

impl TrainerConfigUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.onboarding_questions.is_none()
            && self.diet_preferences.is_none()
            && self.general_notes.is_none()
            && self.bot_personality.is_none()
            && self.reminder_settings.is_none()
    }
}

/// `GET /trainer/analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerAnalytics {
    pub total_messages: u64,
    pub daily_messages: BTreeMap<String, u64>,
    /// Messages in the last 7 days.
    pub recent_activity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyUserActivity {
    pub unique_users_count: u64,
    pub total_messages: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInteraction {
    #[serde(deserialize_with = "de_opt_id")]
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub total_messages: u64,
    pub last_interaction: Option<String>,
    pub created_at: Option<String>,
}

/// `GET /trainer/users-analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersAnalytics {
    pub total_users: u64,
    pub daily_user_activity: BTreeMap<String, DailyUserActivity>,
    pub user_interaction_stats: Vec<UserInteraction>,
}

impl UsersAnalytics {
    /// Users ordered by message count, busiest first.
    #[must_use]
    pub fn most_active(&self, limit: usize) -> Vec<&UserInteraction> {
        let mut stats: Vec<&UserInteraction> = self.user_interaction_stats.iter().collect();
        stats.sort_by(|a, b| b.total_messages.cmp(&a.total_messages));
        stats.truncate(limit);
        stats
    }
}

/// Row of `GET /trainer/users`. Profile columns vary, so everything beyond
/// the fields shown in listings is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerUser {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    pub last_interaction: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Trainer-only calls.
pub struct TrainerApi<'a> {
    session: &'a SessionStore,
}

impl<'a> TrainerApi<'a> {
    #[must_use]
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    pub async fn config(&self) -> Result<TrainerConfig, ApiError> {
        self.session.send(ApiRequest::get("/trainer/config")).await
    }

    /// Save config changes. The onboarding limit is checked before sending.
    pub async fn update_config(&self, update: &TrainerConfigUpdate) -> Result<MessageResponse, ApiError> {
        update.validate()?;
        if update.is_empty() {
            return Err(ApiError::Invalid("Nothing to update".to_string()));
        }
        self.session
            .send(ApiRequest::put("/trainer/config").with_json(update)?)
            .await
    }

    pub async fn analytics(&self) -> Result<TrainerAnalytics, ApiError> {
        self.session.send(ApiRequest::get("/trainer/analytics")).await
    }

    pub async fn users_analytics(&self) -> Result<UsersAnalytics, ApiError> {
        self.session.send(ApiRequest::get("/trainer/users-analytics")).await
    }

    pub async fn users(&self) -> Result<Vec<TrainerUser>, ApiError> {
        self.session.send(ApiRequest::get("/trainer/users")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_onboarding_limit() {
        let ok = TrainerConfigUpdate {
            onboarding_questions: Some(vec![OnboardingQuestion::new("q"); MAX_ONBOARDING_QUESTIONS]),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_many = TrainerConfigUpdate {
            onboarding_questions: Some(vec![OnboardingQuestion::new("q"); MAX_ONBOARDING_QUESTIONS + 1]),
            ..Default::default()
        };
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let update = TrainerConfigUpdate {
            general_notes: Some("Prefers mornings".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"general_notes": "Prefers mornings"}));
        assert!(TrainerConfigUpdate::default().is_empty());
    }

    #[test]
    fn test_default_config_payload() {
        let config: TrainerConfig = serde_json::from_str(
            r#"{"trainer_id": "t1", "onboarding_questions": [], "diet_preferences": [], "general_notes": "", "bot_personality": "", "reminder_settings": {}}"#,
        )
        .unwrap();
        assert_eq!(config.trainer_id.as_deref(), Some("t1"));
        assert!(config.onboarding_questions.is_empty());
    }

    #[test]
    fn test_onboarding_questions_are_objects() {
        let update = TrainerConfigUpdate {
            onboarding_questions: Some(vec![OnboardingQuestion::new("How old are you?")]),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"onboarding_questions": [{"question": "How old are you?"}]}));

        let config: TrainerConfig = serde_json::from_str(
            r#"{"onboarding_questions": [{"question": "Goal?", "required": true}]}"#,
        )
        .unwrap();
        assert_eq!(config.onboarding_questions[0].question, "Goal?");
        let back = serde_json::to_value(&config.onboarding_questions[0]).unwrap();
        assert_eq!(back, json!({"question": "Goal?", "required": true}));
    }

    #[test]
    fn test_analytics_recent_activity_is_a_count() {
        let analytics: TrainerAnalytics = serde_json::from_str(
            r#"{"total_messages": 12, "daily_messages": {"2024-06-01": 3}, "recent_activity": 4}"#,
        )
        .unwrap();
        assert_eq!(analytics.recent_activity, 4);
        assert_eq!(analytics.daily_messages["2024-06-01"], 3);
    }

    #[test]
    fn test_trainer_user_keeps_extra_columns() {
        let user: TrainerUser = serde_json::from_str(
            r#"{"id": 77, "name": "Sam", "timezone": "Europe/Kyiv", "message_count": 4, "last_interaction": null}"#,
        )
        .unwrap();
        assert_eq!(user.id, "77");
        assert_eq!(user.message_count, 4);
        assert_eq!(user.extra.get("timezone"), Some(&json!("Europe/Kyiv")));
    }

    #[test]
    fn test_most_active_users() {
        let analytics: UsersAnalytics = serde_json::from_str(
            r#"{"total_users": 3, "user_interaction_stats": [
                {"user_id": 1, "user_name": "A", "total_messages": 2},
                {"user_id": 2, "user_name": "B", "total_messages": 9},
                {"user_id": 3, "user_name": "C", "total_messages": 5}
            ]}"#,
        )
        .unwrap();
        let top: Vec<_> = analytics
            .most_active(2)
            .into_iter()
            .map(|u| u.user_name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(top, vec!["B", "C"]);
    }
}
