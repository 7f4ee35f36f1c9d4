//! Trainer dashboard load.

use serde::Serialize;

use crate::api::categories::{Category, CategoryApi};
use crate::api::questions::{display_order, Question, QuestionApi};
use crate::api::reminders::{ReminderApi, ReminderSettings};
use crate::api::trainer::{TrainerAnalytics, TrainerApi, TrainerConfig, TrainerUser, UsersAnalytics};
use crate::dashboard::gather::{DegradationReport, Gathered};
use crate::http::ApiError;
use crate::session::SessionStore;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainerDashboard {
    pub config: TrainerConfig,
    pub analytics: TrainerAnalytics,
    pub users_analytics: UsersAnalytics,
    pub users: Vec<TrainerUser>,
    pub questions: Vec<Question>,
    pub categories: Vec<Category>,
    pub reminders: ReminderSettings,
}

/// Fetch every trainer source concurrently.
///
/// Questions come back in display order.
///
/// # Errors
///
/// Only [`ApiError::Unauthorized`]; other failures fall back per source.
pub async fn load_trainer_dashboard(session: &SessionStore) -> Result<Gathered<TrainerDashboard>, ApiError> {
    let trainer = TrainerApi::new(session);
    let questions = QuestionApi::new(session);
    let categories = CategoryApi::new(session);
    let reminders = ReminderApi::new(session);

    let (config, analytics, users_analytics, users, question_list, category_list, reminder_settings) = tokio::join!(
        trainer.config(),
        trainer.analytics(),
        trainer.users_analytics(),
        trainer.users(),
        questions.list(),
        categories.list(),
        reminders.get(),
    );

    let mut report = DegradationReport::new();
    let question_list: Vec<Question> = report.recover_default("questions", question_list);
    let dashboard = TrainerDashboard {
        config: report.recover_default("configuration", config),
        analytics: report.recover_default("analytics", analytics),
        users_analytics: report.recover_default("user analytics", users_analytics),
        users: report.recover_default("users", users),
        questions: display_order(&question_list).into_iter().cloned().collect(),
        categories: report.recover_default("categories", category_list),
        reminders: report.recover_default("reminder settings", reminder_settings),
    };
    report.finish(dashboard)
}
