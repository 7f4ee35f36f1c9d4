//! Reminder notification settings: meal, weight and daily summary reminders.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::api::auth::MessageResponse;
use crate::http::{ApiError, ApiRequest};
use crate::session::SessionStore;

const REMINDERS_PATH: &str = "/trainer/reminder-settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Evening,
}

impl MealType {
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Evening];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Evening => "evening",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MealReminder {
    pub reminder_type: MealType,
    #[validate(range(max = 23, message = "Hour must be 0-23"))]
    pub hour: u8,
    #[validate(range(max = 59, message = "Minute must be 0-59"))]
    pub minute: u8,
    #[validate(range(min = 1, max = 24, message = "Hours since last meal must be 1-24"))]
    pub hours_since_last_meal: u8,
    #[serde(default)]
    pub enabled: bool,
}

impl MealReminder {
    /// The backend's default reminder for a meal.
    #[must_use]
    pub fn default_for(reminder_type: MealType) -> Self {
        let (hour, hours_since_last_meal) = match reminder_type {
            MealType::Breakfast => (8, 3),
            MealType::Lunch => (13, 4),
            MealType::Dinner => (19, 4),
            MealType::Evening => (22, 3),
        };
        Self {
            reminder_type,
            hour,
            minute: 0,
            hours_since_last_meal,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WeightReminder {
    #[validate(range(max = 23, message = "Hour must be 0-23"))]
    pub reminder_hour: u8,
    #[validate(range(max = 59, message = "Minute must be 0-59"))]
    pub reminder_minute: u8,
    #[validate(range(min = 1, max = 365, message = "Interval must be 1-365 days"))]
    pub reminder_interval_days: u16,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for WeightReminder {
    fn default() -> Self {
        Self {
            reminder_hour: 9,
            reminder_minute: 0,
            reminder_interval_days: 3,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SummaryReminder {
    #[validate(range(max = 23, message = "Hour must be 0-23"))]
    pub summary_hour: u8,
    #[validate(range(max = 59, message = "Minute must be 0-59"))]
    pub summary_minute: u8,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for SummaryReminder {
    fn default() -> Self {
        Self {
            summary_hour: 22,
            summary_minute: 0,
            enabled: true,
        }
    }
}

/// `GET /trainer/reminder-settings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    #[serde(deserialize_with = "known_meal_reminders")]
    pub meal_reminders: Vec<MealReminder>,
    pub weight_reminder: Option<WeightReminder>,
    pub summary_reminder: Option<SummaryReminder>,
}

/// Decode meal reminder rows, skipping rows this client cannot represent
/// (an unknown `reminder_type`, for one) instead of failing the whole screen.
fn known_meal_reminders<'de, D>(deserializer: D) -> Result<Vec<MealReminder>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<MealReminder>(row) {
            Ok(reminder) => Some(reminder),
            Err(e) => {
                log::warn!("Skipping meal reminder: {e}");
                None
            }
        })
        .collect())
}

impl ReminderSettings {
    /// What `initialize` creates on the backend.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            meal_reminders: MealType::ALL.into_iter().map(MealReminder::default_for).collect(),
            weight_reminder: Some(WeightReminder::default()),
            summary_reminder: Some(SummaryReminder::default()),
        }
    }

    /// Nothing configured yet.
    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.meal_reminders.is_empty() && self.weight_reminder.is_none() && self.summary_reminder.is_none()
    }

    #[must_use]
    pub fn meal(&self, meal_type: MealType) -> Option<&MealReminder> {
        self.meal_reminders.iter().find(|m| m.reminder_type == meal_type)
    }

    /// Replace the reminder for its meal, or add it. Meals stay in day order.
    pub fn set_meal(&mut self, reminder: MealReminder) {
        match self
            .meal_reminders
            .iter_mut()
            .find(|m| m.reminder_type == reminder.reminder_type)
        {
            Some(existing) => *existing = reminder,
            None => self.meal_reminders.push(reminder),
        }
        self.meal_reminders.sort_by_key(|m| m.reminder_type);
    }
}

/// `PUT /trainer/reminder-settings`. Only the sections that are set are sent,
/// and the backend only touches those.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_reminders: Option<Vec<MealReminder>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_reminder: Option<WeightReminder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_reminder: Option<SummaryReminder>,
}

impl ReminderUpdate {
    #[must_use]
    pub fn meals(meals: Vec<MealReminder>) -> Self {
        Self {
            meal_reminders: Some(meals),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn weight(reminder: WeightReminder) -> Self {
        Self {
            weight_reminder: Some(reminder),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn summary(reminder: SummaryReminder) -> Self {
        Self {
            summary_reminder: Some(reminder),
            ..Self::default()
        }
    }

    /// Validate every section that is present.
    ///
    /// # Errors
    ///
    /// [`ApiError::Invalid`] for an empty update or any out-of-range field.
    pub fn check(&self) -> Result<(), ApiError> {
        if self == &Self::default() {
            return Err(ApiError::Invalid("Nothing to update".to_string()));
        }
        for meal in self.meal_reminders.iter().flatten() {
            meal.validate()?;
        }
        if let Some(weight) = &self.weight_reminder {
            weight.validate()?;
        }
        if let Some(summary) = &self.summary_reminder {
            summary.validate()?;
        }
        Ok(())
    }
}

/// Parse an `HH:MM` time of day into `(hour, minute)`.
///
/// # Errors
///
/// [`ApiError::Invalid`] if the text is not a valid 24-hour time.
pub fn parse_clock(raw: &str) -> Result<(u8, u8), ApiError> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ApiError::Invalid(format!("Expected a time as HH:MM, got {raw:?}")))?;
    // chrono guarantees hour < 24 and minute < 60
    Ok((time.hour() as u8, time.minute() as u8))
}

/// Format `(hour, minute)` as `HH:MM`.
#[must_use]
pub fn format_clock(hour: u8, minute: u8) -> String {
    format!("{hour:02}:{minute:02}")
}

/// Reminder settings of the signed-in trainer.
pub struct ReminderApi<'a> {
    session: &'a SessionStore,
}

impl<'a> ReminderApi<'a> {
    #[must_use]
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    pub async fn get(&self) -> Result<ReminderSettings, ApiError> {
        self.session.send(ApiRequest::get(REMINDERS_PATH)).await
    }

    pub async fn update(&self, update: &ReminderUpdate) -> Result<MessageResponse, ApiError> {
        update.check()?;
        self.session
            .send(ApiRequest::put(REMINDERS_PATH).with_json(update)?)
            .await
    }

    /// Create the default reminder set for a trainer that has none.
    pub async fn initialize(&self) -> Result<MessageResponse, ApiError> {
        self.session
            .send(ApiRequest::post(format!("{REMINDERS_PATH}/initialize")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("08:30").unwrap(), (8, 30));
        assert_eq!(parse_clock(" 23:59 ").unwrap(), (23, 59));
        assert_eq!(parse_clock("0:05").unwrap(), (0, 5));
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("12:60").is_err());
        assert!(parse_clock("noon").is_err());
        assert_eq!(format_clock(8, 5), "08:05");
    }

    #[test]
    fn test_ranges() {
        let mut meal = ReminderSettings::defaults().meal_reminders[0].clone();
        assert!(meal.validate().is_ok());
        meal.hours_since_last_meal = 0;
        assert!(meal.validate().is_err());
        meal.hours_since_last_meal = 25;
        assert!(meal.validate().is_err());

        let weight = WeightReminder {
            reminder_hour: 9,
            reminder_minute: 0,
            reminder_interval_days: 366,
            enabled: true,
        };
        assert!(weight.validate().is_err());

        let summary = SummaryReminder {
            summary_hour: 24,
            summary_minute: 0,
            enabled: true,
        };
        assert!(summary.validate().is_err());
    }

    #[test]
    fn test_update_sends_only_edited_section() {
        let update = ReminderUpdate::summary(SummaryReminder {
            summary_hour: 21,
            summary_minute: 30,
            enabled: false,
        });
        assert!(update.check().is_ok());
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"summary_reminder": {"summary_hour": 21, "summary_minute": 30, "enabled": false}})
        );
        assert!(ReminderUpdate::default().check().is_err());
    }

    #[test]
    fn test_set_meal_replaces_and_orders() {
        let mut settings = ReminderSettings::default();
        assert!(settings.is_uninitialized());
        let dinner = MealReminder {
            reminder_type: MealType::Dinner,
            hour: 19,
            minute: 0,
            hours_since_last_meal: 4,
            enabled: true,
        };
        settings.set_meal(dinner.clone());
        settings.set_meal(MealReminder {
            reminder_type: MealType::Breakfast,
            hour: 7,
            ..dinner.clone()
        });
        settings.set_meal(MealReminder { hour: 20, ..dinner });
        let order: Vec<_> = settings.meal_reminders.iter().map(|m| m.reminder_type).collect();
        assert_eq!(order, vec![MealType::Breakfast, MealType::Dinner]);
        assert_eq!(settings.meal(MealType::Dinner).map(|m| m.hour), Some(20));
    }

    #[test]
    fn test_null_sections_decode() {
        let settings: ReminderSettings = serde_json::from_str(
            r#"{"meal_reminders": [], "weight_reminder": null, "summary_reminder": null}"#,
        )
        .unwrap();
        assert!(settings.is_uninitialized());
    }

    #[test]
    fn test_rows_with_extra_columns_decode() {
        let meal: MealReminder = serde_json::from_str(
            r#"{"id": "m1", "trainer_id": "t1", "reminder_type": "lunch", "hour": 13, "minute": 0, "hours_since_last_meal": 4, "enabled": true}"#,
        )
        .unwrap();
        assert_eq!(meal.reminder_type, MealType::Lunch);
    }

    #[test]
    fn test_unknown_meal_type_is_skipped() {
        let settings: ReminderSettings = serde_json::from_str(
            r#"{"meal_reminders": [
                {"reminder_type": "brunch", "hour": 11, "minute": 0, "hours_since_last_meal": 3, "enabled": true},
                {"reminder_type": "dinner", "hour": 19, "minute": 30, "hours_since_last_meal": 4, "enabled": false}
            ], "weight_reminder": {"reminder_hour": 9, "reminder_minute": 0, "reminder_interval_days": 3, "enabled": true}}"#,
        )
        .unwrap();
        assert_eq!(settings.meal_reminders.len(), 1);
        assert_eq!(settings.meal_reminders[0].reminder_type, MealType::Dinner);
        assert_eq!(settings.meal_reminders[0].minute, 30);
        assert!(settings.weight_reminder.is_some());
    }

    #[test]
    fn test_null_meal_reminders_decode_empty() {
        let settings: ReminderSettings = serde_json::from_str(r#"{"meal_reminders": null}"#).unwrap();
        assert!(settings.meal_reminders.is_empty());
    }
}
