//! Plain-text rendering of screens and records.

use std::fmt::{self, Write};

use yansi::Paint;

use crate::api::admin::{AdminAnalytics, EndUserSummary, SystemHealth, TrainerSummary};
use crate::api::categories::Category;
use crate::api::codes::{CodeStatus, RegistrationCode};
use crate::api::questions::{Question, StepChange};
use crate::api::reminders::{format_clock, ReminderSettings};
use crate::api::trainer::{TrainerAnalytics, TrainerConfig, TrainerUser, UsersAnalytics};
use crate::config::Config;
use crate::dashboard::{AdminDashboard, TrainerDashboard};
use crate::session::UserProfile;

/// Human-readable rendering.
pub trait Render {
    /// Write the text form of `self`.
    ///
    /// # Errors
    ///
    /// Only if the writer fails.
    fn render(&self, out: &mut dyn Write) -> fmt::Result;

    /// Render into a new string.
    fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.render(&mut out);
        out
    }
}

fn heading(out: &mut dyn Write, title: &str) -> fmt::Result {
    writeln!(out, "{}", title.bold())
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

/// Date part of a backend timestamp.
fn short_date(value: Option<&str>) -> &str {
    let value = or_dash(value);
    value.get(..10).unwrap_or(value)
}

fn enabled_label(enabled: bool) -> String {
    if enabled {
        "on".green().to_string()
    } else {
        "off".dim().to_string()
    }
}

impl Render for UserProfile {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "{} <{}>", self.name.bold(), self.email)?;
        writeln!(out, "  role: {}", self.role)?;
        writeln!(out, "  id:   {}", self.id)
    }
}

impl Render for Vec<TrainerSummary> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, &format!("Trainers ({})", self.len()))?;
        if self.is_empty() {
            return writeln!(out, "  No trainers registered.");
        }
        for t in self {
            let status = if t.is_active {
                "active".green().to_string()
            } else {
                "inactive".red().to_string()
            };
            writeln!(
                out,
                "  {:<24} {:<30} {:<8} users {:>4}  messages {:>6}  last {}  [{}]",
                t.name,
                t.email,
                status,
                t.user_count,
                t.message_count,
                short_date(t.last_activity.as_deref()),
                t.id.dim()
            )?;
        }
        Ok(())
    }
}

impl Render for Vec<EndUserSummary> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, &format!("Users ({})", self.len()))?;
        if self.is_empty() {
            return writeln!(out, "  No users yet.");
        }
        for u in self {
            writeln!(
                out,
                "  {:<24} trainer {:<20} messages {:>5}  last {}  {}",
                or_dash(u.name.as_deref()),
                or_dash(u.trainer_name.as_deref()),
                u.message_count,
                short_date(u.last_interaction.as_deref()),
                or_dash(u.location.as_deref()).dim()
            )?;
        }
        Ok(())
    }
}

impl Render for AdminAnalytics {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        let o = &self.overview;
        heading(out, "Analytics")?;
        writeln!(out, "  trainers:   {} ({} active)", o.total_trainers, o.active_trainers)?;
        writeln!(out, "  users:      {}", o.total_users)?;
        writeln!(
            out,
            "  messages:   {} ({} in the last 7 days)",
            o.total_messages, o.recent_messages_7_days
        )?;
        let codes = &self.registration_codes;
        writeln!(
            out,
            "  codes:      {} total, {} used, {} active ({:.1}% used)",
            codes.total_codes, codes.used_codes, codes.active_codes, codes.usage_rate
        )?;
        if !self.trainer_performance.is_empty() {
            writeln!(out, "  by trainer:")?;
            for p in &self.trainer_performance {
                writeln!(
                    out,
                    "    {:<24} {:>6} messages {:>4} users{}",
                    p.trainer_name,
                    p.total_messages,
                    p.total_users,
                    if p.is_active { "" } else { " (inactive)" }
                )?;
            }
        }
        Ok(())
    }
}

impl Render for SystemHealth {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        let status = match self.status.as_str() {
            "healthy" => self.status.green().to_string(),
            "degraded" => self.status.yellow().to_string(),
            _ => self.status.red().to_string(),
        };
        writeln!(out, "{} {status}", "System health:".bold())?;
        for (name, check) in &self.checks {
            writeln!(out, "  {name:<20} {check}")?;
        }
        Ok(())
    }
}

impl Render for Vec<RegistrationCode> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, &format!("Registration codes ({})", self.len()))?;
        if self.is_empty() {
            return writeln!(out, "  No codes yet.");
        }
        for code in self {
            let status = match code.status() {
                CodeStatus::Active => "active".green().to_string(),
                CodeStatus::Used => "used".dim().to_string(),
                CodeStatus::Expired => "expired".red().to_string(),
            };
            writeln!(
                out,
                "  {:<20} {:<8} expires {}  [{}]",
                code.code,
                status,
                short_date(code.expires_at.as_deref()),
                code.id.dim()
            )?;
        }
        Ok(())
    }
}

impl Render for RegistrationCode {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "{} ({}) [{}]", self.code.bold(), self.status(), self.id)
    }
}

impl Render for Vec<Category> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, &format!("Categories ({})", self.len()))?;
        for c in self {
            writeln!(out, "  {:<30} [{}]", c.name, c.id.dim())?;
        }
        Ok(())
    }
}

impl Render for Category {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(out, "{} [{}]", self.name.bold(), self.id)
    }
}

impl Render for TrainerConfig {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, "Bot configuration")?;
        writeln!(out, "  personality: {}", or_dash(self.bot_personality.as_deref()))?;
        writeln!(out, "  notes:       {}", or_dash(self.general_notes.as_deref()))?;
        let diets = if self.diet_preferences.is_empty() {
            "-".to_string()
        } else {
            self.diet_preferences.join(", ")
        };
        writeln!(out, "  diets:       {diets}")?;
        writeln!(out, "  onboarding:  {} question(s)", self.onboarding_questions.len())?;
        for (i, q) in self.onboarding_questions.iter().enumerate() {
            writeln!(out, "    {}. {}", i + 1, q.question)?;
        }
        Ok(())
    }
}

impl Render for TrainerAnalytics {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, "Messages")?;
        writeln!(out, "  total: {}", self.total_messages)?;
        writeln!(out, "  last 7 days: {}", self.recent_activity)?;
        for (day, count) in self.daily_messages.iter().rev().take(14) {
            writeln!(out, "  {day}  {count:>5}")?;
        }
        Ok(())
    }
}

impl Render for UsersAnalytics {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, "User activity")?;
        writeln!(out, "  total users: {}", self.total_users)?;
        for (day, activity) in self.daily_user_activity.iter().rev().take(14) {
            writeln!(
                out,
                "  {day}  {:>4} users {:>5} messages",
                activity.unique_users_count, activity.total_messages
            )?;
        }
        let top = self.most_active(5);
        if !top.is_empty() {
            writeln!(out, "  most active:")?;
            for u in top {
                writeln!(
                    out,
                    "    {:<24} {:>5} messages  last {}",
                    or_dash(u.user_name.as_deref()),
                    u.total_messages,
                    short_date(u.last_interaction.as_deref())
                )?;
            }
        }
        Ok(())
    }
}

impl Render for Vec<TrainerUser> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, &format!("Your users ({})", self.len()))?;
        if self.is_empty() {
            return writeln!(out, "  No users have picked you yet.");
        }
        for u in self {
            writeln!(
                out,
                "  {:<24} messages {:>5}  last {}  [{}]",
                or_dash(u.name.as_deref()),
                u.message_count,
                short_date(u.last_interaction.as_deref()),
                u.id.dim()
            )?;
        }
        Ok(())
    }
}

impl Render for Vec<Question> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, &format!("Onboarding questions ({})", self.len()))?;
        if self.is_empty() {
            return writeln!(out, "  No questions yet.");
        }
        for (position, q) in crate::api::questions::display_order(self).into_iter().enumerate() {
            writeln!(
                out,
                "  {:>2}. {}  {} [{}]",
                position + 1,
                q.question_text,
                format!("({})", q.category_name()).dim(),
                q.id.dim()
            )?;
        }
        Ok(())
    }
}

impl Render for Vec<StepChange> {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        if self.is_empty() {
            return writeln!(out, "Order unchanged.");
        }
        for change in self {
            writeln!(out, "  {}: step {} -> {}", change.question_id, change.from, change.to)?;
        }
        Ok(())
    }
}

impl Render for ReminderSettings {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, "Reminders")?;
        if self.is_uninitialized() {
            return writeln!(out, "  Not set up yet. Run `coachdash trainer reminders init`.");
        }
        for m in &self.meal_reminders {
            writeln!(
                out,
                "  {:<10} {}  after {}h without a meal  {}",
                m.reminder_type.to_string(),
                format_clock(m.hour, m.minute),
                m.hours_since_last_meal,
                enabled_label(m.enabled)
            )?;
        }
        if let Some(w) = &self.weight_reminder {
            writeln!(
                out,
                "  {:<10} {}  every {} day(s)  {}",
                "weight",
                format_clock(w.reminder_hour, w.reminder_minute),
                w.reminder_interval_days,
                enabled_label(w.enabled)
            )?;
        }
        if let Some(s) = &self.summary_reminder {
            writeln!(
                out,
                "  {:<10} {}  {}",
                "summary",
                format_clock(s.summary_hour, s.summary_minute),
                enabled_label(s.enabled)
            )?;
        }
        Ok(())
    }
}

impl Render for AdminDashboard {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, "Admin dashboard")?;
        writeln!(
            out,
            "  {} trainers ({} active), {} users, {} codes redeemable\n",
            self.trainers.len(),
            self.active_trainers(),
            self.users.len(),
            self.active_codes()
        )?;
        self.health.render(out)?;
        writeln!(out)?;
        self.analytics.render(out)?;
        writeln!(out)?;
        self.trainers.render(out)?;
        writeln!(out)?;
        self.codes.render(out)?;
        writeln!(out)?;
        self.categories.render(out)
    }
}

impl Render for TrainerDashboard {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        heading(out, "Trainer dashboard")?;
        writeln!(
            out,
            "  {} users, {} messages, {} onboarding questions\n",
            self.users.len(),
            self.analytics.total_messages,
            self.questions.len()
        )?;
        self.config.render(out)?;
        writeln!(out)?;
        self.questions.render(out)?;
        writeln!(out)?;
        self.reminders.render(out)?;
        writeln!(out)?;
        self.users_analytics.render(out)
    }
}

impl Render for Config {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        match self.to_toml() {
            Ok(text) => write!(out, "{text}"),
            Err(e) => writeln!(out, "# could not render configuration: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::reminders::ReminderSettings;
    use crate::session::Role;

    #[test]
    fn test_short_date() {
        assert_eq!(short_date(Some("2024-05-01T10:00:00Z")), "2024-05-01");
        assert_eq!(short_date(Some("today")), "today");
        assert_eq!(short_date(None), "-");
        assert_eq!(short_date(Some("  ")), "-");
    }

    #[test]
    fn test_profile_text() {
        yansi::disable();
        let profile = UserProfile {
            id: "u1".into(),
            name: "Avery".into(),
            email: "avery@example.com".into(),
            role: Role::Trainer,
        };
        let text = profile.to_text();
        assert!(text.contains("Avery <avery@example.com>"));
        assert!(text.contains("role: trainer"));
    }

    #[test]
    fn test_reminder_text() {
        yansi::disable();
        let text = ReminderSettings::defaults().to_text();
        assert!(text.contains("breakfast"));
        assert!(text.contains("08:00"));
        assert!(text.contains("every 3 day(s)"));
        assert!(ReminderSettings::default().to_text().contains("Not set up yet"));
    }

    #[test]
    fn test_empty_lists() {
        assert!(Vec::<TrainerSummary>::new().to_text().contains("No trainers"));
        assert!(Vec::<StepChange>::new().to_text().contains("unchanged"));
    }
}
