//! Trainer screens.

use anyhow::Result;

use crate::api::questions::{next_step, plan_reorder, NewQuestion, QuestionApi, QuestionUpdate};
use crate::api::reminders::{parse_clock, MealReminder, MealType, ReminderApi, ReminderUpdate};
use crate::api::trainer::{OnboardingQuestion, TrainerApi, TrainerConfigUpdate};
use crate::cli::{QuestionCommand, ReminderCommand, TrainerCommand, TrainerConfigArgs, TrainerConfigCommand};
use crate::commands::Context;
use crate::dashboard::load_trainer_dashboard;
use crate::error::ExitCode;
use crate::http::ApiError;
use crate::routing::Route;

pub async fn run(ctx: &Context, command: &TrainerCommand) -> Result<ExitCode> {
    if let Err(exit) = ctx.enter(Route::Trainer).await {
        return Ok(exit);
    }

    let trainer = TrainerApi::new(&ctx.session);
    match command {
        TrainerCommand::Dashboard => dashboard(ctx).await,
        TrainerCommand::Config { command } => match command {
            TrainerConfigCommand::Show => ctx.show(trainer.config().await, "Failed to load configuration"),
            TrainerConfigCommand::Set(args) => ctx.acknowledge(
                trainer.update_config(&config_update(args)).await,
                "Failed to save configuration",
                "Configuration saved",
            ),
        },
        TrainerCommand::Analytics => ctx.show(trainer.analytics().await, "Failed to load analytics"),
        TrainerCommand::Users => ctx.show(trainer.users().await, "Failed to load users"),
        TrainerCommand::UserAnalytics => {
            ctx.show(trainer.users_analytics().await, "Failed to load user analytics")
        }
        TrainerCommand::Questions { command } => questions(ctx, command).await,
        TrainerCommand::Reminders { command } => reminders(ctx, command).await,
    }
}

/// Full trainer dashboard. The caller has already passed the route guard.
pub async fn dashboard(ctx: &Context) -> Result<ExitCode> {
    let spinner = ctx.printer.spinner("Loading trainer dashboard");
    let result = load_trainer_dashboard(&ctx.session).await;
    spinner.finish();

    match result {
        Ok(gathered) => Ok(ctx.printer.show_gathered(&gathered.data, &gathered.degraded)?),
        Err(err) => Ok(ctx.api_failure(&err, "Failed to load the trainer dashboard")),
    }
}

fn config_update(args: &TrainerConfigArgs) -> TrainerConfigUpdate {
    TrainerConfigUpdate {
        general_notes: args.notes.clone(),
        bot_personality: args.personality.clone(),
        diet_preferences: (!args.diet_preferences.is_empty()).then(|| args.diet_preferences.clone()),
        onboarding_questions: (!args.onboarding_questions.is_empty())
            .then(|| args.onboarding_questions.iter().map(|q| OnboardingQuestion::new(q.trim())).collect()),
        reminder_settings: None,
    }
}

async fn questions(ctx: &Context, command: &QuestionCommand) -> Result<ExitCode> {
    let questions = QuestionApi::new(&ctx.session);
    match command {
        QuestionCommand::List => ctx.show(questions.list().await, "Failed to load questions"),
        QuestionCommand::Add { category, text, step } => {
            let step_order = match step {
                Some(step) => *step,
                None => match questions.list().await {
                    Ok(existing) => next_step(&existing),
                    Err(err) => return Ok(ctx.api_failure(&err, "Failed to load questions")),
                },
            };
            let question = NewQuestion {
                category_id: category.trim().to_string(),
                question_text: text.trim().to_string(),
                step_order,
            };
            ctx.acknowledge(
                questions.create(&question).await,
                "Failed to create question",
                "Question added",
            )
        }
        QuestionCommand::Edit { id, text, step } => {
            let update = QuestionUpdate {
                question_text: text.as_ref().map(|t| t.trim().to_string()),
                step_order: *step,
            };
            ctx.acknowledge(
                questions.update(id, &update).await,
                "Failed to update question",
                "Question updated",
            )
        }
        QuestionCommand::Delete { id } => ctx.acknowledge(
            questions.delete(id).await,
            "Failed to delete question",
            "Question deleted",
        ),
        QuestionCommand::Move { from, to } => move_question(ctx, &questions, *from, *to).await,
    }
}

/// Positions are 1-based on the command line.
async fn move_question(ctx: &Context, questions: &QuestionApi<'_>, from: usize, to: usize) -> Result<ExitCode> {
    if from == 0 || to == 0 {
        return Ok(ctx.printer.failure("Positions start at 1", ExitCode::GeneralError));
    }
    let current = match questions.list().await {
        Ok(current) => current,
        Err(err) => return Ok(ctx.api_failure(&err, "Failed to load questions")),
    };
    let changes = match plan_reorder(&current, from - 1, to - 1) {
        Ok(changes) => changes,
        Err(err) => return Ok(ctx.printer.failure(&err.to_string(), ExitCode::GeneralError)),
    };
    if changes.is_empty() {
        return Ok(ctx.printer.show(&changes)?);
    }

    let outcome = questions.apply_reorder(changes).await;
    if outcome.is_complete() {
        return Ok(ctx.printer.show(&outcome.applied)?);
    }
    if let Some((_, err)) = outcome.failed.iter().find(|(_, err)| err.is_unauthorized()) {
        return Ok(ctx.api_failure(err, "Failed to reorder questions"));
    }
    let failed: Vec<&str> = outcome.failed.iter().map(|(c, _)| c.question_id.as_str()).collect();
    Ok(ctx.printer.failure(
        &format!(
            "Reordered {} question(s), but {} could not be moved: {}",
            outcome.applied.len(),
            failed.len(),
            failed.join(", ")
        ),
        ExitCode::GeneralError,
    ))
}

fn clock(at: Option<&str>) -> Result<Option<(u8, u8)>, ApiError> {
    at.map(parse_clock).transpose()
}

async fn reminders(ctx: &Context, command: &ReminderCommand) -> Result<ExitCode> {
    let reminders = ReminderApi::new(&ctx.session);
    let update = match command {
        ReminderCommand::Show => return ctx.show(reminders.get().await, "Failed to load reminder settings"),
        ReminderCommand::Init => {
            return ctx.acknowledge(
                reminders.initialize().await,
                "Failed to initialize reminders",
                "Default reminders created",
            )
        }
        ReminderCommand::Meal {
            meal,
            at,
            after_hours,
            toggle,
        } => meal_update(&reminders, *meal, at.as_deref(), *after_hours, toggle.state()).await,
        ReminderCommand::Weight { at, every_days, toggle } => {
            weight_update(&reminders, at.as_deref(), *every_days, toggle.state()).await
        }
        ReminderCommand::Summary { at, toggle } => summary_update(&reminders, at.as_deref(), toggle.state()).await,
    };

    match update {
        Ok(update) => ctx.acknowledge(
            reminders.update(&update).await,
            "Failed to save reminder settings",
            "Reminder settings saved",
        ),
        Err(err) => Ok(ctx.api_failure(&err, "Failed to load reminder settings")),
    }
}

async fn meal_update(
    reminders: &ReminderApi<'_>,
    meal: MealType,
    at: Option<&str>,
    after_hours: Option<u8>,
    enabled: Option<bool>,
) -> Result<ReminderUpdate, ApiError> {
    let time = clock(at)?;
    if time.is_none() && after_hours.is_none() && enabled.is_none() {
        return Err(ApiError::Invalid("Nothing to change: pass --at, --after-hours, --enable or --disable".into()));
    }

    let mut settings = reminders.get().await?;
    let mut reminder = settings
        .meal(meal)
        .cloned()
        .unwrap_or_else(|| MealReminder::default_for(meal));
    if let Some((hour, minute)) = time {
        reminder.hour = hour;
        reminder.minute = minute;
    }
    if let Some(hours) = after_hours {
        reminder.hours_since_last_meal = hours;
    }
    if let Some(enabled) = enabled {
        reminder.enabled = enabled;
    }
    settings.set_meal(reminder);
    Ok(ReminderUpdate::meals(settings.meal_reminders))
}

async fn weight_update(
    reminders: &ReminderApi<'_>,
    at: Option<&str>,
    every_days: Option<u16>,
    enabled: Option<bool>,
) -> Result<ReminderUpdate, ApiError> {
    let time = clock(at)?;
    if time.is_none() && every_days.is_none() && enabled.is_none() {
        return Err(ApiError::Invalid("Nothing to change: pass --at, --every-days, --enable or --disable".into()));
    }

    let mut reminder = reminders.get().await?.weight_reminder.unwrap_or_default();
    if let Some((hour, minute)) = time {
        reminder.reminder_hour = hour;
        reminder.reminder_minute = minute;
    }
    if let Some(days) = every_days {
        reminder.reminder_interval_days = days;
    }
    if let Some(enabled) = enabled {
        reminder.enabled = enabled;
    }
    Ok(ReminderUpdate::weight(reminder))
}

async fn summary_update(
    reminders: &ReminderApi<'_>,
    at: Option<&str>,
    enabled: Option<bool>,
) -> Result<ReminderUpdate, ApiError> {
    let time = clock(at)?;
    if time.is_none() && enabled.is_none() {
        return Err(ApiError::Invalid("Nothing to change: pass --at, --enable or --disable".into()));
    }

    let mut reminder = reminders.get().await?.summary_reminder.unwrap_or_default();
    if let Some((hour, minute)) = time {
        reminder.summary_hour = hour;
        reminder.summary_minute = minute;
    }
    if let Some(enabled) = enabled {
        reminder.enabled = enabled;
    }
    Ok(ReminderUpdate::summary(reminder))
}
