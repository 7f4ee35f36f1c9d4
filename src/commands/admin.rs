//! Admin screens.

use anyhow::Result;

use crate::api::admin::AdminApi;
use crate::api::categories::CategoryApi;
use crate::api::codes::{CodeApi, NewRegistrationCode};
use crate::cli::{AdminCommand, CategoryCommand, CodeCommand};
use crate::commands::Context;
use crate::dashboard::load_admin_dashboard;
use crate::error::ExitCode;
use crate::routing::Route;

pub async fn run(ctx: &Context, command: &AdminCommand) -> Result<ExitCode> {
    if let Err(exit) = ctx.enter(Route::Admin).await {
        return Ok(exit);
    }

    let admin = AdminApi::new(&ctx.session);
    match command {
        AdminCommand::Dashboard => dashboard(ctx).await,
        AdminCommand::Trainers => ctx.show(admin.trainers().await, "Failed to load trainers"),
        AdminCommand::ToggleTrainer { id } => match admin.toggle_trainer(id).await {
            Ok(change) => {
                let state = if change.is_active { "active" } else { "inactive" };
                Ok(ctx.printer.success(&format!("Trainer {} is now {state}", change.trainer_id))?)
            }
            Err(err) => Ok(ctx.api_failure(&err, "Failed to update trainer status")),
        },
        AdminCommand::Users => ctx.show(admin.users().await, "Failed to load users"),
        AdminCommand::Analytics => ctx.show(admin.analytics().await, "Failed to load analytics"),
        AdminCommand::Health => ctx.show(admin.system_health().await, "Failed to check system health"),
        AdminCommand::Codes { command } => codes(ctx, command).await,
        AdminCommand::Categories { command } => categories(ctx, command).await,
    }
}

/// Full admin dashboard. The caller has already passed the route guard.
pub async fn dashboard(ctx: &Context) -> Result<ExitCode> {
    let spinner = ctx.printer.spinner("Loading admin dashboard");
    let result = load_admin_dashboard(&ctx.session).await;
    spinner.finish();

    match result {
        Ok(gathered) => Ok(ctx.printer.show_gathered(&gathered.data, &gathered.degraded)?),
        Err(err) => Ok(ctx.api_failure(&err, "Failed to load the admin dashboard")),
    }
}

async fn codes(ctx: &Context, command: &CodeCommand) -> Result<ExitCode> {
    let codes = CodeApi::new(&ctx.session);
    match command {
        CodeCommand::List => ctx.show(codes.list().await, "Failed to load registration codes"),
        CodeCommand::Create { code, expires } => {
            let new_code = NewRegistrationCode {
                code: code.trim().to_string(),
                expires_at: *expires,
            };
            ctx.show(codes.create(&new_code).await, "Failed to create registration code")
        }
        CodeCommand::Activate { id } => ctx.acknowledge(
            codes.activate(id).await,
            "Failed to activate registration code",
            "Registration code activated",
        ),
        CodeCommand::Deactivate { id } => ctx.acknowledge(
            codes.deactivate(id).await,
            "Failed to deactivate registration code",
            "Registration code deactivated",
        ),
        CodeCommand::Delete { id } => ctx.acknowledge(
            codes.delete(id).await,
            "Failed to delete registration code",
            "Registration code deleted",
        ),
    }
}

async fn categories(ctx: &Context, command: &CategoryCommand) -> Result<ExitCode> {
    let categories = CategoryApi::new(&ctx.session);
    match command {
        CategoryCommand::List => ctx.show(categories.list().await, "Failed to load categories"),
        CategoryCommand::Create { name } => ctx.show(categories.create(name).await, "Failed to create category"),
        CategoryCommand::Rename { id, name } => {
            ctx.show(categories.rename(id, name).await, "Failed to update category")
        }
        CategoryCommand::Delete { id } => ctx.acknowledge(
            categories.delete(id).await,
            "Failed to delete category",
            "Category deleted",
        ),
    }
}
