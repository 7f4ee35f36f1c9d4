//! Account self-service: display name and password.

use anyhow::Result;

use crate::cli::AccountCommand;
use crate::commands::{require_password, Context};
use crate::error::ExitCode;
use crate::routing::Route;

pub async fn run(ctx: &Context, command: &AccountCommand) -> Result<ExitCode> {
    if let Err(exit) = ctx.enter(Route::Dashboard).await {
        return Ok(exit);
    }

    match command {
        AccountCommand::Rename { name } => {
            let result = ctx.session.change_name(name).await;
            ctx.show(result, "Failed to update name")
        }
        AccountCommand::Password { current, new } => {
            let current = match require_password(ctx, current.as_deref(), "pass --current or set COACHDASH_PASSWORD") {
                Ok(password) => password,
                Err(exit) => return Ok(exit),
            };
            let new = match require_password(ctx, new.as_deref(), "pass --new or set COACHDASH_NEW_PASSWORD") {
                Ok(password) => password,
                Err(exit) => return Ok(exit),
            };
            let result = ctx.session.change_password(current, new).await;
            ctx.acknowledge(result, "Failed to change password", "Password changed")
        }
    }
}
