//! Sign-in, registration, sign-out and `whoami`.

use std::fmt::{self, Write};

use anyhow::Result;
use serde::Serialize;

use crate::cli::{LoginArgs, RegisterArgs};
use crate::commands::{require_password, Context};
use crate::error::ExitCode;
use crate::output::Render;
use crate::routing::{landing_screen, Route, Screen};
use crate::session::{AuthFailure, UserProfile};

/// Result of a successful sign-in.
#[derive(Debug, Serialize)]
pub struct SignedIn {
    pub user: UserProfile,
    pub screen: Screen,
}

impl Render for SignedIn {
    fn render(&self, out: &mut dyn Write) -> fmt::Result {
        writeln!(
            out,
            "Signed in as {} <{}> ({}). Next: `coachdash dashboard` opens the {}.",
            self.user.name, self.user.email, self.user.role, self.screen
        )
    }
}

pub async fn login(ctx: &Context, args: &LoginArgs) -> Result<ExitCode> {
    let password = match require_password(ctx, args.password.as_deref(), "pass --password or set COACHDASH_PASSWORD") {
        Ok(password) => password,
        Err(exit) => return Ok(exit),
    };

    let spinner = ctx.printer.spinner("Signing in");
    let result = ctx.session.login(&args.email, password).await;
    spinner.finish();
    land(ctx, result)
}

pub async fn register(ctx: &Context, args: &RegisterArgs) -> Result<ExitCode> {
    let password = match require_password(ctx, args.password.as_deref(), "pass --password or set COACHDASH_PASSWORD") {
        Ok(password) => password,
        Err(exit) => return Ok(exit),
    };

    let spinner = ctx.printer.spinner("Creating account");
    let result = ctx
        .session
        .register(&args.email, password, &args.name, &args.code)
        .await;
    spinner.finish();
    land(ctx, result)
}

/// Route a fresh sign-in to its dashboard.
fn land(ctx: &Context, result: Result<UserProfile, AuthFailure>) -> Result<ExitCode> {
    let user = match result {
        Ok(user) => user,
        Err(failure) => return Ok(ctx.printer.failure(&failure.reason, ExitCode::GeneralError)),
    };

    match landing_screen(&user) {
        Screen::Login => {
            log::warn!("{} signed in with role {}, which has no dashboard", user.email, user.role);
            ctx.session.logout();
            Ok(ctx.printer.failure(
                "This account has no dashboard access. Log in with an admin or trainer account.",
                ExitCode::LoginRequired,
            ))
        }
        screen => Ok(ctx.printer.show(&SignedIn { user, screen })?),
    }
}

pub fn logout(ctx: &Context) -> Result<ExitCode> {
    ctx.session.logout();
    Ok(ctx.printer.success("Signed out")?)
}

pub async fn whoami(ctx: &Context) -> Result<ExitCode> {
    if let Err(exit) = ctx.enter(Route::Dashboard).await {
        return Ok(exit);
    }
    match ctx.session.current_user() {
        Some(user) => Ok(ctx.printer.show(&user)?),
        None => Ok(ctx.printer.failure("Not signed in", ExitCode::LoginRequired)),
    }
}
