//! Command handlers: one screen or action per invocation.
//!
//! Every guarded command restores the session once, resolves its route
//! through the guard and role router, and only then touches the API. API
//! failures are turned into a notice and an exit code here; only I/O faults
//! escape as errors.

pub mod account;
pub mod admin;
pub mod auth;
pub mod config;
pub mod trainer;

use anyhow::Result;
use serde::Serialize;

use crate::api::auth::MessageResponse;
use crate::api::categories::CategoryApi;
use crate::cli::Commands;
use crate::error::ExitCode;
use crate::http::ApiError;
use crate::output::{Printer, Render};
use crate::routing::{resolve, Route, Screen};
use crate::session::SessionStore;

/// Shared state of one invocation.
pub struct Context {
    pub session: SessionStore,
    pub printer: Printer,
}

impl Context {
    #[must_use]
    pub fn new(session: SessionStore, printer: Printer) -> Self {
        Self { session, printer }
    }

    /// Restore the session and resolve `route`.
    ///
    /// Returns the screen to show, or the exit code of the redirect to login
    /// after reporting it.
    pub async fn enter(&self, route: Route) -> std::result::Result<Screen, ExitCode> {
        let spinner = self.printer.spinner("Restoring session");
        self.session.restore().await;
        spinner.finish();

        let session = self.session.snapshot();
        match resolve(route, &session) {
            Screen::Login | Screen::Loading => {
                let message = match session.role() {
                    Some(role) => format!(
                        "Signed in as {role}, which cannot open the {} screen. Log in with another account.",
                        route_name(route)
                    ),
                    None => "Please log in: run `coachdash login <email>`.".to_string(),
                };
                log::debug!("Route {route:?} redirected to login");
                Err(self.printer.failure(&message, ExitCode::LoginRequired))
            }
            screen => Ok(screen),
        }
    }

    /// Report a failed API call.
    pub fn api_failure(&self, err: &ApiError, fallback: &str) -> ExitCode {
        let exit = ExitCode::for_api_error(err);
        let mut message = err.user_message(fallback);
        if exit == ExitCode::LoginRequired {
            message.push_str(" Run `coachdash login <email>`.");
        }
        self.printer.failure(&message, exit)
    }

    /// Print a fetched value or report the failure.
    pub fn show<T: Serialize + Render>(&self, result: Result<T, ApiError>, fallback: &str) -> Result<ExitCode> {
        match result {
            Ok(value) => Ok(self.printer.show(&value)?),
            Err(err) => Ok(self.api_failure(&err, fallback)),
        }
    }

    /// Confirm a mutation with the backend's message, or `default`.
    pub fn acknowledge(
        &self,
        result: Result<MessageResponse, ApiError>,
        fallback: &str,
        default: &str,
    ) -> Result<ExitCode> {
        match result {
            Ok(ack) if !ack.message.trim().is_empty() => Ok(self.printer.success(&ack.message)?),
            Ok(_) => Ok(self.printer.success(default)?),
            Err(err) => Ok(self.api_failure(&err, fallback)),
        }
    }
}

fn route_name(route: Route) -> &'static str {
    match route {
        Route::Login => "login",
        Route::Register => "register",
        Route::Dashboard => "dashboard",
        Route::Admin => "admin",
        Route::Trainer => "trainer",
    }
}

/// Run one session-backed command.
pub async fn dispatch(ctx: &Context, command: &Commands) -> Result<ExitCode> {
    match command {
        Commands::Login(args) => auth::login(ctx, args).await,
        Commands::Register(args) => auth::register(ctx, args).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Whoami => auth::whoami(ctx).await,
        Commands::Dashboard => dashboard(ctx).await,
        Commands::Categories => {
            let result = CategoryApi::new(&ctx.session).list().await;
            ctx.show(result, "Failed to load categories")
        }
        Commands::Admin { command } => admin::run(ctx, command).await,
        Commands::Trainer { command } => trainer::run(ctx, command).await,
        Commands::Account { command } => account::run(ctx, command).await,
        Commands::Config { .. } => {
            Ok(ctx
                .printer
                .failure("Configuration commands do not need a session", ExitCode::GeneralError))
        }
    }
}

/// The role-dispatched dashboard.
async fn dashboard(ctx: &Context) -> Result<ExitCode> {
    match ctx.enter(Route::Dashboard).await {
        Ok(Screen::AdminDashboard) => admin::dashboard(ctx).await,
        Ok(Screen::TrainerDashboard) => trainer::dashboard(ctx).await,
        Ok(screen) => {
            log::debug!("Dashboard route resolved to {screen}");
            Ok(ctx.printer.failure("No dashboard for this account", ExitCode::LoginRequired))
        }
        Err(exit) => Ok(exit),
    }
}

/// A password from a flag or the environment.
pub(crate) fn require_password<'a>(ctx: &Context, value: Option<&'a str>, hint: &str) -> std::result::Result<&'a str, ExitCode> {
    match value {
        Some(password) if !password.is_empty() => Ok(password),
        _ => Err(ctx.printer.failure(&format!("Password required: {hint}"), ExitCode::GeneralError)),
    }
}
