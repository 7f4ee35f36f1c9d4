//! coachdash - admin and trainer console for the nutrition coaching bot
//!
//! A client for the coaching backend's REST API: a session store with a
//! persisted bearer token, role-gated routing between the admin and trainer
//! dashboards, and typed calls for every dashboard screen.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod logging;
pub mod output;
pub mod progress;
pub mod routing;
pub mod session;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::commands::Context;
use crate::config::Config;
use crate::error::ExitCode;
use crate::http::ApiClient;
use crate::output::Printer;
use crate::session::{FileTokenStore, SessionStore};

/// Run the application logic for parsed CLI arguments.
///
/// Logging must already be initialized.
///
/// # Errors
///
/// Configuration, token location and runtime setup failures, and I/O errors
/// writing output. API failures are reported by the commands and become exit
/// codes instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref(), cli.profile.as_deref())?;
    config.merge_cli(&cli);
    if config.no_color || !std::io::stdout().is_terminal() {
        yansi::disable();
    }
    let printer = Printer::new(config.output, cli.quiet);

    if let Commands::Config { command } = &cli.command {
        return commands::config::run(command, &config, cli.config.as_deref(), &printer);
    }

    let token_path = config.token_path()?;
    log::debug!("API {} with token file {}", config.api_url, token_path.display());
    let client = ApiClient::with_base_url(config.api_base()?)?;
    let session = SessionStore::new(client, Arc::new(FileTokenStore::new(token_path)));
    let context = Context::new(session, printer);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        tokio::select! {
            result = commands::dispatch(&context, &cli.command) => result,
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Interrupted; abandoning in-flight requests");
                Ok(context.printer.failure("Interrupted", ExitCode::Interrupted))
            }
        }
    })
}
