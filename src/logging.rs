//! Logging for coachdash.
//!
//! Uses the `log` facade with the `env_logger` backend. Log levels are
//! determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! The HTTP stack is held at warn below trace level, so `-v` shows the
//! session and request flow of coachdash itself.
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: timestamp, level and, with `-v`, the module path
//! - **Release builds**: level and message only
//!
//! # Example
//!
//! ```rust,no_run
//! use coachdash::logging::init_logging;
//!
//! // -v
//! init_logging(1, false);
//! log::debug!("Restoring session");
//! ```

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

const NOISY_MODULES: [&str; 4] = ["reqwest", "hyper", "hyper_util", "rustls"];

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once, before any logging. A second call is ignored.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();
    let mut builder = Builder::new();

    let level = determine_level(verbose, quiet);
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
        for (module, cap) in dependency_caps(level) {
            builder.filter_module(module, cap);
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    if use_env {
        log::debug!("Logging initialized from RUST_LOG: {:?}", env::var("RUST_LOG").ok());
    } else {
        log::debug!("Logging initialized at level: {level:?}");
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Ceilings for dependency modules at a given application level.
fn dependency_caps(level: LevelFilter) -> Vec<(&'static str, LevelFilter)> {
    if level >= LevelFilter::Trace {
        return Vec::new();
    }
    let cap = level.min(LevelFilter::Warn);
    NOISY_MODULES.iter().map(|module| (*module, cap)).collect()
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{timestamp} {level_style}{level:<5}{level_style:#} [{}] {}",
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{timestamp} {level_style}{level:<5}{level_style:#} {}",
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(buf, "{level_style}{level:<5}{level_style:#} {}", record.args())
        });
    }
}

/// Name of the current maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
