//! Result output: text for people, JSON for scripts.
//!
//! Command results go to stdout. Notices, errors and the loading spinner go
//! to stderr.

pub mod json;
pub mod text;

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use yansi::Paint;

pub use json::JsonOutput;
pub use text::Render;

use crate::cli::OutputFormat;
use crate::dashboard::DegradedSource;
use crate::error::{ExitCode, StructuredError};
use crate::progress::LoadingIndicator;

#[derive(Debug, Serialize)]
struct Message<'a> {
    message: &'a str,
}

/// Writes command results in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
    quiet: bool,
}

impl Printer {
    #[must_use]
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Loading indicator for a screen load.
    #[must_use]
    pub fn spinner(&self, message: &str) -> LoadingIndicator {
        let hidden = self.quiet || self.is_json() || !io::stderr().is_terminal();
        LoadingIndicator::start(message, hidden)
    }

    /// Print a result with no degraded sources.
    ///
    /// # Errors
    ///
    /// I/O failures writing to stdout.
    pub fn show<T: Serialize + Render>(&self, value: &T) -> io::Result<ExitCode> {
        self.show_gathered(value, &[])
    }

    /// Print a screen, listing any degraded sources. Returns
    /// [`ExitCode::Degraded`] if there were any.
    ///
    /// # Errors
    ///
    /// I/O failures writing to stdout.
    pub fn show_gathered<T: Serialize + Render>(
        &self,
        value: &T,
        degraded: &[DegradedSource],
    ) -> io::Result<ExitCode> {
        let exit = if degraded.is_empty() {
            ExitCode::Success
        } else {
            ExitCode::Degraded
        };
        let stdout = io::stdout();
        match self.format {
            OutputFormat::Json => JsonOutput::new(value, degraded, exit).write_to(stdout.lock())?,
            OutputFormat::Text => {
                write!(stdout.lock(), "{}", value.to_text())?;
                for d in degraded {
                    self.notice(&format!("{} unavailable: {}", d.source, d.notice));
                }
            }
        }
        Ok(exit)
    }

    /// Confirm a completed action.
    ///
    /// # Errors
    ///
    /// I/O failures writing to stdout.
    pub fn success(&self, message: &str) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                JsonOutput::new(&Message { message }, &[], ExitCode::Success).write_to(io::stdout().lock())?;
            }
            OutputFormat::Text if !self.quiet => {
                writeln!(io::stdout().lock(), "{} {message}", "✓".green())?;
            }
            OutputFormat::Text => {}
        }
        Ok(ExitCode::Success)
    }

    /// A non-fatal notice on stderr. Suppressed by `--quiet`.
    pub fn notice(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {message}", "!".yellow());
        }
    }

    /// Report a failure on stderr and return its exit code.
    pub fn failure(&self, message: &str, exit: ExitCode) -> ExitCode {
        if self.is_json() {
            let structured = StructuredError::from_message(message, exit);
            match serde_json::to_string_pretty(&structured) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("[{}] Error: {message}", exit.code_prefix()),
            }
        } else {
            eprintln!("{} {message}", format!("[{}] Error:", exit.code_prefix()).red());
        }
        exit
    }
}
