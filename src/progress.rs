//! Loading indicator shown while a screen's requests are in flight.
//!
//! Rendered on stderr with indicatif, so it never mixes with command output.
//! It is hidden in quiet mode, for JSON output, and when stderr is not a
//! terminal.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// A spinner with a message. Cleared on drop.
pub struct LoadingIndicator {
    bar: Option<ProgressBar>,
}

impl LoadingIndicator {
    /// Start a spinner unless `hidden`.
    #[must_use]
    pub fn start(message: &str, hidden: bool) -> Self {
        if hidden {
            return Self::hidden();
        }
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// An indicator that draws nothing.
    #[must_use]
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.bar.is_none()
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Remove the spinner from the terminal.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        self.finish();
    }
}
