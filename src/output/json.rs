//! JSON output envelope.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "data": { ... },
//!   "degraded": [{"source": "analytics", "notice": "Failed to load analytics"}],
//!   "exit_code": 3,
//!   "exit_code_name": "CD003"
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::dashboard::DegradedSource;
use crate::error::ExitCode;

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a, T: Serialize> {
    /// Command result
    pub data: &'a T,
    /// Sources that fell back to defaults
    pub degraded: &'a [DegradedSource],
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CD000")
    pub exit_code_name: &'static str,
}

impl<'a, T: Serialize> JsonOutput<'a, T> {
    #[must_use]
    pub fn new(data: &'a T, degraded: &'a [DegradedSource], exit_code: ExitCode) -> Self {
        Self {
            data,
            degraded,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON plus a trailing newline.
    ///
    /// # Errors
    ///
    /// Serialization or I/O failures.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)
    }
}
