//! Per-source fallback for concurrent dashboard loads.
//!
//! A dashboard fetches several independent sources at once. A failing source
//! never aborts the others: it is replaced by its fallback and recorded here.
//! An authorization failure is different, since the session is already gone
//! by the time it is seen, so it turns the whole load into an error.

use serde::Serialize;

use crate::http::ApiError;

/// A source that fell back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegradedSource {
    pub source: &'static str,
    pub notice: String,
}

/// A loaded screen plus whatever had to fall back.
#[derive(Debug, Clone, Serialize)]
pub struct Gathered<T> {
    pub data: T,
    pub degraded: Vec<DegradedSource>,
}

impl<T> Gathered<T> {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Collects fallbacks while a screen's sources are unpacked.
#[derive(Debug, Default)]
pub struct DegradationReport {
    degraded: Vec<DegradedSource>,
    expired: Option<ApiError>,
}

impl DegradationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap `result`, or record the failure and use `fallback`.
    pub fn recover<T>(&mut self, source: &'static str, result: Result<T, ApiError>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Failed to load {source}: {err}");
                if err.is_unauthorized() && self.expired.is_none() {
                    self.expired = Some(err.clone());
                }
                self.degraded.push(DegradedSource {
                    source,
                    notice: err.user_message(&format!("Failed to load {source}")),
                });
                fallback
            }
        }
    }

    /// [`recover`](Self::recover) with `T::default()` as the fallback.
    pub fn recover_default<T: Default>(&mut self, source: &'static str, result: Result<T, ApiError>) -> T {
        self.recover(source, result, T::default())
    }

    /// Some source was rejected with 401.
    #[must_use]
    pub fn session_expired(&self) -> bool {
        self.expired.is_some()
    }

    /// Finish the load.
    ///
    /// # Errors
    ///
    /// The first authorization failure, if any source hit one.
    pub fn finish<T>(self, data: T) -> Result<Gathered<T>, ApiError> {
        if let Some(err) = self.expired {
            return Err(err);
        }
        Ok(Gathered {
            data,
            degraded: self.degraded,
        })
    }
}
