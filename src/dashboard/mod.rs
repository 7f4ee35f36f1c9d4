//! Screen loaders for the admin and trainer dashboards.
//!
//! Each loader issues all of its screen's requests at once and degrades per
//! source, see [`gather`].

pub mod admin;
pub mod gather;
pub mod trainer;

pub use admin::{load_admin_dashboard, AdminDashboard};
pub use gather::{DegradationReport, DegradedSource, Gathered};
pub use trainer::{load_trainer_dashboard, TrainerDashboard};
