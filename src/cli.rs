//! Command-line interface definitions for coachdash.
//!
//! Every dashboard screen is a subcommand. Global options select the backend,
//! the token file and the output format.
//!
//! # Example
//!
//! ```bash
//! # Sign in (password from the environment)
//! COACHDASH_PASSWORD=secret coachdash login coach@example.com
//!
//! # Open the dashboard for the signed-in role
//! coachdash dashboard
//!
//! # Move the third onboarding question to the top, JSON output
//! coachdash --output json trainer questions move 3 1
//!
//! # Talk to a staging backend
//! coachdash --api-url https://staging.example.com admin trainers
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::api::parse_timestamp;
use crate::api::reminders::MealType;

/// Admin and trainer console for the nutrition coaching bot.
///
/// coachdash signs in against the coaching backend, remembers the session
/// token, and shows the admin or trainer dashboard for the signed-in role.
#[derive(Debug, Parser)]
#[command(name = "coachdash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Base URL of the coaching API (default: http://localhost:8000)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Where the session token is stored
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named profile from the configuration file
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and open the dashboard for your role
    Login(LoginArgs),
    /// Create a trainer account with a registration code, then sign in
    Register(RegisterArgs),
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Open the dashboard for the signed-in role
    Dashboard,
    /// List question categories
    Categories,
    /// Admin screens
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Trainer screens
    Trainer {
        #[command(subcommand)]
        command: TrainerCommand,
    },
    /// Manage your own account
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,

    /// Account password
    #[arg(long, env = "COACHDASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account email
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Registration code issued by an admin
    #[arg(long)]
    pub code: String,

    /// Account password (at least 6 characters)
    #[arg(long, env = "COACHDASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Load the full admin dashboard
    Dashboard,
    /// List trainers
    Trainers,
    /// Activate or deactivate a trainer
    ToggleTrainer {
        /// Trainer id
        id: String,
    },
    /// List chatbot end users
    Users,
    /// Platform analytics
    Analytics,
    /// Backend health checks
    Health,
    /// Registration codes
    Codes {
        #[command(subcommand)]
        command: CodeCommand,
    },
    /// Question categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum CodeCommand {
    /// List all codes with their status
    List,
    /// Create a code
    Create {
        /// The code text
        code: String,
        /// Expiry as RFC 3339 or YYYY-MM-DD
        #[arg(long, value_name = "WHEN", value_parser = parse_expiry)]
        expires: Option<DateTime<Utc>>,
    },
    /// Make a code redeemable again
    Activate { id: String },
    /// Stop a code from being redeemed
    Deactivate { id: String },
    /// Delete an unused code
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Create { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum TrainerCommand {
    /// Load the full trainer dashboard
    Dashboard,
    /// Bot configuration
    Config {
        #[command(subcommand)]
        command: TrainerConfigCommand,
    },
    /// Message analytics
    Analytics,
    /// Your users
    Users,
    /// Per-user activity
    UserAnalytics,
    /// Onboarding questions
    Questions {
        #[command(subcommand)]
        command: QuestionCommand,
    },
    /// Reminder notifications
    Reminders {
        #[command(subcommand)]
        command: ReminderCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TrainerConfigCommand {
    Show,
    /// Change configuration fields; unspecified fields are kept
    Set(TrainerConfigArgs),
}

#[derive(Debug, Args)]
pub struct TrainerConfigArgs {
    /// Free-form notes for the bot
    #[arg(long)]
    pub notes: Option<String>,

    /// Bot personality description
    #[arg(long)]
    pub personality: Option<String>,

    /// Diet preference (repeat for several); replaces the list
    #[arg(long = "diet", value_name = "PREFERENCE")]
    pub diet_preferences: Vec<String>,

    /// Onboarding question (repeat, at most 5); replaces the list
    #[arg(long = "onboarding", value_name = "QUESTION")]
    pub onboarding_questions: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum QuestionCommand {
    /// List questions in the order the bot asks them
    List,
    /// Add a question (appended unless --step is given)
    Add {
        /// Category id
        #[arg(long)]
        category: String,
        /// Question text
        text: String,
        #[arg(long)]
        step: Option<u32>,
    },
    /// Change a question's text or step
    Edit {
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        step: Option<u32>,
    },
    Delete { id: String },
    /// Move the question at position FROM to position TO (1-based)
    Move { from: usize, to: usize },
}

#[derive(Debug, Subcommand)]
pub enum ReminderCommand {
    /// Show current reminder settings
    Show,
    /// Create the default reminder set
    Init,
    /// Edit one meal reminder
    Meal {
        #[arg(value_enum)]
        meal: MealType,
        /// Time of day, HH:MM
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,
        /// Only remind if no meal was logged for this many hours (1-24)
        #[arg(long, value_name = "HOURS")]
        after_hours: Option<u8>,
        #[command(flatten)]
        toggle: ToggleArgs,
    },
    /// Edit the weigh-in reminder
    Weight {
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,
        /// Days between weigh-ins (1-365)
        #[arg(long, value_name = "DAYS")]
        every_days: Option<u16>,
        #[command(flatten)]
        toggle: ToggleArgs,
    },
    /// Edit the daily summary
    Summary {
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,
        #[command(flatten)]
        toggle: ToggleArgs,
    },
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
}

impl ToggleArgs {
    /// `Some(true)` for --enable, `Some(false)` for --disable.
    #[must_use]
    pub fn state(&self) -> Option<bool> {
        match (self.enable, self.disable) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Change your display name
    Rename { name: String },
    /// Change your password
    Password {
        #[arg(long, env = "COACHDASH_PASSWORD", hide_env_values = true)]
        current: Option<String>,
        #[arg(long, env = "COACHDASH_NEW_PASSWORD", hide_env_values = true)]
        new: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the configuration file location
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse a code expiry: RFC 3339, or a date meaning midnight UTC.
///
/// # Errors
///
/// Returns a message if the value is neither.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("invalid date '{raw}': use RFC 3339 or YYYY-MM-DD"))
}
