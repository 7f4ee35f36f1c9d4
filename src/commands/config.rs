//! `config show|path|init`. These never touch the network or the session.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::Printer;

fn target_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::default_config_path()?),
    }
}

pub fn run(command: &ConfigCommand, config: &Config, explicit: Option<&Path>, printer: &Printer) -> Result<ExitCode> {
    match command {
        ConfigCommand::Show => Ok(printer.show(config)?),
        ConfigCommand::Path => {
            let path = target_path(explicit)?;
            Ok(printer.success(&path.display().to_string())?)
        }
        ConfigCommand::Init { force } => {
            let path = target_path(explicit)?;
            Config::init(&path, *force)?;
            Ok(printer.success(&format!("Wrote {}", path.display()))?)
        }
    }
}
