//! Application configuration management.
//!
//! Settings are layered, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. The TOML configuration file (plus a named `[profiles.<name>]` section)
//! 3. `COACHDASH_*` environment variables (`COACHDASH_API_URL`,
//!    `COACHDASH_TOKEN_FILE`, `COACHDASH_OUTPUT`)
//! 4. CLI flags, applied with [`Config::merge_cli`]
//!
//! # Example file
//!
//! ```toml
//! api_url = "https://coach-api.example.com"
//! output = "text"
//!
//! [profiles.staging]
//! api_url = "https://staging.example.com"
//! token_file = "/tmp/coachdash-staging.token"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{Cli, OutputFormat};
use crate::session::{FileTokenStore, TokenStoreError};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Prefix of the environment variables read into the configuration.
pub const ENV_PREFIX: &str = "COACHDASH_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("failed to determine the configuration directory")]
    NoConfigDir,

    #[error("configuration file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    TokenLocation(#[from] TokenStoreError),
}

/// Per-profile overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the coaching API.
    pub api_url: String,
    /// Token file override. The platform data directory is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    /// Default output format.
    pub output: OutputFormat,
    /// Disable colored output.
    pub no_color: bool,
    /// Named profiles.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_file: None,
            output: OutputFormat::Text,
            no_color: false,
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load from `path`, or the default location when `None`.
    ///
    /// # Errors
    ///
    /// Malformed files, bad environment values and unknown profiles.
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::try_load_from_path(path, profile),
            None => match Self::default_config_path() {
                Ok(path) => Self::try_load_from_path(&path, profile),
                Err(_) => {
                    log::debug!("No configuration directory; using defaults and environment");
                    Self::try_load_from_path(Path::new(""), profile)
                }
            },
        }
    }

    /// Load from `path`, falling back to defaults if the file is unusable.
    ///
    /// A missing file is not an error.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>, profile: Option<&str>) -> Self {
        match Self::try_load_from_path(path.as_ref(), profile) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Load from `path` and report any problem.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn try_load_from_path(path: &Path, profile: Option<&str>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.is_file() {
            log::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        if let Some(name) = profile {
            let base: Self = figment.extract().map_err(Box::new)?;
            let overrides = base
                .profiles
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownProfile {
                    name: name.to_string(),
                    available: base.profile_names(),
                })?;
            log::debug!("Using profile '{name}'");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).only(&["api_url", "token_file", "output"]))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            "none".to_string()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }

    /// Apply CLI flags on top of the loaded configuration.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_url {
            self.api_url.clone_from(url);
        }
        if let Some(path) = &cli.token_file {
            self.token_file = Some(path.clone());
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if cli.no_color {
            self.no_color = true;
        }
    }

    /// The API base URL, checked.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidUrl`] for unparsable or non-HTTP URLs.
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason,
        };
        let url = Url::parse(self.api_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(url)
    }

    /// Where the session token lives.
    ///
    /// # Errors
    ///
    /// No override and no platform data directory.
    pub fn token_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.token_file {
            Some(path) => Ok(path.clone()),
            None => Ok(FileTokenStore::default_path()?),
        }
    }

    /// Default platform-specific configuration file path.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigDir`] if the platform has no home directory.
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let project_dirs = ProjectDirs::from("com", "coachdash", "coachdash").ok_or(ConfigError::NoConfigDir)?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Serialize as TOML.
    ///
    /// # Errors
    ///
    /// Serialization failures.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// I/O or serialization failures.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(path, self.to_toml()?).map_err(io)?;
        Ok(())
    }

    /// Write a default configuration file for `config init`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::AlreadyExists`] unless `force`, or write failures.
    pub fn init(path: &Path, force: bool) -> Result<Self, ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let config = Self::default();
        config.save(path)?;
        log::info!("Wrote default configuration to {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_base() {
        let config = Config::default();
        assert_eq!(config.api_base().unwrap().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_api_base_rejects_other_schemes() {
        let config = Config {
            api_url: "ftp://example.com".into(),
            ..Config::default()
        };
        assert!(matches!(config.api_base(), Err(ConfigError::InvalidUrl { .. })));

        let config = Config {
            api_url: "not a url".into(),
            ..Config::default()
        };
        assert!(config.api_base().is_err());
    }

    #[test]
    fn test_token_path_override() {
        let config = Config {
            token_file: Some(PathBuf::from("/tmp/t.json")),
            ..Config::default()
        };
        assert_eq!(config.token_path().unwrap(), PathBuf::from("/tmp/t.json"));
    }

    #[test]
    fn test_token_path_defaults_to_data_dir() {
        if let Ok(path) = Config::default().token_path() {
            assert_eq!(path, FileTokenStore::default_path().unwrap());
            assert!(path.ends_with(crate::session::TOKEN_KEY));
        }
    }

    #[test]
    fn test_toml_round_trip_omits_empty_sections() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("api_url = \"http://localhost:8000\""));
        assert!(!text.contains("profiles"));
        assert!(!text.contains("token_file"));
    }
}
