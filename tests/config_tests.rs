use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use coachdash::cli::{Cli, OutputFormat};
use coachdash::config::{Config, ConfigError, DEFAULT_API_URL};
use tempfile::TempDir;

// Environment variables are process-wide.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_VARS: [&str; 3] = ["COACHDASH_API_URL", "COACHDASH_TOKEN_FILE", "COACHDASH_OUTPUT"];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_missing_file_gives_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = TempDir::new().unwrap();

    let config = Config::try_load_from_path(&dir.path().join("absent.toml"), None).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.api_url, DEFAULT_API_URL);
}

#[test]
fn test_file_then_env_then_cli() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
api_url = "https://file.example.com"
output = "json"
token_file = "/tmp/file.token"
"#,
    );

    let config = Config::try_load_from_path(&path, None).unwrap();
    assert_eq!(config.api_url, "https://file.example.com");
    assert_eq!(config.output, OutputFormat::Json);

    std::env::set_var("COACHDASH_API_URL", "https://env.example.com");
    let mut config = Config::try_load_from_path(&path, None).unwrap();
    clear_env();
    assert_eq!(config.api_url, "https://env.example.com");
    assert_eq!(config.token_file, Some(PathBuf::from("/tmp/file.token")));

    let cli = Cli::parse_from([
        "coachdash",
        "--api-url",
        "https://cli.example.com",
        "-o",
        "text",
        "--no-color",
        "whoami",
    ]);
    config.merge_cli(&cli);
    assert_eq!(config.api_url, "https://cli.example.com");
    assert_eq!(config.output, OutputFormat::Text);
    assert!(config.no_color);
}

#[test]
fn test_profile_overrides_file_values() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
api_url = "https://prod.example.com"
output = "json"

[profiles.staging]
api_url = "https://staging.example.com"
"#,
    );

    let config = Config::try_load_from_path(&path, Some("staging")).unwrap();
    assert_eq!(config.api_url, "https://staging.example.com");
    assert_eq!(config.output, OutputFormat::Json);
    assert!(config.token_file.is_none());
}

#[test]
fn test_unknown_profile_lists_available() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[profiles.staging]\napi_url = \"https://staging.example.com\"\n");

    match Config::try_load_from_path(&path, Some("qa")) {
        Err(ConfigError::UnknownProfile { name, available }) => {
            assert_eq!(name, "qa");
            assert_eq!(available, "staging");
        }
        other => panic!("expected unknown profile, got {other:?}"),
    }
}

#[test]
fn test_malformed_file_is_an_error_but_lenient_load_falls_back() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "output = \"yaml\"\n");

    assert!(matches!(
        Config::try_load_from_path(&path, None),
        Err(ConfigError::Load(_))
    ));
    assert_eq!(Config::load_from_path(&path, None), Config::default());
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::init(&path, false).unwrap();
    let written = Config::try_load_from_path(&path, None).unwrap();
    assert_eq!(written, Config::default());

    assert!(matches!(Config::init(&path, false), Err(ConfigError::AlreadyExists(_))));
    assert!(Config::init(&path, true).is_ok());
}

#[test]
fn test_token_file_override_is_used_verbatim() {
    let config = Config {
        token_file: Some(PathBuf::from("/tmp/explicit.token")),
        ..Config::default()
    };
    assert_eq!(config.token_path().unwrap(), PathBuf::from("/tmp/explicit.token"));
}
