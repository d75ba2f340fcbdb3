//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whichever source wins, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `PCA_AUTH_URI`: Identity provider base URI (required)
//! - `PCA_AUTH_CLIENT_ID`: OAuth client ID (required)
//! - `PCA_WEB_URI`: Application base URL, used as `redirect_uri` (required)
//! - `PCA_LOG_LEVEL`: Default log filter (default `info`)
//! - `PCA_LOG_JSON`: Emit JSON log lines (true/false, default false)
//!
//! A `.env` file in the working directory (or a parent) is read first by
//! [`load_dotenv`]; real environment variables take precedence.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./pca.toml` or `./pca.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use pca_domain::{AuthConfig, Config, LoggingConfig, PcaError, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `PcaError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or malformed
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Read a `.env` file into the process environment, if one exists
///
/// Existing variables are not overridden. Returns the path that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!(path = %path.display(), "Loaded .env");
            Some(path)
        }
        Err(e) => {
            tracing::debug!(error = %e, "No .env file loaded");
            None
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PcaError::Config` if a required variable is missing or the
/// resulting configuration fails validation.
pub fn load_from_env() -> Result<Config> {
    let auth = AuthConfig::new(
        env_var("PCA_AUTH_URI")?,
        env_var("PCA_AUTH_CLIENT_ID")?,
        env_var("PCA_WEB_URI")?,
    );

    let mut logging = LoggingConfig::default();
    if let Ok(level) = std::env::var("PCA_LOG_LEVEL") {
        logging.level = level;
    }
    logging.json = env_bool("PCA_LOG_JSON", false);

    let config = Config { auth, logging };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PcaError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or malformed
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PcaError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PcaError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PcaError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PcaError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PcaError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PcaError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.push(cwd.join("../config.toml"));
        candidates.push(cwd.join("../config.json"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 4] {
    [dir.join("pca.toml"), dir.join("pca.json"), dir.join("config.toml"), dir.join("config.json")]
}

/// Get required environment variable
///
/// Empty values count as missing.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PcaError::Config(format!("Missing required environment variable: {key}"))),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const AUTH_VARS: [&str; 5] =
        ["PCA_AUTH_URI", "PCA_AUTH_CLIENT_ID", "PCA_WEB_URI", "PCA_LOG_LEVEL", "PCA_LOG_JSON"];

    fn clear_env() {
        for key in AUTH_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        std::env::set_var("PCA_TEST_BOOL_YES", "YES");
        std::env::set_var("PCA_TEST_BOOL_OFF", "off");
        std::env::remove_var("PCA_TEST_BOOL_MISSING");

        assert!(env_bool("PCA_TEST_BOOL_YES", false));
        assert!(!env_bool("PCA_TEST_BOOL_OFF", true));
        assert!(env_bool("PCA_TEST_BOOL_MISSING", true));

        std::env::remove_var("PCA_TEST_BOOL_YES");
        std::env::remove_var("PCA_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();

        std::env::set_var("PCA_AUTH_URI", "https://auth.example.com");
        std::env::set_var("PCA_AUTH_CLIENT_ID", "client123");
        std::env::set_var("PCA_WEB_URI", "https://app.example.com/");
        std::env::set_var("PCA_LOG_LEVEL", "pca_common=debug");
        std::env::set_var("PCA_LOG_JSON", "true");

        let config = load_from_env().unwrap();
        assert_eq!(config.auth.uri, "https://auth.example.com");
        assert_eq!(config.auth.client_id, "client123");
        assert_eq!(config.auth.web_uri, "https://app.example.com/");
        assert_eq!(config.logging.level, "pca_common=debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        std::env::set_var("PCA_AUTH_URI", "https://auth.example.com");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, PcaError::Config(msg) if msg.contains("PCA_AUTH_CLIENT_ID")));

        clear_env();
    }

    #[test]
    fn test_load_from_env_rejects_relative_web_uri() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        std::env::set_var("PCA_AUTH_URI", "https://auth.example.com");
        std::env::set_var("PCA_AUTH_CLIENT_ID", "client123");
        std::env::set_var("PCA_WEB_URI", "app.example.com");

        assert!(matches!(load_from_env(), Err(PcaError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = write_config(
            ".toml",
            r#"
[auth]
uri = "https://auth.example.com"
client_id = "client123"
web_uri = "https://app.example.com/"

[logging]
level = "debug"
"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.auth.client_id, "client123");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_from_file_json() {
        let file = write_config(
            ".json",
            r#"{
                "auth": {
                    "uri": "https://auth.example.com",
                    "client_id": "client123",
                    "web_uri": "https://app.example.com/"
                },
                "logging": { "level": "warn", "json": true }
            }"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.auth.web_uri, "https://app.example.com/");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file_validates() {
        let file = write_config(
            ".toml",
            r#"
[auth]
uri = "https://auth.example.com"
client_id = ""
web_uri = "https://app.example.com/"
"#,
        );

        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, PcaError::Config(msg) if msg.contains("client_id")));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/pca.toml")));
        assert!(matches!(result, Err(PcaError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let file = write_config(".json", r#"{ "auth": "#);
        assert!(load_from_file(Some(file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("auth: {}", &PathBuf::from("pca.yaml"));
        assert!(matches!(result, Err(PcaError::Config(msg)) if msg.contains("yaml")));
    }
}
