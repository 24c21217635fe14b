//! # Configuration
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`PEMBUKUAN_*`)
//! 2. Config file (`config.toml` in the platform config folder)
//! 3. Defaults (this file)
//!
//! ## Config File
//! ```toml
//! business_name = "Pempek Putri"
//! database_path = "/home/putri/pembukuan.db"
//! session_lifetime_secs = 28800
//! default_unit = "Kg"
//! ```
//!
//! Configuration is read-only after startup, so no lock is needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use pembukuan_core::{Money, DEFAULT_MATERIAL_UNIT};

const ENV_BUSINESS_NAME: &str = "PEMBUKUAN_BUSINESS_NAME";
const ENV_DB_PATH: &str = "PEMBUKUAN_DB_PATH";
const ENV_JWT_SECRET: &str = "PEMBUKUAN_JWT_SECRET";
const ENV_SESSION_LIFETIME: &str = "PEMBUKUAN_SESSION_LIFETIME_SECS";
const ENV_DEFAULT_UNIT: &str = "PEMBUKUAN_DEFAULT_UNIT";
const ENV_CONFIG_FILE: &str = "PEMBUKUAN_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Shown in the report title and used in backup file names.
    pub business_name: String,

    /// SQLite database file.
    pub database_path: PathBuf,

    /// Secret for signing access tokens.
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// How long a sign-in stays valid, in seconds.
    pub session_lifetime_secs: i64,

    /// Unit for stock rows created by a purchase of a new material.
    pub default_unit: String,
}

/// The config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    business_name: Option<String>,
    database_path: Option<PathBuf>,
    jwt_secret: Option<String>,
    session_lifetime_secs: Option<i64>,
    default_unit: Option<String>,
}

impl Default for AppConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Business: "Pempek Putri"
    /// - Database: `<data dir>/pembukuan.db`, or `./pembukuan.db`
    /// - Session: 8 hours
    /// - Unit: "Kg"
    fn default() -> Self {
        AppConfig {
            business_name: "Pempek Putri".to_string(),
            database_path: default_database_path(),
            jwt_secret: "pembukuan-dev-secret-change-in-production".to_string(),
            session_lifetime_secs: 8 * 60 * 60,
            default_unit: DEFAULT_MATERIAL_UNIT.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the config file if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        let path = std::env::var(ENV_CONFIG_FILE)
            .map(PathBuf::from)
            .ok()
            .or_else(config_file_path);

        if let Some(path) = path.filter(|p| p.exists()) {
            config.merge_file(&path)?;
            info!(path = %path.display(), "Loaded config file");
        }

        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults overridden by the environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies the keys set in a TOML document.
    pub fn merge_toml(&mut self, text: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;

        if let Some(name) = file.business_name {
            self.business_name = name;
        }
        if let Some(path) = file.database_path {
            self.database_path = path;
        }
        if let Some(secret) = file.jwt_secret {
            self.jwt_secret = secret;
        }
        if let Some(secs) = file.session_lifetime_secs {
            self.session_lifetime_secs = secs;
        }
        if let Some(unit) = file.default_unit {
            self.default_unit = unit;
        }

        self.check()
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.merge_toml(&text)
    }

    /// Applies `PEMBUKUAN_*` overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_BUSINESS_NAME) {
            self.business_name = name;
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            self.jwt_secret = secret;
        }
        if let Some(raw) = lookup(ENV_SESSION_LIFETIME) {
            self.session_lifetime_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(ENV_SESSION_LIFETIME.to_string()))?;
        }
        if let Some(unit) = lookup(ENV_DEFAULT_UNIT) {
            self.default_unit = unit;
        }

        self.check()
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("session_lifetime_secs".to_string()));
        }
        if self.default_unit.trim().is_empty() {
            return Err(ConfigError::InvalidValue("default_unit".to_string()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        Ok(())
    }

    /// Formats a rupiah amount for display.
    ///
    /// ## Example
    /// ```rust
    /// use pembukuan_dashboard::config::AppConfig;
    ///
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(15000), "Rp 15.000");
    /// ```
    pub fn format_currency(&self, rupiah: i64) -> String {
        Money::from_rupiah(rupiah).to_string()
    }

    /// Business name folded to a file-name-safe slug ("pempek-putri").
    pub fn business_slug(&self) -> String {
        let mut slug = String::with_capacity(self.business_name.len());
        for c in self.business_name.trim().chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }

        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            "pembukuan".to_string()
        } else {
            slug.to_string()
        }
    }
}

/// `config.toml` in the platform config folder.
///
/// ## Platform-Specific Paths
/// - **Linux**: `~/.config/pembukuan/config.toml`
/// - **macOS**: `~/Library/Application Support/id.pempekputri.pembukuan/config.toml`
/// - **Windows**: `%APPDATA%\pempekputri\pembukuan\config\config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("id", "pempekputri", "pembukuan").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_database_path() -> PathBuf {
    match ProjectDirs::from("id", "pempekputri", "pembukuan") {
        Some(dirs) => dirs.data_dir().join("pembukuan.db"),
        None => {
            debug!("No platform data dir, using working directory");
            PathBuf::from("pembukuan.db")
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Cannot read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(15000), "Rp 15.000");
        assert_eq!(config.format_currency(0), "Rp 0");
        assert_eq!(config.format_currency(-25000), "-Rp 25.000");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let mut config = AppConfig::default();
        config
            .merge_toml("business_name = \"Pempek Bu Rini\"\ndefault_unit = \"Pcs\"\n")
            .unwrap();

        assert_eq!(config.business_name, "Pempek Bu Rini");
        assert_eq!(config.default_unit, "Pcs");
        assert_eq!(config.session_lifetime_secs, 8 * 60 * 60);
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.merge_toml("tax_rate = 11\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, "/tmp/ledger.db"),
            (ENV_SESSION_LIFETIME, "3600"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.session_lifetime_secs, 3600);
    }

    #[test]
    fn test_env_rejects_bad_lifetime() {
        let mut config = AppConfig::default();
        let result = config.apply_env_from(|key| {
            (key == ENV_SESSION_LIFETIME).then(|| "sehari".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_business_slug() {
        let mut config = AppConfig::default();
        assert_eq!(config.business_slug(), "pempek-putri");

        config.business_name = "  Pempek & Tekwan Putri! ".to_string();
        assert_eq!(config.business_slug(), "pempek-tekwan-putri");

        config.business_name = "***".to_string();
        assert_eq!(config.business_slug(), "pembukuan");
    }
}
