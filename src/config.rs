//! Configuration module
//!
//! `AppConfig` is read from a TOML file (default
//! `~/.config/identity-api/config.toml`). Every section and field is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! url = "sqlite://./identity.db?mode=rwc"   # or "memory"
//!
//! [lockout]
//! max_failed_attempts = 5
//! lockout_minutes = 5
//!
//! [i18n]
//! locale = "tr"
//! [i18n.overrides]
//! invalid_credentials = "E-posta veya parola yanlış."
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::IntoDeserializer;
use serde::Deserialize;
use thiserror::Error;

use crate::application::identity::{LockoutPolicy, PasswordPolicy, MAX_LOCKOUT_MINUTES};
use crate::infrastructure::DatabaseConfig;
use crate::shared::{Locale, MessageKey, Messages};

/// `database.url` value selecting the in-memory store
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown message key in [i18n.overrides]: {0}")]
    UnknownMessageKey(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DatabaseConfig::default().url,
        }
    }
}

impl DatabaseSection {
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case(MEMORY_DATABASE_URL)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub locale: Locale,
    /// Message key (snake_case) -> replacement text
    pub overrides: HashMap<String, String>,
}

impl I18nConfig {
    fn parsed_overrides(&self) -> Result<HashMap<MessageKey, String>, ConfigError> {
        self.overrides
            .iter()
            .map(|(key, text)| {
                let parsed: Result<MessageKey, serde::de::value::Error> =
                    MessageKey::deserialize(key.as_str().into_deserializer());
                parsed
                    .map(|k| (k, text.clone()))
                    .map_err(|_| ConfigError::UnknownMessageKey(key.clone()))
            })
            .collect()
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub password: PasswordPolicy,
    pub lockout: LockoutPolicy,
    pub i18n: I18nConfig,
}

impl AppConfig {
    /// Parse and validate TOML text. Environment overrides are not applied.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// `DATABASE_URL` replaces `database.url`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "security.bcrypt_cost must be between 4 and 31, got {}",
                self.security.bcrypt_cost
            )));
        }
        if self.lockout.max_failed_attempts < 1 {
            return Err(ConfigError::Invalid(
                "lockout.max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if !(0..=MAX_LOCKOUT_MINUTES).contains(&self.lockout.lockout_minutes) {
            return Err(ConfigError::Invalid(format!(
                "lockout.lockout_minutes must be between 0 and {}, got {}",
                MAX_LOCKOUT_MINUTES, self.lockout.lockout_minutes
            )));
        }
        self.i18n.parsed_overrides()?;
        Ok(())
    }

    /// Message catalog for the configured locale with overrides applied.
    pub fn messages(&self) -> Result<Messages, ConfigError> {
        let overrides = self.i18n.parsed_overrides()?;
        Ok(Messages::new(self.i18n.locale).with_overrides(&overrides))
    }
}

/// `~/.config/identity-api/config.toml` (platform config dir)
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("identity-api")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.lockout.max_failed_attempts, 5);
        assert_eq!(config.password.required_length, 6);
        assert!(config.password.require_digit);
        assert_eq!(config.i18n.locale, Locale::Tr);
        assert!(!config.database.is_memory());
        assert_eq!(config.database.url, "sqlite://./identity.db?mode=rwc");
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9090

            [database]
            url = "memory"

            [logging]
            format = "json"

            [security]
            bcrypt_cost = 4

            [password]
            required_length = 10
            require_uppercase = true

            [lockout]
            max_failed_attempts = 3
            lockout_minutes = 15

            [i18n]
            locale = "en"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address(), "0.0.0.0:9090");
        assert!(config.database.is_memory());
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.security.bcrypt_cost, 4);
        assert_eq!(config.password.required_length, 10);
        assert!(config.password.require_uppercase);
        assert!(config.password.require_digit);
        assert_eq!(config.lockout.max_failed_attempts, 3);
        assert_eq!(config.lockout.lockout_minutes, 15);
        assert_eq!(config.i18n.locale, Locale::En);
    }

    #[test]
    fn message_overrides_apply() {
        let config = AppConfig::from_toml_str(
            r#"
            [i18n.overrides]
            role_not_found = "Böyle bir rol yok."
            "#,
        )
        .unwrap();

        let messages = config.messages().unwrap();
        assert_eq!(messages.text(MessageKey::RoleNotFound), "Böyle bir rol yok.");
        assert_eq!(messages.text(MessageKey::UserNotFound), "Kullanıcı bulunamadı.");
    }

    #[test]
    fn unknown_override_key_is_rejected() {
        let err = AppConfig::from_toml_str(
            r#"
            [i18n.overrides]
            no_such_key = "x"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMessageKey(k) if k == "no_such_key"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("[security]\nbcrypt_cost = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[lockout]\nmax_failed_attempts = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[lockout]\nlockout_minutes = -1"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[lockout]\nlockout_minutes = 200000000000"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(AppConfig::from_toml_str("[lockout]\nlockout_minutes = 525600").is_ok());
        assert!(matches!(
            AppConfig::from_toml_str("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        assert!(default_config_path().ends_with("identity-api/config.toml"));
    }
}
