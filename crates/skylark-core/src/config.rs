use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted for the API token when no config file sets one.
pub const TOKEN_ENV_VAR: &str = "SKYLARK_API_TOKEN";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (also holds preference files)
    pub config_dir: PathBuf,

    /// Remote weather/geocoding service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Preference storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote service settings.
///
/// Token and locale are baked into every request URL; there is no request
/// timeout and no retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service root, e.g. `https://api.caiyunapp.com`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token (can be set via `SKYLARK_API_TOKEN`)
    #[serde(default = "default_token")]
    pub token: String,

    /// Locale passed to the geocoding endpoint
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_base_url() -> String {
    "https://api.caiyunapp.com".to_string()
}

fn default_token() -> String {
    std::env::var(TOKEN_ENV_VAR).unwrap_or_default()
}

fn default_lang() -> String {
    "zh_CN".to_string()
}

impl ApiConfig {
    /// The token, or `MissingSetting` when none is configured.
    pub fn require_token(&self) -> std::result::Result<&str, ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingSetting("api.token".to_string()));
        }
        Ok(&self.token)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: default_token(),
            lang: default_lang(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Preference namespace; the store lives at `{config_dir}/{namespace}.json`
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "skylark".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skylark");

        Self {
            config_dir,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.display().to_string()).into());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()));
            }
        };

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.base_url, "api.base_url", &mut result);

        if self.api.token.trim().is_empty() {
            result.add_warning(
                "api.token",
                format!("No API token configured - set it in config.toml or {}", TOKEN_ENV_VAR),
            );
        }

        if self.api.lang.trim().is_empty() {
            result.add_error("api.lang", "Locale cannot be empty");
        }

        if self.storage.namespace.trim().is_empty() {
            result.add_error("storage.namespace", "Namespace cannot be empty");
        } else if self
            .storage
            .namespace
            .contains(|c: char| c == '/' || c == '\\')
        {
            result.add_error("storage.namespace", "Namespace cannot contain path separators");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skylark");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.api.token = "test-token".to_string();
        config
    }

    #[test]
    fn test_valid_default_config() {
        let result = configured().validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_default_api_settings() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.caiyunapp.com");
        assert_eq!(config.api.lang, "zh_CN");
        assert_eq!(config.storage.namespace, "skylark");
    }

    #[test]
    fn test_invalid_url() {
        let mut config = configured();
        config.api.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "api.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = configured();
        config.api.base_url = "ftp://api.example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_missing_token_is_warning() {
        let mut config = configured();
        config.api.token = String::new();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "api.token"));
    }

    #[test]
    fn test_empty_lang_is_error() {
        let mut config = configured();
        config.api.lang = " ".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "api.lang"));
    }

    #[test]
    fn test_namespace_with_separator_is_error() {
        let mut config = configured();
        config.storage.namespace = "../escape".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "storage.namespace"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = configured();
        config.config_dir = dir.path().to_path_buf();
        config.api.lang = "en_US".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.config_dir, dir.path());
        assert_eq!(loaded.api.lang, "en_US");
        assert_eq!(loaded.api.token, "test-token");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = \"/tmp/skylark\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.caiyunapp.com");
        assert_eq!(loaded.storage.namespace, "skylark");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load_from(&path).unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::NotFound(p)) => assert!(p.ends_with("absent.toml")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_require_token() {
        let mut api = ApiConfig::default();
        api.token = "abc".to_string();
        assert_eq!(api.require_token().unwrap(), "abc");

        api.token = "  ".to_string();
        assert!(matches!(
            api.require_token(),
            Err(ConfigError::MissingSetting(field)) if field == "api.token"
        ));
    }
}
