use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

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
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Weather service endpoints
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Search pipeline tuning
    #[serde(default)]
    pub search: SearchConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Geocoding search endpoint (Open-Meteo compatible)
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,

    /// Forecast endpoint (Open-Meteo compatible)
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,

    /// Reverse geocoding endpoint (Nominatim compatible)
    #[serde(default = "default_reverse_base_url")]
    pub reverse_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum trimmed query length before suggestions are fetched
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: u32,

    /// Quiet interval a query must hold before a suggestion request fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Result cap for suggestion requests
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: u32,

    /// Result cap for submission lookups
    #[serde(default = "default_submit_limit")]
    pub submit_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,

    /// User-Agent header sent to the reverse geocoding service
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_reverse_base_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_min_query_chars() -> u32 {
    2
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_suggestion_limit() -> u32 {
    5
}

fn default_submit_limit() -> u32 {
    10
}

fn default_timeout_seconds() -> u32 {
    10
}

fn default_user_agent() -> String {
    "stratus/0.1 (weather client)".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            forecast_base_url: default_forecast_base_url(),
            reverse_base_url: default_reverse_base_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: default_min_query_chars(),
            debounce_ms: default_debounce_ms(),
            suggestion_limit: default_suggestion_limit(),
            submit_limit: default_submit_limit(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig::default(),
            search: SearchConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it with defaults
    /// if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Invalid(format!("cannot create config dir: {}", e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Invalid(format!("cannot write config: {}", e)))
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no config directory on this system".into()))?
            .join("stratus");

        Ok(config_dir.join("config.toml"))
    }

    /// Validate the configuration.
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.endpoints.geocoding_base_url,
            "endpoints.geocoding_base_url",
            &mut result,
        );
        self.validate_url(
            &self.endpoints.forecast_base_url,
            "endpoints.forecast_base_url",
            &mut result,
        );
        self.validate_url(
            &self.endpoints.reverse_base_url,
            "endpoints.reverse_base_url",
            &mut result,
        );

        if self.search.min_query_chars == 0 {
            result.add_warning(
                "search.min_query_chars",
                "Suggestions will fire on every keystroke, including empty input",
            );
        }

        if self.search.debounce_ms == 0 {
            result.add_warning(
                "search.debounce_ms",
                "Suggestion debounce disabled; every keystroke issues a request",
            );
        } else if self.search.debounce_ms > 5000 {
            result.add_warning(
                "search.debounce_ms",
                "Suggestion debounce is more than 5 seconds",
            );
        }

        if self.search.suggestion_limit == 0 {
            result.add_error("search.suggestion_limit", "Result cap must be at least 1");
        }

        if self.search.submit_limit == 0 {
            result.add_error("search.submit_limit", "Result cap must be at least 1");
        }

        if self.http.timeout_seconds == 0 {
            result.add_error("http.timeout_seconds", "Timeout must be at least 1 second");
        } else if self.http.timeout_seconds > 300 {
            result.add_error("http.timeout_seconds", "Timeout cannot exceed 300 seconds");
        }

        if self.http.user_agent.trim().is_empty() {
            result.add_warning(
                "http.user_agent",
                "Empty User-Agent; some reverse geocoding services reject anonymous clients",
            );
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
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}
