//! Configuration management for the `RouteGate` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RouteGateError;
use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when no key is configured otherwise
pub const API_KEY_ENV_FALLBACK: &str = "GOOGLE_MAPS_API_KEY";

/// Root configuration structure for the `RouteGate` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteGateConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Google Maps Platform configuration
    #[serde(default)]
    pub maps: MapsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Trace export configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `index.html`, `debug.html` and static assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Serve HTTPS with these PEM files when set
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// PEM certificate and key locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Google Maps Platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// API key sent to every upstream endpoint
    #[serde(default)]
    pub api_key: String,
    /// Routes API `computeRoutes` endpoint
    #[serde(default = "default_routes_api_url")]
    pub routes_api_url: String,
    /// Base URL of the legacy Maps web services
    #[serde(default = "default_maps_api_base_url")]
    pub maps_api_base_url: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// OpenTelemetry export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP/HTTP collector endpoint; spans are only exported when set
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    /// `service.name` resource attribute
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_routes_api_url() -> String {
    "https://routes.googleapis.com/directions/v2:computeRoutes".to_string()
}

fn default_maps_api_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_service_name() -> String {
    "routegate".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            tls: None,
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            routes_api_url: default_routes_api_url(),
            maps_api_base_url: default_maps_api_base_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: default_service_name(),
        }
    }
}

impl RouteGateConfig {
    /// Load configuration from `config_path`, or the default location when
    /// none is given, then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // Add environment variable overrides, e.g. ROUTEGATE_MAPS__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("ROUTEGATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config = Self::deserialize_from(builder)?;
        config.apply_env_fallback();
        config.validate()?;

        Ok(config)
    }

    /// Build configuration from already assembled sources, without validation
    pub fn deserialize_from(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RouteGateConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        Ok(config)
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        let config = Self::deserialize_from(builder)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("routegate").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.maps.routes_api_url.is_empty() {
            self.maps.routes_api_url = default_routes_api_url();
        }
        if self.maps.maps_api_base_url.is_empty() {
            self.maps.maps_api_base_url = default_maps_api_base_url();
        }
        // Joined with paths like "/maps/api/js"
        while self.maps.maps_api_base_url.ends_with('/') {
            self.maps.maps_api_base_url.pop();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.telemetry.service_name.is_empty() {
            self.telemetry.service_name = default_service_name();
        }
    }

    /// Take the API key from `GOOGLE_MAPS_API_KEY` when none was configured
    pub fn apply_env_fallback(&mut self) {
        if self.maps.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV_FALLBACK) {
                self.maps.api_key = key.trim().to_string();
            }
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_urls()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the Maps Platform API key
    pub fn validate_api_key(&self) -> Result<()> {
        if self.maps.api_key.trim().is_empty() {
            return Err(RouteGateError::config(format!(
                "Maps API key is required. Set maps.api_key, ROUTEGATE_MAPS__API_KEY or {API_KEY_ENV_FALLBACK}."
            ))
            .into());
        }

        if self.maps.api_key.chars().any(char::is_whitespace) {
            return Err(RouteGateError::config(
                "Maps API key must not contain whitespace. Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate upstream and collector URLs
    fn validate_urls(&self) -> Result<()> {
        let urls = [
            ("maps.routes_api_url", Some(&self.maps.routes_api_url)),
            ("maps.maps_api_base_url", Some(&self.maps.maps_api_base_url)),
            ("telemetry.otlp_endpoint", self.telemetry.otlp_endpoint.as_ref()),
        ];

        for (name, url) in urls {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(RouteGateError::config(format!(
                        "{name} must be a valid HTTP or HTTPS URL, got '{url}'"
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RouteGateError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RouteGateError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }

    /// Socket address string the server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
