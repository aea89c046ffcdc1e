//! Configuration management for the campaign composer
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ComposerError, Result};
use crate::template::is_hex_color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Holds the AI endpoint settings, brand defaults used in prompts,
/// delivery endpoints, the image capability and the store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// AI text-generation endpoint configuration
    #[serde(default)]
    pub ai: AiConfig,
    /// Brand details sent as prompt context
    #[serde(default)]
    pub brand: BrandConfig,
    /// Send, schedule and test-send endpoints
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Image generation capability
    #[serde(default)]
    pub images: ImageConfig,
    /// Template/theme/draft store
    #[serde(default)]
    pub storage: StorageConfig,
}

/// AI endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Chat endpoint URL accepting `{message, context}`
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// Value sent in the `X-WP-Nonce` header, when the backend wants one
    #[serde(default)]
    pub nonce: Option<String>,

    /// Workflow name sent alongside every request
    #[serde(default = "default_workflow")]
    pub workflow: String,

    /// Seconds to wait for a generation before releasing the busy guard
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_ai_endpoint() -> String {
    "http://localhost:8080/wp-json/aipa/v1/chat-gemini".to_string()
}

fn default_workflow() -> String {
    "email_designer".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            nonce: None,
            workflow: default_workflow(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Brand configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    /// Site or company name
    #[serde(default)]
    pub site_name: String,

    /// Logo URL
    #[serde(default)]
    pub logo_url: String,

    /// Primary brand color (hex)
    #[serde(default = "default_primary_color")]
    pub primary_color: String,

    /// Secondary brand color (hex)
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
}

fn default_primary_color() -> String {
    "#6366f1".to_string()
}

fn default_secondary_color() -> String {
    "#22d3ee".to_string()
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            logo_url: String::new(),
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
        }
    }
}

/// Delivery endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Send/schedule endpoint
    #[serde(default = "default_send_endpoint")]
    pub send_endpoint: String,

    /// Test-send endpoint
    #[serde(default = "default_test_endpoint")]
    pub test_endpoint: String,

    /// Request timeout for delivery calls
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_send_endpoint() -> String {
    "http://localhost:8080/wp-json/gdc/v1/send-email".to_string()
}

fn default_test_endpoint() -> String {
    "http://localhost:8080/wp-json/gdc/v1/send-test-email".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_endpoint: default_send_endpoint(),
            test_endpoint: default_test_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Which image capability backs the `image_generation` step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageBackend {
    /// Seeded placeholder images from a public random-image service
    #[default]
    Placeholder,
    /// Image generation disabled; only upload and skip are offered
    Disabled,
}

/// Image capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: ImageBackend,

    /// Base URL for placeholder images
    #[serde(default = "default_placeholder_base")]
    pub placeholder_base: String,
}

fn default_placeholder_base() -> String {
    "https://picsum.photos/600/300".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            backend: ImageBackend::default(),
            placeholder_base: default_placeholder_base(),
        }
    }
}

/// Store location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; the user data directory is used when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ComposerError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ComposerError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("COMPOSER_AI_ENDPOINT") {
            self.ai.endpoint = endpoint;
        }

        if let Ok(nonce) = std::env::var("COMPOSER_AI_NONCE") {
            self.ai.nonce = Some(nonce);
        }

        if let Ok(timeout) = std::env::var("COMPOSER_AI_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.ai.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid COMPOSER_AI_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(endpoint) = std::env::var("COMPOSER_SEND_ENDPOINT") {
            self.delivery.send_endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("COMPOSER_TEST_ENDPOINT") {
            self.delivery.test_endpoint = endpoint;
        }

        if let Ok(db_path) = std::env::var("COMPOSER_DB") {
            self.storage.db_path = Some(PathBuf::from(db_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(db_path) = &cli.db {
            self.storage.db_path = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is not a valid URL, a timeout is out of
    /// range, or a brand color is not a hex color
    pub fn validate(&self) -> Result<()> {
        validate_url("ai.endpoint", &self.ai.endpoint)?;
        validate_url("delivery.send_endpoint", &self.delivery.send_endpoint)?;
        validate_url("delivery.test_endpoint", &self.delivery.test_endpoint)?;

        if self.ai.workflow.trim().is_empty() {
            return Err(ComposerError::Config("ai.workflow cannot be empty".to_string()).into());
        }

        for (name, value) in [
            ("ai.timeout_seconds", self.ai.timeout_seconds),
            ("delivery.timeout_seconds", self.delivery.timeout_seconds),
        ] {
            if value == 0 || value > 600 {
                return Err(ComposerError::Config(format!(
                    "{} must be between 1 and 600, got {}",
                    name, value
                ))
                .into());
            }
        }

        for (name, value) in [
            ("brand.primary_color", &self.brand.primary_color),
            ("brand.secondary_color", &self.brand.secondary_color),
        ] {
            if !is_hex_color(value) {
                return Err(ComposerError::Config(format!(
                    "{} must be a hex color like #6366f1, got {}",
                    name, value
                ))
                .into());
            }
        }

        if self.images.backend == ImageBackend::Placeholder {
            validate_url("images.placeholder_base", &self.images.placeholder_base)?;
        }

        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ComposerError::Config(format!("{} cannot be empty", name)).into());
    }
    url::Url::parse(value)
        .map_err(|e| ComposerError::Config(format!("{} is not a valid URL: {}", name, e)))?;
    Ok(())
}
