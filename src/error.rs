//! Error types for the campaign composer
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for composer operations
///
/// Covers configuration loading, AI endpoint calls, workflow transitions,
/// draft validation, template storage, and delivery collaborators.
#[derive(Error, Debug)]
pub enum ComposerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP failure talking to the AI endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// The AI endpoint answered but no text could be extracted
    #[error("AI endpoint returned no usable content")]
    EmptyResponse,

    /// Draft failed validation before any network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Action is not valid for the current workflow step
    #[error("Invalid transition: {action} is not available during {step}")]
    InvalidTransition {
        /// The attempted action
        action: String,
        /// The workflow step the session was in
        step: String,
    },

    /// Generation did not complete within the configured timeout
    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    /// Template/theme/draft storage errors
    #[error("Storage error: {0}")]
    Store(String),

    /// Send or schedule request rejected by the delivery service
    #[error("Send failed: {0}")]
    Send(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for composer operations
///
/// Uses `anyhow::Error` so call sites can attach context while still
/// downcasting to [`ComposerError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;
