//! HTTP text-generation backend
//!
//! Posts `{message, workflow, enable_tools, context}` to a WordPress-style
//! chat endpoint and hands back the raw response body.

use crate::config::AiConfig;
use crate::error::{ComposerError, Result};
use crate::providers::base::{AiContext, AiRequest, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the request nonce
const NONCE_HEADER: &str = "X-WP-Nonce";

#[derive(Serialize)]
struct ChatPayload<'a> {
    message: &'a str,
    workflow: &'a str,
    enable_tools: bool,
    context: &'a AiContext,
}

/// AI endpoint client
///
/// # Examples
///
/// ```
/// use campaign_composer::config::AiConfig;
/// use campaign_composer::providers::HttpTextGenerator;
///
/// let generator = HttpTextGenerator::new(AiConfig::default());
/// assert!(generator.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpTextGenerator {
    client: Client,
    config: AiConfig,
}

impl HttpTextGenerator {
    /// Creates a new client from configuration
    ///
    /// The client-level timeout is slightly longer than the configured
    /// generation timeout so the composer's own deadline fires first.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds + 5))
            .user_agent(concat!("campaign-composer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ComposerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized AI client: endpoint={}, workflow={}",
            config.endpoint,
            config.workflow
        );

        Ok(Self { client, config })
    }

    /// Configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: &AiRequest) -> Result<Value> {
        let payload = ChatPayload {
            message: &request.message,
            workflow: &self.config.workflow,
            enable_tools: true,
            context: &request.context,
        };

        tracing::debug!(
            "Sending AI request: step={:?}, message_len={}",
            request.context.workflow_step,
            request.message.len()
        );

        let mut builder = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(nonce) = &self.config.nonce {
            builder = builder.header(NONCE_HEADER, nonce);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("AI request failed: {}", e);
            ComposerError::Transport(format!("AI request failed: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read AI response: {}", e);
            ComposerError::Transport(format!("Failed to read AI response: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("AI endpoint returned error {}: {}", status, body);
            return Err(ComposerError::Transport(format!(
                "AI endpoint returned error {}: {}",
                status, body
            ))
            .into());
        }

        tracing::debug!("AI response: status={}, bytes={}", status, body.len());

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_generator_creation() {
        let generator = HttpTextGenerator::new(AiConfig::default()).unwrap();
        assert!(generator.endpoint().ends_with("/wp-json/aipa/v1/chat-gemini"));
    }

    #[test]
    fn test_payload_shape() {
        let context = AiContext::for_step("body_copy", "Write HTML");
        let payload = ChatPayload {
            message: "Generate body",
            workflow: "email_designer",
            enable_tools: true,
            context: &context,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["message"], "Generate body");
        assert_eq!(value["workflow"], "email_designer");
        assert_eq!(value["enable_tools"], true);
        assert_eq!(value["context"]["workflow_step"], "body_copy");
    }
}
