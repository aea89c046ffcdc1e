//! HTTP send and test-send
//!
//! Both endpoints take JSON and answer with JSON. On failure the body's
//! `message` field, when present, is what the user sees.

use crate::composer::draft::{SendMode, SendRequest, TestSendRequest};
use crate::config::DeliveryConfig;
use crate::delivery::SendService;
use crate::error::{ComposerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const NONCE_HEADER: &str = "X-WP-Nonce";

/// Delivery endpoint client
#[derive(Debug, Clone)]
pub struct HttpSendService {
    client: Client,
    config: DeliveryConfig,
    nonce: Option<String>,
}

impl HttpSendService {
    /// Creates a new client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: DeliveryConfig, nonce: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("campaign-composer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ComposerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            nonce,
        })
    }

    /// Posts `body` and returns the error message on failure
    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        failure: &str,
    ) -> Result<()> {
        let mut builder = self.client.post(url).json(body);
        if let Some(nonce) = &self.nonce {
            builder = builder.header(NONCE_HEADER, nonce);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Delivery request to {} failed: {}", url, e);
            ComposerError::Send(failure.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("Delivery request to {} succeeded: {}", url, status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Delivery endpoint returned {}: {}", status, body);
        Err(ComposerError::Send(failure_message(&body, failure)).into())
    }
}

/// `message` from a JSON error body, or the fallback
fn failure_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl SendService for HttpSendService {
    async fn send(&self, request: &SendRequest) -> Result<String> {
        tracing::info!(
            "Sending email: mode={:?}, recipients={}",
            request.mode,
            request.recipients.len()
        );
        self.post(&self.config.send_endpoint, request, "Failed to send email.")
            .await?;
        Ok(match request.mode {
            SendMode::Schedule => "Email scheduled successfully!".to_string(),
            SendMode::Immediate => "Email sent successfully!".to_string(),
        })
    }

    async fn send_test(&self, request: &TestSendRequest) -> Result<String> {
        tracing::info!("Sending test email to {}", request.to);
        self.post(
            &self.config.test_endpoint,
            request,
            "Failed to send test email.",
        )
        .await?;
        Ok(format!("Test email sent successfully to {}!", request.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_uses_json_message() {
        assert_eq!(
            failure_message(r#"{"code":"x","message":"Invalid recipient"}"#, "Failed"),
            "Invalid recipient"
        );
    }

    #[test]
    fn test_failure_message_falls_back() {
        assert_eq!(failure_message("<html>502</html>", "Failed"), "Failed");
        assert_eq!(failure_message(r#"{"message":""}"#, "Failed"), "Failed");
        assert_eq!(failure_message("", "Failed"), "Failed");
    }
}
