//! Delivery collaborators
//!
//! Sending, scheduling and test-sending go through a [`SendService`];
//! finished drafts are handed to a [`DraftSink`].

pub mod http;

pub use http::HttpSendService;

use crate::composer::draft::{SavedDraft, SendRequest, TestSendRequest};
use crate::config::{AiConfig, DeliveryConfig};
use crate::error::Result;
use async_trait::async_trait;

/// Sends or schedules finished emails
#[async_trait]
pub trait SendService: Send + Sync {
    /// Sends now or schedules, depending on the request mode
    ///
    /// Returns the confirmation shown to the user.
    async fn send(&self, request: &SendRequest) -> Result<String>;

    /// Sends a single test message
    async fn send_test(&self, request: &TestSendRequest) -> Result<String>;
}

/// Receives drafts saved from the composer
pub trait DraftSink {
    /// Stores the draft and returns its id
    fn save_draft(&self, draft: &SavedDraft) -> Result<String>;
}

/// Create the send service for the configured endpoints
///
/// The AI nonce is reused for delivery calls.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_send_service(
    delivery: &DeliveryConfig,
    ai: &AiConfig,
) -> Result<Box<dyn SendService>> {
    Ok(Box::new(HttpSendService::new(
        delivery.clone(),
        ai.nonce.clone(),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_send_service() {
        assert!(create_send_service(&DeliveryConfig::default(), &AiConfig::default()).is_ok());
    }
}
