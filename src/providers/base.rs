//! Base text-generation trait and wire types
//!
//! This module defines the [`TextGenerator`] trait that every AI backend
//! implements, the request/context shapes posted to the chat endpoint, and
//! the response text extraction shared by all backends.

use crate::error::{ComposerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request sent to the AI text-generation endpoint
///
/// Serializes to `{message, context}`; the HTTP backend adds the workflow
/// name and tool flag alongside these fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    /// The user-facing instruction for this generation
    pub message: String,
    /// Structured workflow/campaign metadata
    pub context: AiContext,
}

impl AiRequest {
    /// Creates a new request
    ///
    /// # Arguments
    ///
    /// * `message` - The instruction text
    /// * `context` - Structured context for the endpoint
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::providers::{AiContext, AiRequest};
    ///
    /// let request = AiRequest::new("Generate 3 subject lines", AiContext::default());
    /// assert_eq!(request.message, "Generate 3 subject lines");
    /// assert!(request.context.email_context);
    /// ```
    pub fn new(message: impl Into<String>, context: AiContext) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }

    /// Returns the system instruction override, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.context.system_prompt_override.as_deref()
    }
}

/// Context object carried alongside every AI request
///
/// Only populated fields are serialized, so each workflow step sends the
/// minimal context it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiContext {
    /// Always true; marks the request as coming from the email composer
    pub email_context: bool,

    /// True for guided workflow steps, false for free chat
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub campaign_architect_mode: bool,

    /// Workflow step name, e.g. `subject_lines`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_step: Option<String>,

    /// Campaign type key, e.g. `flash_sale`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,

    /// Audience key, e.g. `vip`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_type: Option<String>,

    /// Revision modifier key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,

    /// Previously generated candidates the endpoint must not repeat
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_options: Vec<String>,

    /// Free-text talking points for body copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<String>,

    /// Theme key for restyling requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Quick action key for one-shot generations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_action: Option<String>,

    /// Role-specific system instruction replacing the endpoint default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Detected intent of a free-chat message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<String>,

    /// Conversation phase at the time of a free-chat message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_phase: Option<String>,

    /// Email section, e.g. `store`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,

    /// Draft label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_label: Option<String>,

    /// Subject currently in the draft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_subject: Option<String>,

    /// Body currently in the draft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_body: Option<String>,

    /// Which draft fields already hold content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_draft: Option<DraftFlags>,

    /// Brand details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<BrandContext>,
}

impl Default for AiContext {
    fn default() -> Self {
        Self {
            email_context: true,
            campaign_architect_mode: false,
            workflow_step: None,
            campaign_type: None,
            audience_type: None,
            modifier: None,
            previous_options: Vec::new(),
            key_points: None,
            theme: None,
            quick_action: None,
            system_prompt_override: None,
            user_intent: None,
            conversation_phase: None,
            email_type: None,
            email_label: None,
            current_subject: None,
            current_body: None,
            has_draft: None,
            brand: None,
        }
    }
}

impl AiContext {
    /// Context for a guided workflow step
    ///
    /// # Arguments
    ///
    /// * `step` - Workflow step name
    /// * `system_prompt` - Role-specific system instruction
    pub fn for_step(step: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            campaign_architect_mode: true,
            workflow_step: Some(step.into()),
            system_prompt_override: Some(system_prompt.into()),
            ..Self::default()
        }
    }
}

/// Presence flags for draft fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftFlags {
    /// Subject present
    pub subject: bool,
    /// Plain body present
    pub body: bool,
    /// Styled HTML present
    pub html: bool,
}

/// Brand details sent with free-chat requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandContext {
    /// Site or company name
    pub site_name: String,
    /// Logo URL
    pub logo_url: String,
    /// Primary brand color
    pub primary_color: String,
    /// Secondary brand color
    pub secondary_color: String,
}

impl From<&crate::config::BrandConfig> for BrandContext {
    fn from(config: &crate::config::BrandConfig) -> Self {
        Self {
            site_name: config.site_name.clone(),
            logo_url: config.logo_url.clone(),
            primary_color: config.primary_color.clone(),
            secondary_color: config.secondary_color.clone(),
        }
    }
}

/// AI text-generation backend
///
/// Implementors post a request to some endpoint and return the raw,
/// provider-shaped response. Text extraction is shared.
///
/// # Examples
///
/// ```no_run
/// use campaign_composer::providers::{AiRequest, TextGenerator};
/// use campaign_composer::error::Result;
/// use async_trait::async_trait;
///
/// struct Canned;
///
/// #[async_trait]
/// impl TextGenerator for Canned {
///     async fn generate(&self, _request: &AiRequest) -> Result<serde_json::Value> {
///         Ok(serde_json::json!({"content": "Hello"}))
///     }
/// }
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends a request and returns the raw response body
    ///
    /// Non-JSON bodies are returned as `Value::String`.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Transport` on network or HTTP failure
    async fn generate(&self, request: &AiRequest) -> Result<Value>;

    /// Sends a request and extracts the generated text
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Transport` on failure and
    /// `ComposerError::EmptyResponse` when no text can be extracted
    async fn generate_text(&self, request: &AiRequest) -> Result<String> {
        let value = self.generate(request).await?;
        extract_text(&value).ok_or_else(|| ComposerError::EmptyResponse.into())
    }
}

/// Extracts generated text from a provider-shaped response
///
/// Checks, in order: `choices[0].message.content`,
/// `candidates[0].content.parts[0].text`, a flat `content` field, and a raw
/// string body. Empty strings count as absent.
///
/// # Examples
///
/// ```
/// use campaign_composer::providers::extract_text;
/// use serde_json::json;
///
/// let value = json!({"choices": [{"message": {"content": "Hi"}}]});
/// assert_eq!(extract_text(&value), Some("Hi".to_string()));
/// assert_eq!(extract_text(&json!({})), None);
/// ```
pub fn extract_text(value: &Value) -> Option<String> {
    let candidates = [
        value.pointer("/choices/0/message/content"),
        value.pointer("/candidates/0/content/parts/0/text"),
        value.get("content"),
        Some(value),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|text| !text.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_chat_completion_shape() {
        let value = json!({"choices": [{"message": {"role": "assistant", "content": "Hello"}}]});
        assert_eq!(extract_text(&value), Some("Hello".to_string()));
    }

    #[test]
    fn test_extract_text_gemini_shape() {
        let value = json!({"candidates": [{"content": {"parts": [{"text": "From Gemini"}]}}]});
        assert_eq!(extract_text(&value), Some("From Gemini".to_string()));
    }

    #[test]
    fn test_extract_text_flat_content() {
        let value = json!({"content": "Flat", "success": true});
        assert_eq!(extract_text(&value), Some("Flat".to_string()));
    }

    #[test]
    fn test_extract_text_raw_string() {
        let value = Value::String("Raw body".to_string());
        assert_eq!(extract_text(&value), Some("Raw body".to_string()));
    }

    #[test]
    fn test_extract_text_order_prefers_choices() {
        let value = json!({
            "choices": [{"message": {"content": "first"}}],
            "candidates": [{"content": {"parts": [{"text": "second"}]}}],
            "content": "third"
        });
        assert_eq!(extract_text(&value), Some("first".to_string()));
    }

    #[test]
    fn test_extract_text_skips_empty_choice() {
        let value = json!({"choices": [{"message": {"content": ""}}], "content": "fallback"});
        assert_eq!(extract_text(&value), Some("fallback".to_string()));
    }

    #[test]
    fn test_extract_text_unsupported_shapes() {
        assert_eq!(extract_text(&json!({"message": "nope"})), None);
        assert_eq!(extract_text(&json!({"content": 42})), None);
        assert_eq!(extract_text(&json!(null)), None);
        assert_eq!(extract_text(&Value::String("   ".to_string())), None);
    }

    #[test]
    fn test_context_serializes_only_populated_fields() {
        let mut context = AiContext::for_step("subject_lines", "Be brief");
        context.campaign_type = Some("flash_sale".to_string());
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["email_context"], json!(true));
        assert_eq!(value["campaign_architect_mode"], json!(true));
        assert_eq!(value["workflow_step"], json!("subject_lines"));
        assert_eq!(value["system_prompt_override"], json!("Be brief"));
        assert!(value.get("audience_type").is_none());
        assert!(value.get("previous_options").is_none());
    }

    #[test]
    fn test_default_context_omits_architect_flag() {
        let value = serde_json::to_value(AiContext::default()).unwrap();
        assert_eq!(value, json!({"email_context": true}));
    }

    #[test]
    fn test_request_system_prompt() {
        let request = AiRequest::new("go", AiContext::for_step("body_copy", "Write HTML"));
        assert_eq!(request.system_prompt(), Some("Write HTML"));
        assert_eq!(AiRequest::default().system_prompt(), None);
    }

    struct Fixed(Value);

    #[async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _request: &AiRequest) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_generate_text_extracts() {
        let generator = Fixed(json!({"content": "done"}));
        let text = generator.generate_text(&AiRequest::default()).await.unwrap();
        assert_eq!(text, "done");
    }

    #[tokio::test]
    async fn test_generate_text_empty_is_error() {
        let generator = Fixed(json!({"unexpected": true}));
        let err = generator
            .generate_text(&AiRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComposerError>(),
            Some(ComposerError::EmptyResponse)
        ));
    }
}
