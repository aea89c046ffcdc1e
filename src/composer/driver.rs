//! Async driver that executes session requests
//!
//! [`Composer`] pairs a [`ComposerSession`] with its collaborators. Each
//! request runs under the configured timeout; a timeout clears the session's
//! generating guard and offers a retry.

use crate::composer::action::{Action, GenerationRequest, GenerationResponse, RequestKind};
use crate::composer::event::ComposerEvent;
use crate::composer::session::ComposerSession;
use crate::error::{ComposerError, Result};
use crate::providers::{ImageGenerator, TextGenerator};
use std::time::Duration;

/// A composer session wired to its AI and image collaborators
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use campaign_composer::composer::{Action, CampaignType, AudienceType, Composer, ComposerSession, Draft};
/// use campaign_composer::providers::{AiRequest, TextGenerator};
/// use std::time::Duration;
///
/// struct Silent;
///
/// #[async_trait]
/// impl TextGenerator for Silent {
///     async fn generate(&self, _request: &AiRequest) -> campaign_composer::Result<serde_json::Value> {
///         Ok(serde_json::json!(""))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let session = ComposerSession::new(Draft::default(), Default::default());
/// let mut composer = Composer::new(session, Box::new(Silent), None, Duration::from_secs(5));
/// composer.open();
/// composer.handle(Action::SelectCampaign(CampaignType::Event)).await.unwrap();
/// composer.handle(Action::SelectAudience(AudienceType::New)).await.unwrap();
///
/// // Empty replies fall back to canned subject lines
/// assert_eq!(composer.session().workflow().subject_options.len(), 3);
/// # });
/// ```
pub struct Composer {
    session: ComposerSession,
    text: Box<dyn TextGenerator>,
    images: Option<Box<dyn ImageGenerator>>,
    timeout: Duration,
}

impl Composer {
    /// Creates a composer
    ///
    /// The session's image sub-flow is enabled only when `images` is set.
    ///
    /// # Arguments
    ///
    /// * `session` - Session to drive
    /// * `text` - AI text generator
    /// * `images` - Optional image capability
    /// * `timeout` - Limit for each request
    pub fn new(
        session: ComposerSession,
        text: Box<dyn TextGenerator>,
        images: Option<Box<dyn ImageGenerator>>,
        timeout: Duration,
    ) -> Self {
        let session = session.with_images(images.is_some());
        Self {
            session,
            text,
            images,
            timeout,
        }
    }

    /// The underlying session
    pub fn session(&self) -> &ComposerSession {
        &self.session
    }

    /// Mutable access to the underlying session
    pub fn session_mut(&mut self) -> &mut ComposerSession {
        &mut self.session
    }

    /// Opens the session
    pub fn open(&mut self) -> Vec<ComposerEvent> {
        self.session.open()
    }

    /// Dispatches an action and runs any request it produces
    ///
    /// # Errors
    ///
    /// Returns the session's dispatch error; generation failures are
    /// reported as events, not errors
    pub async fn handle(&mut self, action: Action) -> Result<Vec<ComposerEvent>> {
        let transition = self.session.dispatch(action)?;
        let mut events = transition.events;
        if let Some(request) = transition.request {
            events.extend(self.execute(request).await);
        }
        Ok(events)
    }

    async fn execute(&mut self, request: GenerationRequest) -> Vec<ComposerEvent> {
        tracing::debug!("Executing {:?} request", request.purpose);
        let outcome = match request.kind {
            RequestKind::Text(ai_request) => {
                tokio::time::timeout(self.timeout, self.text.generate_text(&ai_request))
                    .await
                    .map(|result| result.map(GenerationResponse::Text))
            }
            RequestKind::Image { prompt } => match &self.images {
                Some(images) => tokio::time::timeout(self.timeout, images.generate_image(&prompt))
                    .await
                    .map(|result| result.map(GenerationResponse::Image)),
                None => Ok(Err(ComposerError::Config(
                    "Image generation is not configured".to_string(),
                )
                .into())),
            },
        };

        match outcome {
            Ok(Ok(response)) => self.session.complete(response),
            Ok(Err(e)) => self.session.fail(&e),
            Err(_) => {
                let error = anyhow::Error::from(ComposerError::Timeout(self.timeout.as_secs()));
                self.session.fail(&error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::draft::Draft;
    use crate::composer::event::Menu;
    use crate::composer::messages;
    use crate::composer::state::WorkflowStep;
    use crate::composer::types::{AudienceType, CampaignType};
    use crate::providers::{AiRequest, BrandContext, GeneratedImage};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        reply: Value,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _request: &AiRequest) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct Hanging;

    #[async_trait]
    impl TextGenerator for Hanging {
        async fn generate(&self, _request: &AiRequest) -> Result<Value> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!("late"))
        }
    }

    struct FixedImage;

    #[async_trait]
    impl ImageGenerator for FixedImage {
        async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
            Ok(GeneratedImage {
                url: "https://img.test/x.png".to_string(),
                prompt: prompt.to_string(),
                placeholder: false,
            })
        }
    }

    fn composer(reply: Value) -> (Composer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let text = Scripted {
            reply,
            calls: calls.clone(),
        };
        let composer = Composer::new(
            ComposerSession::new(Draft::default(), BrandContext::default()),
            Box::new(text),
            Some(Box::new(FixedImage)),
            Duration::from_secs(5),
        );
        (composer, calls)
    }

    #[tokio::test]
    async fn test_handle_runs_subject_request() {
        let (mut composer, calls) = composer(json!({
            "choices": [{"message": {"content": "{\"subject_lines\": [\"A fresh start\", \"Meet the team\", \"Your first week\"]}"}}]
        }));
        composer.open();
        composer
            .handle(Action::SelectCampaign(CampaignType::Welcome))
            .await
            .unwrap();
        let events = composer
            .handle(Action::SelectAudience(AudienceType::New))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(events.contains(&ComposerEvent::Menu(Menu::SubjectRevisions)));
        assert_eq!(
            composer.session().workflow().option_texts(),
            vec!["A fresh start", "Meet the team", "Your first week"]
        );
        assert!(!composer.session().is_generating());
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let (mut composer, _) = composer(json!({"content": "I'm not sure what you mean."}));
        composer.open();
        composer
            .handle(Action::SelectCampaign(CampaignType::FlashSale))
            .await
            .unwrap();
        composer
            .handle(Action::SelectAudience(AudienceType::Vip))
            .await
            .unwrap();
        assert_eq!(
            composer.session().workflow().option_texts(),
            vec![
                "🎁 Your exclusive discount inside",
                "We've been saving this just for you...",
                "⏰ Last chance: Sale ends tonight"
            ]
        );
        composer.handle(Action::SelectSubject(0)).await.unwrap();
        assert_eq!(composer.session().workflow().step, WorkflowStep::BodyCopy);
    }

    #[tokio::test]
    async fn test_image_request_uses_capability() {
        let (mut composer, _) = composer(json!({"content": "<p>Hi [Name]</p><a href=\"#\">Go</a>"}));
        composer.open();
        composer
            .handle(Action::SelectCampaign(CampaignType::Event))
            .await
            .unwrap();
        composer
            .handle(Action::SelectAudience(AudienceType::Cold))
            .await
            .unwrap();
        composer.handle(Action::SelectSubject(0)).await.unwrap();
        composer
            .handle(Action::Chat("Doors open at 7".to_string()))
            .await
            .unwrap();
        composer.handle(Action::GenerateImage).await.unwrap();
        let events = composer
            .handle(Action::Chat("A lantern-lit garden".to_string()))
            .await
            .unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, ComposerEvent::ImagePreview(image) if image.prompt == "A lantern-lit garden")));
    }

    #[tokio::test]
    async fn test_timeout_resets_guard() {
        let mut composer = Composer::new(
            ComposerSession::new(Draft::default(), BrandContext::default()),
            Box::new(Hanging),
            None,
            Duration::from_millis(50),
        );
        composer.open();
        let events = composer
            .handle(Action::Chat("hello".to_string()))
            .await
            .unwrap();
        assert!(events.contains(&ComposerEvent::assistant(messages::TIMED_OUT)));
        assert!(events.contains(&ComposerEvent::RetryAvailable));
        assert!(!composer.session().is_generating());
        assert!(composer.session().can_retry());
    }

    #[tokio::test]
    async fn test_retry_after_timeout_resends_request() {
        let mut composer = Composer::new(
            ComposerSession::new(Draft::default(), BrandContext::default()),
            Box::new(Hanging),
            None,
            Duration::from_millis(20),
        );
        composer.open();
        composer
            .handle(Action::Chat("hello".to_string()))
            .await
            .unwrap();
        let events = composer.handle(Action::Retry).await.unwrap();
        assert!(events.contains(&ComposerEvent::assistant(messages::TIMED_OUT)));
        assert!(composer.session().can_retry());
    }
}
