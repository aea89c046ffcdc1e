//! The composer session state machine
//!
//! [`ComposerSession`] owns the conversation, workflow and draft for one
//! composer instance. [`ComposerSession::dispatch`] applies a user action
//! and may hand back a [`GenerationRequest`]; the caller executes it and
//! reports the outcome through [`ComposerSession::complete`],
//! [`ComposerSession::fail`] or [`ComposerSession::timeout`]. Every handler
//! returns [`ComposerEvent`]s for a separate render step.
//!
//! Only one request may be outstanding. While one is, dispatched actions are
//! ignored without touching state.

use crate::composer::action::{Action, GenerationRequest, GenerationResponse, Purpose};
use crate::composer::draft::Draft;
use crate::composer::event::{ComposerEvent, Field, Menu, Offer};
use crate::composer::extract::{self, BlockPosition, EmailAction, MarkdownImage};
use crate::composer::fallback;
use crate::composer::intent::{IntentClassifier, KeywordClassifier};
use crate::composer::messages;
use crate::composer::state::{ConversationState, Phase, Role, WorkflowState, WorkflowStep};
use crate::composer::types::{
    AudienceType, CampaignType, Intent, Modifier, QuickAction, ThemeStyle,
};
use crate::error::{ComposerError, Result};
use crate::prompts;
use crate::providers::{AiContext, AiRequest, BrandContext, DraftFlags, GeneratedImage};

/// Outcome of dispatching an action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Events to render
    pub events: Vec<ComposerEvent>,
    /// Request the caller must execute, if any
    pub request: Option<GenerationRequest>,
}

impl Transition {
    fn events(events: Vec<ComposerEvent>) -> Self {
        Self {
            events,
            request: None,
        }
    }

    /// True when the action changed nothing
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.request.is_none()
    }
}

/// One composer instance
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{Action, CampaignType, ComposerSession, Draft, WorkflowStep};
/// use campaign_composer::providers::BrandContext;
///
/// let mut session = ComposerSession::new(Draft::default(), BrandContext::default());
/// session.open();
/// let transition = session.dispatch(Action::SelectCampaign(CampaignType::Newsletter)).unwrap();
/// assert!(transition.request.is_none());
/// assert_eq!(session.workflow().step, WorkflowStep::Audience);
/// ```
pub struct ComposerSession {
    conversation: ConversationState,
    workflow: WorkflowState,
    draft: Draft,
    brand: BrandContext,
    classifier: Box<dyn IntentClassifier>,
    images_enabled: bool,
    in_flight: Option<GenerationRequest>,
    last_failed: Option<GenerationRequest>,
}

impl ComposerSession {
    /// Creates a session editing `draft`
    pub fn new(draft: Draft, brand: BrandContext) -> Self {
        Self {
            conversation: ConversationState::new(),
            workflow: WorkflowState::new(),
            draft,
            brand,
            classifier: Box::new(KeywordClassifier::new()),
            images_enabled: true,
            in_flight: None,
            last_failed: None,
        }
    }

    /// Replaces the intent classifier
    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Enables or disables the image generation sub-flow
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Conversation state
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Workflow state
    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    /// The draft being edited
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Mutable draft, for direct user edits
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// True while a request is outstanding
    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when a failed request can be re-sent
    pub fn can_retry(&self) -> bool {
        self.last_failed.is_some()
    }

    /// Greets the user and offers the campaign types
    pub fn open(&mut self) -> Vec<ComposerEvent> {
        tracing::info!(
            "Opening composer for {} section ({})",
            self.draft.section,
            self.draft.label
        );
        let greeting = messages::greeting(&self.draft);
        vec![
            self.assistant(greeting),
            self.assistant(messages::campaign_question()),
            ComposerEvent::Menu(Menu::CampaignTypes),
        ]
    }

    /// Applies a user action
    ///
    /// Returns an empty transition while a request is outstanding.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::InvalidTransition` if the action is not
    /// available at the current step, and `ComposerError::Validation` for
    /// empty input or an unknown option index
    pub fn dispatch(&mut self, action: Action) -> Result<Transition> {
        if self.in_flight.is_some() {
            tracing::debug!("Ignoring {} while a request is in flight", action);
            return Ok(Transition::default());
        }
        tracing::debug!("Dispatching {} at step {}", action, self.workflow.step);

        match action {
            Action::SelectCampaign(campaign) => self.select_campaign(campaign),
            Action::SelectAudience(audience) => self.select_audience(audience),
            Action::SelectSubject(index) => self.select_subject(index),
            Action::CustomSubject(text) => self.custom_subject(&text),
            Action::ReviseSubjects(modifier) => self.revise_subjects(modifier),
            Action::Chat(text) => self.chat(&text),
            Action::GenerateImage => self.start_image_generation(),
            Action::UploadImage(url) => self.upload_image(&url),
            Action::SkipVisuals => self.skip_visuals(),
            Action::UseImage => self.use_image(),
            Action::RetryImage => self.retry_image(),
            Action::ApplyTheme(theme) => self.apply_theme(theme),
            Action::Quick(quick) => self.quick_action(quick),
            Action::ApplySubjectCandidate(index) => self.apply_subject_candidate(index),
            Action::ApplyBody => self.apply_body(),
            Action::ApplyHtml => self.apply_html(),
            Action::InsertImage(image) => self.insert_image(&image),
            Action::Retry => self.retry(),
        }
    }

    /// Delivers the result of the outstanding request
    ///
    /// A response with no outstanding request is dropped.
    pub fn complete(&mut self, response: GenerationResponse) -> Vec<ComposerEvent> {
        let Some(request) = self.in_flight.take() else {
            tracing::warn!("Dropping response with no request in flight");
            return Vec::new();
        };

        match (request.purpose, response) {
            (Purpose::Image, GenerationResponse::Image(image)) => self.finish_image(image),
            (Purpose::Image, GenerationResponse::Text(_)) => {
                tracing::warn!("Image request answered with text");
                self.record_failure(request, messages::IMAGE_FAILED)
            }
            (_, GenerationResponse::Image(_)) => {
                tracing::warn!("Text request answered with an image");
                let apology = apology_for(request.purpose);
                self.record_failure(request, apology)
            }
            (_, GenerationResponse::Text(text)) => self.finish_text(request, &text),
        }
    }

    /// Reports that the outstanding request failed
    ///
    /// An empty reply to a guided step is treated as unparseable output and
    /// answered with fallback content. Any other failure leaves the state
    /// unchanged and makes the request available to [`Action::Retry`].
    pub fn fail(&mut self, error: &anyhow::Error) -> Vec<ComposerEvent> {
        let Some(request) = self.in_flight.take() else {
            tracing::warn!("Dropping failure with no request in flight: {:#}", error);
            return Vec::new();
        };

        if matches!(
            error.downcast_ref::<ComposerError>(),
            Some(ComposerError::EmptyResponse)
        ) {
            match request.purpose {
                Purpose::Subjects | Purpose::Revision(_) | Purpose::Body => {
                    tracing::warn!("Empty reply for {:?}, using fallback content", request.purpose);
                    return self.finish_text(request, "");
                }
                Purpose::Chat(_) => {
                    return self.record_failure(request, messages::EMPTY_RESPONSE);
                }
                Purpose::Image | Purpose::Theme(_) => {}
            }
        }

        if let Some(ComposerError::Timeout(seconds)) = error.downcast_ref::<ComposerError>() {
            tracing::warn!("Generation for {:?} timed out after {}s", request.purpose, seconds);
            return self.record_failure(request, messages::TIMED_OUT);
        }

        tracing::warn!("Generation for {:?} failed: {:#}", request.purpose, error);
        let apology = apology_for(request.purpose);
        self.record_failure(request, apology)
    }

    /// Reports that the outstanding request timed out
    pub fn timeout(&mut self) -> Vec<ComposerEvent> {
        let Some(request) = self.in_flight.take() else {
            return Vec::new();
        };
        tracing::warn!("Generation for {:?} timed out", request.purpose);
        self.record_failure(request, messages::TIMED_OUT)
    }

    fn assistant(&mut self, text: impl Into<String>) -> ComposerEvent {
        let text = text.into();
        self.conversation.push_message(Role::Assistant, text.clone());
        ComposerEvent::assistant(text)
    }

    fn user(&mut self, text: impl Into<String>) -> ComposerEvent {
        let text = text.into();
        self.conversation.push_message(Role::User, text.clone());
        ComposerEvent::user(text)
    }

    fn issue(&mut self, mut events: Vec<ComposerEvent>, request: GenerationRequest) -> Transition {
        events.push(ComposerEvent::Generating(placeholder_for(request.purpose)));
        self.in_flight = Some(request.clone());
        self.last_failed = None;
        Transition {
            events,
            request: Some(request),
        }
    }

    fn record_failure(&mut self, request: GenerationRequest, apology: &str) -> Vec<ComposerEvent> {
        self.last_failed = Some(request);
        vec![self.assistant(apology), ComposerEvent::RetryAvailable]
    }

    fn expect_step(&self, action: &str, allowed: &[WorkflowStep]) -> Result<()> {
        if allowed.contains(&self.workflow.step) {
            Ok(())
        } else {
            Err(ComposerError::InvalidTransition {
                action: action.to_string(),
                step: self.workflow.step.to_string(),
            }
            .into())
        }
    }

    fn campaign(&self) -> CampaignType {
        self.workflow.campaign_type.unwrap_or(CampaignType::Other)
    }

    fn audience(&self) -> AudienceType {
        self.workflow.audience_type.unwrap_or(AudienceType::Subscribers)
    }

    // Guided workflow

    fn select_campaign(&mut self, campaign: CampaignType) -> Result<Transition> {
        self.expect_step("select_campaign", &[WorkflowStep::Strategy])?;
        self.workflow.campaign_type = Some(campaign);
        self.workflow.advance_to(WorkflowStep::Audience);
        tracing::info!("Campaign type: {}", campaign);

        let events = vec![
            self.user(campaign.label()),
            self.assistant(messages::audience_question(campaign)),
            ComposerEvent::Menu(Menu::Audiences),
        ];
        Ok(Transition::events(events))
    }

    fn select_audience(&mut self, audience: AudienceType) -> Result<Transition> {
        self.expect_step("select_audience", &[WorkflowStep::Audience])?;
        self.workflow.audience_type = Some(audience);
        self.workflow.advance_to(WorkflowStep::SubjectLines);
        self.conversation.advance_to(Phase::Subject);
        tracing::info!("Audience: {}", audience);

        let campaign = self.campaign();
        let mut context = AiContext::for_step(
            WorkflowStep::SubjectLines.key(),
            prompts::generate_subject_prompt(campaign, audience),
        );
        context.campaign_type = Some(campaign.key().to_string());
        context.audience_type = Some(audience.key().to_string());

        let request = GenerationRequest::text(
            Purpose::Subjects,
            AiRequest::new(prompts::subject_request_message(campaign, audience), context),
        );
        let events = vec![self.user(audience.label())];
        Ok(self.issue(events, request))
    }

    fn revise_subjects(&mut self, modifier: Modifier) -> Result<Transition> {
        self.expect_step("revise_subjects", &[WorkflowStep::SubjectLines])?;
        let campaign = self.campaign();
        let audience = self.audience();
        tracing::info!("Revising subject lines: {}", modifier.key());

        let mut context = AiContext::for_step(
            WorkflowStep::SubjectLines.key(),
            prompts::generate_revision_prompt(
                &self.workflow.previous_subjects,
                modifier,
                campaign,
                audience,
            ),
        );
        context.campaign_type = Some(campaign.key().to_string());
        context.audience_type = Some(audience.key().to_string());
        context.modifier = Some(modifier.key().to_string());
        context.previous_options = self.workflow.previous_subjects.clone();

        let request = GenerationRequest::text(
            Purpose::Revision(modifier),
            AiRequest::new(prompts::revision_request_message(modifier), context),
        );
        let events = vec![self.user(modifier.label())];
        Ok(self.issue(events, request))
    }

    fn select_subject(&mut self, index: usize) -> Result<Transition> {
        self.expect_step("select_subject", &[WorkflowStep::SubjectLines])?;
        let text = self
            .workflow
            .subject_options
            .get(index)
            .map(|option| option.text.clone())
            .ok_or_else(|| {
                ComposerError::Validation(format!("No subject option {}", index + 1))
            })?;

        let mut events = vec![self.user(format!("Selected: \"{}\"", text))];
        events.extend(self.lock_subject(text, messages::subject_locked()));
        Ok(Transition::events(events))
    }

    fn custom_subject(&mut self, text: &str) -> Result<Transition> {
        self.expect_step("custom_subject", &[WorkflowStep::SubjectLines])?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ComposerError::Validation("Subject line is empty".to_string()).into());
        }

        let mut events = vec![self.user(format!("Custom: \"{}\"", text))];
        events.extend(self.lock_subject(text.to_string(), messages::custom_subject_accepted()));
        Ok(Transition::events(events))
    }

    fn lock_subject(&mut self, text: String, reply: &str) -> Vec<ComposerEvent> {
        tracing::info!("Subject locked: {}", text);
        self.workflow.selected_subject = Some(text.clone());
        self.draft.subject = text;
        self.workflow.advance_to(WorkflowStep::BodyCopy);
        self.conversation.advance_to(Phase::Body);
        vec![
            ComposerEvent::FieldUpdated(Field::Subject),
            self.assistant(reply),
        ]
    }

    fn chat(&mut self, text: &str) -> Result<Transition> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ComposerError::Validation("Message is empty".to_string()).into());
        }
        match self.workflow.step {
            WorkflowStep::BodyCopy => self.request_body(text),
            WorkflowStep::ImageGeneration => self.request_image(text),
            _ => self.free_chat(text, None),
        }
    }

    fn request_body(&mut self, key_points: &str) -> Result<Transition> {
        self.workflow.key_points = Some(key_points.to_string());
        let campaign = self.workflow.campaign_type;
        let audience = self.workflow.audience_type;

        let mut context = AiContext::for_step(
            WorkflowStep::BodyCopy.key(),
            prompts::generate_body_prompt(
                campaign,
                audience,
                self.workflow.selected_subject.as_deref(),
                key_points,
            ),
        );
        context.campaign_type = campaign.map(|c| c.key().to_string());
        context.audience_type = audience.map(|a| a.key().to_string());
        context.key_points = Some(key_points.to_string());

        let request = GenerationRequest::text(
            Purpose::Body,
            AiRequest::new(prompts::body_request_message(key_points), context),
        );
        let events = vec![self.user(key_points)];
        Ok(self.issue(events, request))
    }

    fn start_image_generation(&mut self) -> Result<Transition> {
        self.expect_step("generate_image", &[WorkflowStep::VisualAssets])?;
        let user = self.user("Generate an image");
        if !self.images_enabled {
            return Ok(Transition::events(vec![
                user,
                self.assistant(messages::IMAGES_DISABLED),
                ComposerEvent::Menu(Menu::VisualAssets),
            ]));
        }
        self.workflow.advance_to(WorkflowStep::ImageGeneration);
        Ok(Transition::events(vec![
            user,
            self.assistant(messages::image_prompt_request()),
        ]))
    }

    fn request_image(&mut self, text: &str) -> Result<Transition> {
        let user = self.user(text);
        if !self.images_enabled {
            return Ok(Transition::events(vec![
                user,
                self.assistant(messages::IMAGES_DISABLED),
            ]));
        }

        let prompt = if text.eq_ignore_ascii_case("suggest") {
            let subject = self
                .workflow
                .selected_subject
                .clone()
                .or_else(|| Some(self.draft.subject.clone()));
            messages::suggested_image_prompt(subject.as_deref(), self.workflow.campaign_type)
        } else {
            text.to_string()
        };
        tracing::debug!("Image prompt: {}", prompt);
        Ok(self.issue(vec![user], GenerationRequest::image(prompt)))
    }

    fn finish_image(&mut self, image: GeneratedImage) -> Vec<ComposerEvent> {
        let text = messages::image_concept(&image.prompt, image.placeholder);
        self.workflow.pending_image = Some(image.clone());
        vec![
            self.assistant(text),
            ComposerEvent::ImagePreview(image),
            ComposerEvent::Menu(Menu::ImageReview),
        ]
    }

    fn use_image(&mut self) -> Result<Transition> {
        self.expect_step("use_image", &[WorkflowStep::ImageGeneration])?;
        let image = self.workflow.pending_image.take().ok_or_else(|| {
            ComposerError::Validation("No generated image to use".to_string())
        })?;

        self.draft.html = format!(
            "<img src=\"{}\" alt=\"Email Image\" style=\"max-width: 100%; height: auto; display: block; margin: 20px auto;\"><br>{}",
            attribute_url(&image.url),
            self.draft.html
        );
        let mut events = vec![
            self.user("Use this image"),
            ComposerEvent::FieldUpdated(Field::Body),
        ];
        events.extend(self.final_review());
        Ok(Transition::events(events))
    }

    fn retry_image(&mut self) -> Result<Transition> {
        self.expect_step("retry_image", &[WorkflowStep::ImageGeneration])?;
        let prompt = self
            .workflow
            .pending_image
            .as_ref()
            .map(|image| image.prompt.clone())
            .ok_or_else(|| ComposerError::Validation("No image to retry".to_string()))?;
        let events = vec![self.user("Try again")];
        Ok(self.issue(events, GenerationRequest::image(prompt)))
    }

    fn upload_image(&mut self, url: &str) -> Result<Transition> {
        self.expect_step(
            "upload_image",
            &[WorkflowStep::VisualAssets, WorkflowStep::ImageGeneration],
        )?;
        let url = url.trim();
        if url.is_empty() {
            return Err(ComposerError::Validation("Image URL is empty".to_string()).into());
        }

        self.workflow.pending_image = None;
        self.draft.html = format!(
            "<img src=\"{}\" alt=\"\" style=\"max-width: 100%; height: auto;\">{}",
            attribute_url(url),
            self.draft.html
        );
        let mut events = vec![
            self.user("Upload an image"),
            ComposerEvent::FieldUpdated(Field::Body),
        ];
        events.extend(self.final_review());
        Ok(Transition::events(events))
    }

    fn skip_visuals(&mut self) -> Result<Transition> {
        self.expect_step(
            "skip_visuals",
            &[WorkflowStep::VisualAssets, WorkflowStep::ImageGeneration],
        )?;
        self.workflow.pending_image = None;
        let mut events = vec![self.user("Skip visuals")];
        events.extend(self.final_review());
        Ok(Transition::events(events))
    }

    fn final_review(&mut self) -> Vec<ComposerEvent> {
        self.workflow.advance_to(WorkflowStep::ThemeSend);
        self.conversation.advance_to(Phase::Styling);
        vec![
            self.assistant(messages::final_review()),
            ComposerEvent::Menu(Menu::Themes),
        ]
    }

    fn apply_theme(&mut self, theme: ThemeStyle) -> Result<Transition> {
        if self.draft.html.trim().is_empty() {
            return Err(ComposerError::Validation(
                "Add body content before applying a theme".to_string(),
            )
            .into());
        }

        let mut context = AiContext::for_step(
            WorkflowStep::ThemeSend.key(),
            prompts::generate_theme_prompt(theme, &self.draft.html),
        );
        context.theme = Some(theme.key().to_string());

        let request = GenerationRequest::text(
            Purpose::Theme(theme),
            AiRequest::new(prompts::theme_request_message(theme), context),
        );
        let events = vec![self.user(theme.label())];
        Ok(self.issue(events, request))
    }

    // Free chat

    fn quick_action(&mut self, action: QuickAction) -> Result<Transition> {
        let message = prompts::quick_action_message(
            action,
            self.draft.section,
            &self.draft.subject,
            &self.brand,
        );
        self.free_chat(&message, Some(action))
    }

    fn free_chat(&mut self, text: &str, quick: Option<QuickAction>) -> Result<Transition> {
        let intent = match quick {
            Some(QuickAction::GenerateCopy) => Intent::Body,
            Some(QuickAction::GenerateHtml) => Intent::Styling,
            Some(QuickAction::Improve) => Intent::Improve,
            None => self.classifier.classify(text, self.conversation.phase),
        };
        tracing::debug!("Chat intent {} in phase {}", intent, self.conversation.phase);
        self.conversation.last_user_message = Some(text.to_string());
        self.conversation.last_intent = Some(intent);

        let flags = DraftFlags {
            subject: self.conversation.draft_subject.is_some()
                || !self.draft.subject.trim().is_empty(),
            body: self.conversation.draft_body.is_some() || !self.draft.html.trim().is_empty(),
            html: self.conversation.draft_html.is_some(),
        };
        let context = AiContext {
            quick_action: quick.map(|q| q.key().to_string()),
            user_intent: Some(intent.key().to_string()),
            conversation_phase: Some(self.conversation.phase.key().to_string()),
            email_type: Some(self.draft.section.key().to_string()),
            email_label: Some(self.draft.label.clone()),
            current_subject: Some(self.draft.subject.clone()),
            current_body: Some(self.draft.html.clone()),
            has_draft: Some(flags),
            brand: Some(self.brand.clone()),
            ..AiContext::default()
        };

        let request = GenerationRequest::text(Purpose::Chat(intent), AiRequest::new(text, context));
        let events = vec![self.user(text)];
        Ok(self.issue(events, request))
    }

    fn finish_text(&mut self, request: GenerationRequest, text: &str) -> Vec<ComposerEvent> {
        match request.purpose {
            Purpose::Subjects => self.finish_subjects(text, None),
            Purpose::Revision(modifier) => self.finish_subjects(text, Some(modifier)),
            Purpose::Body => self.finish_body(text),
            Purpose::Theme(theme) => self.finish_theme(request, theme, text),
            Purpose::Chat(intent) => self.finish_chat(intent, text),
            Purpose::Image => self.record_failure(request, messages::IMAGE_FAILED),
        }
    }

    fn finish_subjects(&mut self, text: &str, modifier: Option<Modifier>) -> Vec<ComposerEvent> {
        let candidates = parse_subject_candidates(text);
        if candidates.is_empty() {
            tracing::warn!("Subject reply could not be parsed, using fallback set");
        }

        let exclude = if modifier.is_some() {
            self.workflow.previous_subjects.clone()
        } else {
            Vec::new()
        };
        let options =
            fallback::complete_subject_set(candidates, self.campaign(), modifier, &exclude);
        self.workflow.set_subject_options(options.clone());

        vec![
            self.assistant(messages::subject_options_intro()),
            ComposerEvent::SubjectOptions(options),
            ComposerEvent::Menu(Menu::SubjectRevisions),
        ]
    }

    fn finish_body(&mut self, text: &str) -> Vec<ComposerEvent> {
        let raw = extract::extract_html(text).unwrap_or_else(|| extract::strip_code_fences(text));
        let mut html = extract::strip_document_wrappers(&raw);
        if !html.is_empty() && !html.contains('<') {
            html = text_to_html(&html);
        }

        let campaign = self.workflow.campaign_type;
        if html.trim().is_empty() {
            tracing::warn!("Body reply was empty, using fallback copy");
            html = fallback::body_copy(
                campaign,
                self.workflow.key_points.as_deref().unwrap_or_default(),
                &self.brand.primary_color,
            );
        }
        if !extract::has_call_to_action(&html) {
            tracing::debug!("Body has no call to action, appending one");
            html.push('\n');
            html.push_str(&fallback::cta_html(
                campaign.unwrap_or(CampaignType::Other).cta_label(),
                &self.brand.primary_color,
            ));
        }

        self.draft.html = html.clone();
        self.workflow.generated_body = Some(html);
        self.workflow.advance_to(WorkflowStep::VisualAssets);

        vec![
            ComposerEvent::FieldUpdated(Field::Body),
            self.assistant(messages::body_ready()),
            ComposerEvent::Menu(Menu::VisualAssets),
        ]
    }

    fn finish_theme(
        &mut self,
        request: GenerationRequest,
        theme: ThemeStyle,
        text: &str,
    ) -> Vec<ComposerEvent> {
        let styled = extract::extract_html(text).or_else(|| {
            let stripped = extract::strip_code_fences(text);
            stripped.contains('<').then_some(stripped)
        });

        let Some(styled) = styled else {
            tracing::warn!("Theme reply held no HTML");
            return self.record_failure(request, messages::THEME_FAILED);
        };
        if !extract::preserves_text(&self.draft.html, &styled) {
            tracing::warn!("Theme {} changed the email text, keeping the original", theme);
            return self.record_failure(request, messages::THEME_FAILED);
        }

        tracing::info!("Applied theme {}", theme);
        self.draft.html = styled;
        self.workflow.theme = Some(theme);
        self.conversation.advance_to(Phase::Review);
        vec![
            ComposerEvent::FieldUpdated(Field::Body),
            self.assistant(messages::theme_applied()),
            ComposerEvent::Menu(Menu::Themes),
        ]
    }

    fn finish_chat(&mut self, intent: Intent, text: &str) -> Vec<ComposerEvent> {
        if let Some(action) = extract::email_action(text) {
            return self.apply_email_action(action);
        }

        if extract::contains_html_document(text) {
            if let Some(html) = extract::extract_html(text) {
                tracing::debug!("Reply holds an HTML design");
                let summary = html_summary(text);
                return self.offer_html(summary, html);
            }
        }

        let mut events = vec![self.assistant(text)];

        if intent == Intent::Styling && !extract::asks_questions(text) {
            if let Some(html) = extract::loose_html(text) {
                events.extend(self.offer_html_only(html));
                return events;
            }
        }

        if intent == Intent::Subject || extract::has_multiple_subjects(text) {
            let mut subjects = extract::labeled_subjects(text);
            if subjects.is_empty() {
                subjects = extract::loose_subjects(text);
            }
            if !subjects.is_empty() {
                events.push(self.offer_subjects(subjects));
                return events;
            }
        }

        if intent == Intent::Body || extract::has_body_section(text) {
            if let Some(body) = extract::body_section(text) {
                events.push(self.offer_body(body));
                return events;
            }
        }

        if let Some(image) = extract::markdown_image(text) {
            events.push(ComposerEvent::Offer(Offer::Image(image)));
            return events;
        }
        if intent == Intent::Image {
            let subject = self
                .workflow
                .selected_subject
                .clone()
                .unwrap_or_else(|| self.draft.subject.clone());
            let prompt =
                messages::suggested_image_prompt(Some(&subject), self.workflow.campaign_type);
            events.push(ComposerEvent::Offer(Offer::ImageSuggestion(prompt)));
            return events;
        }

        let loose = extract::loose_subjects(text);
        if !loose.is_empty() {
            events.push(self.offer_subjects(loose));
            return events;
        }
        if let Some(html) = extract::loose_html(text) {
            events.extend(self.offer_html_only(html));
        }
        events
    }

    fn apply_email_action(&mut self, action: EmailAction) -> Vec<ComposerEvent> {
        match action {
            EmailAction::ReplaceAll {
                html,
                chat_response,
            } => {
                let mut events = Vec::new();
                if !html.trim().is_empty() {
                    self.draft.html = html;
                    events.push(ComposerEvent::FieldUpdated(Field::Body));
                }
                events.push(self.assistant(chat_response));
                events
            }
            EmailAction::InsertBlock {
                html,
                position,
                chat_response,
            } => {
                let mut events = Vec::new();
                if !html.trim().is_empty() {
                    self.draft.html = match position {
                        BlockPosition::Top => format!("{}{}", html, self.draft.html),
                        BlockPosition::Bottom => format!("{}{}", self.draft.html, html),
                    };
                    events.push(ComposerEvent::FieldUpdated(Field::Body));
                }
                events.push(self.assistant(chat_response));
                events
            }
            EmailAction::Unsupported {
                action,
                chat_response,
            } => {
                tracing::warn!("Unsupported email action: {}", action);
                vec![self.assistant(chat_response)]
            }
        }
    }

    fn offer_html(&mut self, summary: String, html: String) -> Vec<ComposerEvent> {
        let mut events = vec![self.assistant(summary)];
        events.extend(self.offer_html_only(html));
        events
    }

    fn offer_html_only(&mut self, html: String) -> Vec<ComposerEvent> {
        self.conversation.draft_html = Some(html.clone());
        self.conversation.advance_to(Phase::Styling);
        vec![ComposerEvent::Offer(Offer::Html(html))]
    }

    fn offer_subjects(&mut self, subjects: Vec<String>) -> ComposerEvent {
        self.conversation.advance_to(Phase::Subject);
        self.conversation.pending.subjects = subjects.clone();
        self.conversation.pending.selected_index = None;
        ComposerEvent::Offer(Offer::SubjectCandidates(subjects))
    }

    fn offer_body(&mut self, body: String) -> ComposerEvent {
        self.conversation.advance_to(Phase::Body);
        self.conversation.draft_body = Some(body.clone());
        self.conversation.pending.bodies = vec![body.clone()];
        ComposerEvent::Offer(Offer::Body(body))
    }

    fn apply_subject_candidate(&mut self, index: usize) -> Result<Transition> {
        let subject = self
            .conversation
            .pending
            .subjects
            .get(index)
            .cloned()
            .ok_or_else(|| {
                ComposerError::Validation(format!("No subject candidate {}", index + 1))
            })?;

        self.conversation.pending.selected_index = Some(index);
        self.conversation.draft_subject = Some(subject.clone());
        self.draft.subject = subject.clone();
        Ok(Transition::events(vec![
            ComposerEvent::FieldUpdated(Field::Subject),
            self.assistant(messages::subject_applied(&subject)),
        ]))
    }

    fn apply_body(&mut self) -> Result<Transition> {
        let body = self
            .conversation
            .pending
            .bodies
            .first()
            .cloned()
            .or_else(|| self.conversation.draft_body.clone())
            .ok_or_else(|| ComposerError::Validation("No body copy to apply".to_string()))?;

        self.draft.html = if body.contains('<') {
            body
        } else {
            text_to_html(&body)
        };
        Ok(Transition::events(vec![
            ComposerEvent::FieldUpdated(Field::Body),
            self.assistant(messages::body_applied()),
        ]))
    }

    fn apply_html(&mut self) -> Result<Transition> {
        let html = self
            .conversation
            .draft_html
            .clone()
            .ok_or_else(|| ComposerError::Validation("No design to apply".to_string()))?;

        self.draft.html = html;
        self.conversation.advance_to(Phase::Review);
        Ok(Transition::events(vec![
            ComposerEvent::FieldUpdated(Field::Body),
            self.assistant(messages::design_applied()),
        ]))
    }

    fn insert_image(&mut self, image: &MarkdownImage) -> Result<Transition> {
        if image.url.trim().is_empty() {
            return Err(ComposerError::Validation("Image URL is empty".to_string()).into());
        }
        self.draft.html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" style=\"max-width: 100%; height: auto;\">",
            attribute_url(image.url.trim()),
            fallback::escape_html(&image.alt)
        ));
        Ok(Transition::events(vec![
            ComposerEvent::FieldUpdated(Field::Body),
            self.assistant(messages::image_inserted()),
        ]))
    }

    fn retry(&mut self) -> Result<Transition> {
        let request = self.last_failed.take().ok_or_else(|| {
            ComposerError::InvalidTransition {
                action: "retry".to_string(),
                step: self.workflow.step.to_string(),
            }
        })?;
        tracing::info!("Retrying {:?}", request.purpose);
        Ok(self.issue(Vec::new(), request))
    }
}

/// Subject candidates from a reply: JSON first, then labeled lines
fn parse_subject_candidates(text: &str) -> Vec<String> {
    if let Some(lines) = extract::subject_lines_json(text) {
        if !lines.is_empty() {
            return lines;
        }
    }
    extract::labeled_subjects(text)
}

fn placeholder_for(purpose: Purpose) -> String {
    match purpose {
        Purpose::Subjects => messages::generating_subjects().to_string(),
        Purpose::Revision(modifier) => messages::generating_revision(modifier),
        Purpose::Body => messages::generating_body().to_string(),
        Purpose::Image => messages::generating_image().to_string(),
        Purpose::Theme(theme) => messages::applying_theme(theme),
        Purpose::Chat(_) => messages::thinking().to_string(),
    }
}

fn apology_for(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::Subjects | Purpose::Revision(_) => messages::SUBJECTS_FAILED,
        Purpose::Body => messages::BODY_FAILED,
        Purpose::Image => messages::IMAGE_FAILED,
        Purpose::Theme(_) => messages::THEME_FAILED,
        Purpose::Chat(_) => messages::CHAT_FAILED,
    }
}

/// Chat text of a reply with its HTML removed
fn html_summary(text: &str) -> String {
    let summary = match text.find("```") {
        Some(start) => text[..start].trim().to_string(),
        None => text
            .find('<')
            .map(|start| text[..start].trim().to_string())
            .unwrap_or_default(),
    };
    if summary.is_empty() {
        "Here's a styled design for your email.".to_string()
    } else {
        summary
    }
}

/// Wraps plain-text paragraphs in `<p>` tags
fn text_to_html(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", fallback::escape_html(p).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn attribute_url(url: &str) -> String {
    url.replace('"', "%22")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::action::RequestKind;
    use crate::composer::draft::Section;
    use crate::composer::types::Hook;

    fn brand() -> BrandContext {
        BrandContext {
            site_name: "Acme".to_string(),
            logo_url: String::new(),
            primary_color: "#6366f1".to_string(),
            secondary_color: "#22d3ee".to_string(),
        }
    }

    fn session() -> ComposerSession {
        let mut session = ComposerSession::new(Draft::new(Section::General, "Promo"), brand());
        session.open();
        session
    }

    fn reply(session: &mut ComposerSession, text: &str) -> Vec<ComposerEvent> {
        session.complete(GenerationResponse::Text(text.to_string()))
    }

    fn at_subjects(campaign: CampaignType, audience: AudienceType) -> ComposerSession {
        let mut session = session();
        session.dispatch(Action::SelectCampaign(campaign)).unwrap();
        let transition = session.dispatch(Action::SelectAudience(audience)).unwrap();
        assert!(transition.request.is_some());
        reply(
            &mut session,
            r#"{"subject_lines": [{"hook": "Benefit", "text": "Save 30% today"}, {"hook": "Mystery", "text": "You'll want to see this"}, {"hook": "Urgency", "text": "Ends at midnight"}]}"#,
        );
        session
    }

    fn at_body(session: &mut ComposerSession) {
        session.dispatch(Action::SelectSubject(0)).unwrap();
        session.dispatch(Action::Chat("Ends Friday".to_string())).unwrap();
        reply(session, "<p>Hi [Name],</p><p>Sale ends Friday.</p><a href=\"#\">Shop</a>");
    }

    fn has_event(events: &[ComposerEvent], wanted: &ComposerEvent) -> bool {
        events.iter().any(|e| e == wanted)
    }

    #[test]
    fn test_open_greets_and_offers_campaigns() {
        let mut session = ComposerSession::new(Draft::default(), brand());
        let events = session.open();
        assert!(has_event(&events, &ComposerEvent::Menu(Menu::CampaignTypes)));
        assert_eq!(session.conversation().history().len(), 2);
    }

    #[test]
    fn test_select_campaign_advances_to_audience() {
        let mut session = session();
        let transition = session
            .dispatch(Action::SelectCampaign(CampaignType::FlashSale))
            .unwrap();
        assert!(transition.request.is_none());
        assert!(has_event(&transition.events, &ComposerEvent::Menu(Menu::Audiences)));
        assert_eq!(session.workflow().step, WorkflowStep::Audience);
        assert_eq!(session.workflow().campaign_type, Some(CampaignType::FlashSale));
    }

    #[test]
    fn test_select_audience_requests_subjects() {
        let mut session = session();
        session
            .dispatch(Action::SelectCampaign(CampaignType::FlashSale))
            .unwrap();
        let transition = session
            .dispatch(Action::SelectAudience(AudienceType::Vip))
            .unwrap();
        let request = transition.request.unwrap();
        assert_eq!(request.purpose, Purpose::Subjects);
        let ai = request.kind.as_text().unwrap();
        assert_eq!(ai.context.workflow_step.as_deref(), Some("subject_lines"));
        assert_eq!(ai.context.campaign_type.as_deref(), Some("flash_sale"));
        assert_eq!(ai.context.audience_type.as_deref(), Some("vip"));
        assert!(ai.context.campaign_architect_mode);
        assert!(ai.system_prompt().unwrap().contains("psychological hooks"));
        assert!(session.is_generating());
    }

    #[test]
    fn test_out_of_order_action_is_rejected() {
        let mut session = session();
        let err = session
            .dispatch(Action::SelectAudience(AudienceType::Vip))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ComposerError>(),
            Some(ComposerError::InvalidTransition { .. })
        ));
        assert_eq!(session.workflow().step, WorkflowStep::Strategy);
    }

    #[test]
    fn test_subject_options_use_reply_and_position_hooks() {
        let session = at_subjects(CampaignType::Newsletter, AudienceType::Subscribers);
        let options = &session.workflow().subject_options;
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].text, "Save 30% today");
        assert_eq!(options[0].hook, Hook::BenefitDriven);
        assert_eq!(options[2].hook, Hook::UrgencyScarcity);
        assert!(!session.is_generating());
    }

    #[test]
    fn test_labeled_subject_reply_is_parsed() {
        let mut session = session();
        session.dispatch(Action::SelectCampaign(CampaignType::Event)).unwrap();
        session.dispatch(Action::SelectAudience(AudienceType::New)).unwrap();
        reply(
            &mut session,
            "Subject: You're invited to our launch\nSubject: Save the date for June\nSubject: Only 20 seats left",
        );
        assert_eq!(
            session.workflow().option_texts(),
            vec![
                "You're invited to our launch",
                "Save the date for June",
                "Only 20 seats left"
            ]
        );
    }

    #[test]
    fn test_select_subject_sets_draft_and_advances() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        let transition = session.dispatch(Action::SelectSubject(1)).unwrap();
        assert!(has_event(&transition.events, &ComposerEvent::FieldUpdated(Field::Subject)));
        assert_eq!(
            session.workflow().selected_subject.as_deref(),
            Some("You'll want to see this")
        );
        assert_eq!(session.draft().subject, "You'll want to see this");
        assert_eq!(session.workflow().step, WorkflowStep::BodyCopy);
        assert_eq!(session.conversation().phase, Phase::Body);
    }

    #[test]
    fn test_select_subject_out_of_range() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        assert!(session.dispatch(Action::SelectSubject(3)).is_err());
        assert_eq!(session.workflow().step, WorkflowStep::SubjectLines);
    }

    #[test]
    fn test_custom_subject_is_trimmed_verbatim() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        session
            .dispatch(Action::CustomSubject("  My OWN line!!  ".to_string()))
            .unwrap();
        assert_eq!(session.workflow().selected_subject.as_deref(), Some("My OWN line!!"));
        assert_eq!(session.draft().subject, "My OWN line!!");
    }

    #[test]
    fn test_empty_custom_subject_rejected() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        assert!(session.dispatch(Action::CustomSubject("   ".to_string())).is_err());
        assert!(session.workflow().selected_subject.is_none());
    }

    #[test]
    fn test_revision_keeps_step_and_sends_previous() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        let transition = session
            .dispatch(Action::ReviseSubjects(Modifier::Funnier))
            .unwrap();
        let request = transition.request.unwrap();
        let ai = request.kind.as_text().unwrap();
        assert_eq!(ai.context.modifier.as_deref(), Some("funnier"));
        assert_eq!(ai.context.previous_options.len(), 3);
        assert_eq!(session.workflow().step, WorkflowStep::SubjectLines);
    }

    #[test]
    fn test_revision_never_repeats_previous() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        session
            .dispatch(Action::ReviseSubjects(Modifier::Shorter))
            .unwrap();
        reply(
            &mut session,
            r#"{"subject_lines": ["Save 30% today", "Ends at midnight", "Quick perk"]}"#,
        );
        let texts = session.workflow().option_texts();
        assert_eq!(texts.len(), 3);
        for text in &texts {
            assert_ne!(text, "Save 30% today");
            assert_ne!(text, "Ends at midnight");
            assert_ne!(text, "You'll want to see this");
            assert!(text.chars().count() <= Modifier::SHORT_LIMIT);
        }
        assert!(texts.contains(&"Quick perk".to_string()));
    }

    #[test]
    fn test_body_request_and_result() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        session.dispatch(Action::SelectSubject(0)).unwrap();
        let transition = session
            .dispatch(Action::Chat("Ends Friday, free shipping over $50".to_string()))
            .unwrap();
        let request = transition.request.unwrap();
        assert_eq!(request.purpose, Purpose::Body);
        let ai = request.kind.as_text().unwrap();
        assert_eq!(
            ai.context.key_points.as_deref(),
            Some("Ends Friday, free shipping over $50")
        );
        assert!(ai.system_prompt().unwrap().contains("Subject Line: Save 30% today"));

        reply(
            &mut session,
            "```html\n<html><body><p>Hi [Name],</p><p>Free shipping over $50.</p></body></html>\n```",
        );
        let html = &session.draft().html;
        assert!(!html.contains("<html"));
        assert!(!html.contains("<body"));
        assert!(extract::has_call_to_action(html));
        assert_eq!(session.workflow().step, WorkflowStep::VisualAssets);
    }

    #[test]
    fn test_plain_text_body_is_wrapped() {
        let mut session = at_subjects(CampaignType::Newsletter, AudienceType::Cold);
        session.dispatch(Action::SelectSubject(0)).unwrap();
        session.dispatch(Action::Chat("New posts".to_string())).unwrap();
        reply(&mut session, "Hello there.\n\nRead the new posts.");
        let html = &session.draft().html;
        assert!(html.starts_with("<p>Hello there.</p>"));
        assert!(html.contains("Read More"));
    }

    #[test]
    fn test_body_transport_failure_keeps_state() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        session.dispatch(Action::SelectSubject(0)).unwrap();
        session.dispatch(Action::Chat("Ends Friday".to_string())).unwrap();
        let events = session.fail(&ComposerError::Transport("502".to_string()).into());
        assert!(has_event(&events, &ComposerEvent::assistant(messages::BODY_FAILED)));
        assert!(has_event(&events, &ComposerEvent::RetryAvailable));
        assert_eq!(session.workflow().step, WorkflowStep::BodyCopy);
        assert!(session.draft().html.is_empty());
        assert!(!session.is_generating());

        let retry = session.dispatch(Action::Retry).unwrap();
        assert_eq!(retry.request.unwrap().purpose, Purpose::Body);
        assert!(session.is_generating());
    }

    #[test]
    fn test_empty_body_reply_uses_fallback() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        session.dispatch(Action::SelectSubject(0)).unwrap();
        session.dispatch(Action::Chat("Ends Friday".to_string())).unwrap();
        session.fail(&ComposerError::EmptyResponse.into());
        assert!(session.draft().html.contains("<li>Ends Friday</li>"));
        assert_eq!(session.workflow().step, WorkflowStep::VisualAssets);
    }

    #[test]
    fn test_retry_without_failure_is_rejected() {
        let mut session = session();
        assert!(session.dispatch(Action::Retry).is_err());
    }

    #[test]
    fn test_actions_ignored_while_generating() {
        let mut session = session();
        session.dispatch(Action::Chat("Write a subject".to_string())).unwrap();
        let history_len = session.conversation().history().len();

        let second = session.dispatch(Action::Chat("Another".to_string())).unwrap();
        assert!(second.is_empty());
        assert_eq!(session.conversation().history().len(), history_len);
        assert_eq!(
            session.conversation().last_user_message.as_deref(),
            Some("Write a subject")
        );
    }

    #[test]
    fn test_timeout_resets_guard() {
        let mut session = session();
        session.dispatch(Action::Chat("hello".to_string())).unwrap();
        let events = session.timeout();
        assert!(has_event(&events, &ComposerEvent::RetryAvailable));
        assert!(!session.is_generating());
        assert!(session.can_retry());
    }

    #[test]
    fn test_timeout_error_reads_as_timeout() {
        let mut session = session();
        session.dispatch(Action::Chat("hello".to_string())).unwrap();
        let events = session.fail(&anyhow::Error::from(ComposerError::Timeout(30)));
        assert!(has_event(&events, &ComposerEvent::assistant(messages::TIMED_OUT)));
        assert!(has_event(&events, &ComposerEvent::RetryAvailable));
        assert!(!session.is_generating());
    }

    #[test]
    fn test_late_response_is_dropped() {
        let mut session = session();
        assert!(reply(&mut session, "stray").is_empty());
    }

    #[test]
    fn test_visual_skip_reaches_theme_send() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        at_body(&mut session);
        let transition = session.dispatch(Action::SkipVisuals).unwrap();
        assert!(has_event(&transition.events, &ComposerEvent::Menu(Menu::Themes)));
        assert_eq!(session.workflow().step, WorkflowStep::ThemeSend);
        assert_eq!(session.conversation().phase, Phase::Styling);
    }

    #[test]
    fn test_image_flow_prepends_image() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        at_body(&mut session);
        session.dispatch(Action::GenerateImage).unwrap();
        assert_eq!(session.workflow().step, WorkflowStep::ImageGeneration);

        let transition = session.dispatch(Action::Chat("suggest".to_string())).unwrap();
        match transition.request.unwrap().kind {
            RequestKind::Image { prompt } => assert!(prompt.contains("Save 30% today")),
            other => panic!("Expected image request, got {:?}", other),
        }

        session.complete(GenerationResponse::Image(GeneratedImage {
            url: "https://img.test/a.png".to_string(),
            prompt: "p".to_string(),
            placeholder: true,
        }));
        assert!(session.workflow().pending_image.is_some());

        session.dispatch(Action::UseImage).unwrap();
        assert!(session
            .draft()
            .html
            .starts_with("<img src=\"https://img.test/a.png\" alt=\"Email Image\""));
        assert_eq!(session.workflow().step, WorkflowStep::ThemeSend);
    }

    #[test]
    fn test_images_disabled_stays_on_visual_step() {
        let mut session = ComposerSession::new(Draft::default(), brand()).with_images(false);
        session.open();
        session.dispatch(Action::SelectCampaign(CampaignType::Welcome)).unwrap();
        session.dispatch(Action::SelectAudience(AudienceType::New)).unwrap();
        reply(&mut session, "unparseable");
        at_body(&mut session);
        let transition = session.dispatch(Action::GenerateImage).unwrap();
        assert!(transition.request.is_none());
        assert_eq!(session.workflow().step, WorkflowStep::VisualAssets);
    }

    #[test]
    fn test_upload_image_inserts_url_verbatim() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        at_body(&mut session);
        session
            .dispatch(Action::UploadImage("https://cdn.test/pic.jpg".to_string()))
            .unwrap();
        assert!(session.draft().html.contains("<img src=\"https://cdn.test/pic.jpg\""));
        assert_eq!(session.workflow().step, WorkflowStep::ThemeSend);
    }

    #[test]
    fn test_theme_applied_when_text_preserved() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        at_body(&mut session);
        session.dispatch(Action::SkipVisuals).unwrap();
        let before = session.draft().html.clone();

        let transition = session.dispatch(Action::ApplyTheme(ThemeStyle::Dark)).unwrap();
        let request = transition.request.unwrap();
        assert_eq!(request.kind.as_text().unwrap().context.theme.as_deref(), Some("dark"));

        let styled = before.replace("<p>", "<p style=\"color: #f0f0f0;\">");
        reply(&mut session, &format!("```html\n{}\n```", styled));
        assert_eq!(session.draft().html, styled);
        assert_eq!(session.workflow().theme, Some(ThemeStyle::Dark));
        assert_eq!(session.conversation().phase, Phase::Review);
    }

    #[test]
    fn test_theme_rejected_when_text_changes() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        at_body(&mut session);
        session.dispatch(Action::SkipVisuals).unwrap();
        let before = session.draft().html.clone();

        session.dispatch(Action::ApplyTheme(ThemeStyle::Bold)).unwrap();
        let events = reply(&mut session, "<div><p>Totally different words</p></div>");
        assert!(has_event(&events, &ComposerEvent::assistant(messages::THEME_FAILED)));
        assert_eq!(session.draft().html, before);
        assert!(session.can_retry());
    }

    #[test]
    fn test_theme_requires_body() {
        let mut session = session();
        assert!(session.dispatch(Action::ApplyTheme(ThemeStyle::Bold)).is_err());
    }

    #[test]
    fn test_free_chat_context() {
        let mut session = session();
        session.draft_mut().subject = "Hello".to_string();
        let transition = session
            .dispatch(Action::Chat("Write a better subject line".to_string()))
            .unwrap();
        let request = transition.request.unwrap();
        assert_eq!(request.purpose, Purpose::Chat(Intent::Subject));
        let context = &request.kind.as_text().unwrap().context;
        assert_eq!(context.user_intent.as_deref(), Some("subject"));
        assert_eq!(context.conversation_phase.as_deref(), Some("initial"));
        assert_eq!(context.email_type.as_deref(), Some("general"));
        assert_eq!(context.current_subject.as_deref(), Some("Hello"));
        assert!(context.has_draft.unwrap().subject);
        assert!(!context.campaign_architect_mode);
        assert!(context.system_prompt_override.is_none());
    }

    #[test]
    fn test_html_wins_over_subject_lines() {
        let mut session = session();
        session
            .dispatch(Action::Chat("Give me subject lines and a design".to_string()))
            .unwrap();
        let events = reply(
            &mut session,
            "Subject: Big news inside today\nSubject: Something new for you\n```html\n<!DOCTYPE html><html><body><p>Hi</p></body></html>\n```",
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, ComposerEvent::Offer(Offer::Html(_)))));
        assert!(!events
            .iter()
            .any(|e| matches!(e, ComposerEvent::Offer(Offer::SubjectCandidates(_)))));
        assert_eq!(session.conversation().phase, Phase::Styling);

        session.dispatch(Action::ApplyHtml).unwrap();
        assert!(session.draft().html.contains("<p>Hi</p>"));
        assert_eq!(session.conversation().phase, Phase::Review);
    }

    #[test]
    fn test_image_chat_without_markdown_suggests_prompt() {
        let mut session = at_subjects(CampaignType::FlashSale, AudienceType::Vip);
        at_body(&mut session);
        assert_eq!(session.workflow().step, WorkflowStep::VisualAssets);
        let transition = session
            .dispatch(Action::Chat("add a photo of a beach".to_string()))
            .unwrap();
        assert_eq!(
            transition.request.unwrap().purpose,
            Purpose::Chat(Intent::Image)
        );

        let events = reply(
            &mut session,
            "A sunlit beach with soft waves would set the tone nicely.",
        );
        let expected =
            messages::suggested_image_prompt(Some("Save 30% today"), Some(CampaignType::FlashSale));
        assert!(has_event(
            &events,
            &ComposerEvent::Offer(Offer::ImageSuggestion(expected))
        ));
    }

    #[test]
    fn test_image_chat_with_markdown_offers_image() {
        let mut session = session();
        session
            .dispatch(Action::Chat("add a photo of a beach".to_string()))
            .unwrap();
        let events = reply(&mut session, "Try this: ![Beach](https://img.test/beach.png)");
        assert!(events
            .iter()
            .any(|e| matches!(e, ComposerEvent::Offer(Offer::Image(image)) if image.alt == "Beach")));
        assert!(!events
            .iter()
            .any(|e| matches!(e, ComposerEvent::Offer(Offer::ImageSuggestion(_)))));
    }

    #[test]
    fn test_subject_offer_then_apply() {
        let mut session = session();
        session
            .dispatch(Action::Chat("Suggest a subject".to_string()))
            .unwrap();
        reply(
            &mut session,
            "Option 1: Subject: Your weekly picks are here\nOption 2: Subject: Fresh finds for you",
        );
        assert_eq!(session.conversation().pending.subjects.len(), 2);
        assert_eq!(session.conversation().phase, Phase::Subject);

        session.dispatch(Action::ApplySubjectCandidate(1)).unwrap();
        assert_eq!(session.draft().subject, "Fresh finds for you");
        assert_eq!(session.conversation().pending.selected_index, Some(1));
    }

    #[test]
    fn test_body_offer_then_apply() {
        let mut session = session();
        session.dispatch(Action::Chat("Write the body".to_string())).unwrap();
        reply(
            &mut session,
            "Body: Thanks for being with us this year. We have a small gift waiting in your account.",
        );
        assert_eq!(session.conversation().phase, Phase::Body);
        session.dispatch(Action::ApplyBody).unwrap();
        assert!(session.draft().html.starts_with("<p>Thanks for being with us"));
    }

    #[test]
    fn test_email_action_insert_block() {
        let mut session = session();
        session.draft_mut().html = "<p>Body</p>".to_string();
        session.dispatch(Action::Chat("add a footer".to_string())).unwrap();
        let events = reply(
            &mut session,
            r#"{"action": "insert_block", "position": "bottom", "block": {"attrs": {"content": "<p>Footer</p>"}}, "chat_response": "Added a footer."}"#,
        );
        assert_eq!(session.draft().html, "<p>Body</p><p>Footer</p>");
        assert!(has_event(&events, &ComposerEvent::assistant("Added a footer.")));
    }

    #[test]
    fn test_quick_action_generate_html() {
        let mut session = session();
        let transition = session
            .dispatch(Action::Quick(QuickAction::GenerateHtml))
            .unwrap();
        let request = transition.request.unwrap();
        assert_eq!(request.purpose, Purpose::Chat(Intent::Styling));
        let ai = request.kind.as_text().unwrap();
        assert!(ai.message.contains("#6366f1"));
        assert_eq!(ai.context.quick_action.as_deref(), Some("generate-html"));
    }

    #[test]
    fn test_empty_chat_reply_message() {
        let mut session = session();
        session.dispatch(Action::Chat("hello".to_string())).unwrap();
        let events = session.fail(&ComposerError::EmptyResponse.into());
        assert!(has_event(&events, &ComposerEvent::assistant(messages::EMPTY_RESPONSE)));
    }

    #[test]
    fn test_insert_markdown_image() {
        let mut session = session();
        session.draft_mut().html = "<p>Body</p>".to_string();
        session
            .dispatch(Action::InsertImage(MarkdownImage {
                alt: "Hero".to_string(),
                url: "https://img.test/h.png".to_string(),
            }))
            .unwrap();
        assert!(session
            .draft()
            .html
            .ends_with("<img src=\"https://img.test/h.png\" alt=\"Hero\" style=\"max-width: 100%; height: auto;\">"));
    }

    #[test]
    fn test_html_summary() {
        assert_eq!(html_summary("Here:\n```html\n<p>x</p>\n```"), "Here:");
        assert_eq!(
            html_summary("<html></html>"),
            "Here's a styled design for your email."
        );
    }
}
