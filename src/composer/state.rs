//! Session state for the composer
//!
//! [`ConversationState`] tracks free-chat progress and the message history;
//! [`WorkflowState`] tracks the guided campaign steps. Both phases and steps
//! are ordered and only ever move forward.

use crate::composer::types::{AudienceType, CampaignType, Hook, Intent, ThemeStyle};
use crate::providers::GeneratedImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-chat progress through the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing drafted yet
    Initial,
    /// Working on the subject
    Subject,
    /// Working on the body
    Body,
    /// Working on HTML styling
    Styling,
    /// Styled HTML applied
    Review,
}

impl Phase {
    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Subject => "subject",
            Self::Body => "body",
            Self::Styling => "styling",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Guided workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Choose a campaign type
    Strategy,
    /// Choose an audience
    Audience,
    /// Pick, write or revise a subject line
    SubjectLines,
    /// Provide key points for the body
    BodyCopy,
    /// Generate, upload or skip an image
    VisualAssets,
    /// Describe and accept a generated image
    ImageGeneration,
    /// Apply themes, then send
    ThemeSend,
}

impl WorkflowStep {
    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Audience => "audience",
            Self::SubjectLines => "subject_lines",
            Self::BodyCopy => "body_copy",
            Self::VisualAssets => "visual_assets",
            Self::ImageGeneration => "image_generation",
            Self::ThemeSend => "theme_send",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person composing
    User,
    /// The composer assistant
    Assistant,
}

/// One entry in the chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Markdown-ish text
    pub content: String,
}

/// A generated subject-line candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectOption {
    /// Psychological angle
    pub hook: Hook,
    /// Candidate text
    pub text: String,
}

/// Options offered by free-chat parsing and awaiting a user choice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOptions {
    /// Subject candidates parsed from a reply
    pub subjects: Vec<String>,
    /// Body candidates parsed from a reply
    pub bodies: Vec<String>,
    /// Selected subject index
    pub selected_index: Option<usize>,
}

/// Free-chat conversation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    /// Current phase
    pub phase: Phase,
    /// Last message the user sent
    pub last_user_message: Option<String>,
    /// Intent detected for the last message
    pub last_intent: Option<Intent>,
    /// Subject drafted through chat
    pub draft_subject: Option<String>,
    /// Body drafted through chat
    pub draft_body: Option<String>,
    /// Styled HTML drafted through chat
    pub draft_html: Option<String>,
    /// Options awaiting a choice
    pub pending: PendingOptions,
    history: Vec<ChatMessage>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Fresh state in the `initial` phase
    pub fn new() -> Self {
        Self {
            phase: Phase::Initial,
            last_user_message: None,
            last_intent: None,
            draft_subject: None,
            draft_body: None,
            draft_html: None,
            pending: PendingOptions::default(),
            history: Vec::new(),
        }
    }

    /// Moves the phase forward to `phase`; earlier phases are ignored
    ///
    /// Returns true if the phase changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::composer::{ConversationState, Phase};
    ///
    /// let mut state = ConversationState::new();
    /// assert!(state.advance_to(Phase::Body));
    /// assert!(!state.advance_to(Phase::Subject));
    /// assert_eq!(state.phase, Phase::Body);
    /// ```
    pub fn advance_to(&mut self, phase: Phase) -> bool {
        if phase > self.phase {
            tracing::debug!("Conversation phase {} -> {}", self.phase, phase);
            self.phase = phase;
            true
        } else {
            false
        }
    }

    /// Appends a message to the history
    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// Ordered chat history
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// Guided workflow state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Current step
    pub step: WorkflowStep,
    /// Chosen campaign type
    pub campaign_type: Option<CampaignType>,
    /// Chosen audience
    pub audience_type: Option<AudienceType>,
    /// Most recent subject candidates
    pub subject_options: Vec<SubjectOption>,
    /// Every candidate text shown so far, oldest first
    pub previous_subjects: Vec<String>,
    /// Chosen subject
    pub selected_subject: Option<String>,
    /// Talking points for the body
    pub key_points: Option<String>,
    /// Generated body HTML
    pub generated_body: Option<String>,
    /// Image awaiting accept or retry
    pub pending_image: Option<GeneratedImage>,
    /// Last theme applied
    pub theme: Option<ThemeStyle>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowState {
    /// Fresh workflow at the `strategy` step
    pub fn new() -> Self {
        Self {
            step: WorkflowStep::Strategy,
            campaign_type: None,
            audience_type: None,
            subject_options: Vec::new(),
            previous_subjects: Vec::new(),
            selected_subject: None,
            key_points: None,
            generated_body: None,
            pending_image: None,
            theme: None,
        }
    }

    /// Moves the step forward to `step`; earlier steps are ignored
    ///
    /// Returns true if the step changed.
    pub fn advance_to(&mut self, step: WorkflowStep) -> bool {
        if step > self.step {
            tracing::debug!("Workflow step {} -> {}", self.step, step);
            self.step = step;
            true
        } else {
            false
        }
    }

    /// Replaces the current subject candidates, remembering their texts
    pub fn set_subject_options(&mut self, options: Vec<SubjectOption>) {
        for option in &options {
            if !self
                .previous_subjects
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(&option.text))
            {
                self.previous_subjects.push(option.text.clone());
            }
        }
        self.subject_options = options;
    }

    /// Candidate texts currently on offer
    pub fn option_texts(&self) -> Vec<String> {
        self.subject_options.iter().map(|o| o.text.clone()).collect()
    }
}
