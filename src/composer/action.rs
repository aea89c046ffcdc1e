//! User actions and generation requests
//!
//! An [`Action`] is everything the user can do in the composer. Dispatching
//! one may hand back a [`GenerationRequest`] that the driver executes; its
//! outcome returns to the session as a [`GenerationResponse`].

use crate::composer::extract::MarkdownImage;
use crate::composer::types::{
    AudienceType, CampaignType, Intent, Modifier, QuickAction, ThemeStyle,
};
use crate::providers::{AiRequest, GeneratedImage};
use std::fmt;

/// A user action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pick the campaign type at the strategy step
    SelectCampaign(CampaignType),
    /// Pick the audience at the audience step
    SelectAudience(AudienceType),
    /// Choose subject candidate `i` (zero-based)
    SelectSubject(usize),
    /// Use a custom subject line
    CustomSubject(String),
    /// Regenerate the subject candidates
    ReviseSubjects(Modifier),
    /// Free text; meaning depends on the current step
    Chat(String),
    /// Start the image generation sub-flow
    GenerateImage,
    /// Insert an image chosen from the media picker
    UploadImage(String),
    /// Skip images and go to final review
    SkipVisuals,
    /// Accept the pending generated image
    UseImage,
    /// Generate another image for the same prompt
    RetryImage,
    /// Restyle the body with a theme
    ApplyTheme(ThemeStyle),
    /// Run a one-shot quick action
    Quick(QuickAction),
    /// Apply subject candidate `i` offered by free chat
    ApplySubjectCandidate(usize),
    /// Apply the body offered by free chat
    ApplyBody,
    /// Apply the HTML design offered by free chat
    ApplyHtml,
    /// Insert an offered image at the end of the body
    InsertImage(MarkdownImage),
    /// Re-send the last failed request
    Retry,
}

impl Action {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectCampaign(_) => "select_campaign",
            Self::SelectAudience(_) => "select_audience",
            Self::SelectSubject(_) => "select_subject",
            Self::CustomSubject(_) => "custom_subject",
            Self::ReviseSubjects(_) => "revise_subjects",
            Self::Chat(_) => "chat",
            Self::GenerateImage => "generate_image",
            Self::UploadImage(_) => "upload_image",
            Self::SkipVisuals => "skip_visuals",
            Self::UseImage => "use_image",
            Self::RetryImage => "retry_image",
            Self::ApplyTheme(_) => "apply_theme",
            Self::Quick(_) => "quick_action",
            Self::ApplySubjectCandidate(_) => "apply_subject_candidate",
            Self::ApplyBody => "apply_body",
            Self::ApplyHtml => "apply_html",
            Self::InsertImage(_) => "insert_image",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a generation request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Initial subject candidates
    Subjects,
    /// Revised subject candidates
    Revision(Modifier),
    /// Body copy from key points
    Body,
    /// Image for the visual step
    Image,
    /// Theme restyle
    Theme(ThemeStyle),
    /// Free chat or quick action, parsed by intent
    Chat(Intent),
}

/// Work the driver performs on behalf of the session
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    /// Call the AI text endpoint
    Text(AiRequest),
    /// Call the image capability
    Image {
        /// Image prompt
        prompt: String,
    },
}

impl RequestKind {
    /// The AI request, for text kinds
    pub fn as_text(&self) -> Option<&AiRequest> {
        match self {
            Self::Text(request) => Some(request),
            Self::Image { .. } => None,
        }
    }
}

/// A request handed out by the session
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Why it was issued
    pub purpose: Purpose,
    /// What to call
    pub kind: RequestKind,
}

impl GenerationRequest {
    /// Text request
    pub fn text(purpose: Purpose, request: AiRequest) -> Self {
        Self {
            purpose,
            kind: RequestKind::Text(request),
        }
    }

    /// Image request
    pub fn image(prompt: impl Into<String>) -> Self {
        Self {
            purpose: Purpose::Image,
            kind: RequestKind::Image {
                prompt: prompt.into(),
            },
        }
    }
}

/// Successful outcome of a [`GenerationRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResponse {
    /// Extracted reply text
    Text(String),
    /// Generated image
    Image(GeneratedImage),
}
