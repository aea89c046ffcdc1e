//! Events emitted by the composer session
//!
//! Handlers never print; they return events and a separate render step
//! turns them into terminal output.

use crate::composer::extract::MarkdownImage;
use crate::composer::state::{Role, SubjectOption};
use crate::providers::GeneratedImage;
use serde::{Deserialize, Serialize};

/// Draft field changed by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Subject line
    Subject,
    /// Preheader
    Preheader,
    /// HTML body
    Body,
}

/// Choice menu attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Menu {
    /// Campaign types
    CampaignTypes,
    /// Audience segments
    Audiences,
    /// Revision modifiers plus custom input
    SubjectRevisions,
    /// Generate, upload or skip an image
    VisualAssets,
    /// Use or retry a generated image
    ImageReview,
    /// Theme styles
    Themes,
}

/// Content parsed from a free-chat reply, waiting for the user to apply it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Offer {
    /// Subject candidates; apply one by index
    SubjectCandidates(Vec<String>),
    /// Body copy
    Body(String),
    /// A complete styled HTML design
    Html(String),
    /// An image to insert into the body
    Image(MarkdownImage),
    /// A prompt for the image generator when the reply held no image
    ImageSuggestion(String),
}

/// Something the UI should reflect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposerEvent {
    /// A chat message was added to the history
    Message {
        /// Author
        role: Role,
        /// Markdown-ish text
        text: String,
    },
    /// A generation request started
    Generating(String),
    /// A choice menu
    Menu(Menu),
    /// Subject candidates from the guided workflow
    SubjectOptions(Vec<SubjectOption>),
    /// Parsed free-chat content
    Offer(Offer),
    /// A generated image awaiting review
    ImagePreview(GeneratedImage),
    /// A draft field changed and should be highlighted
    FieldUpdated(Field),
    /// The last request failed and can be re-sent
    RetryAvailable,
}

impl ComposerEvent {
    /// Assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Message {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    /// User message
    pub fn user(text: impl Into<String>) -> Self {
        Self::Message {
            role: Role::User,
            text: text.into(),
        }
    }
}
