//! Guided campaign composition
//!
//! The composer walks a user from campaign type to a finished, styled
//! draft:
//!
//! - `session`: the state machine, one instance per open composer
//! - `driver`: async execution of the session's generation requests
//! - `state`: conversation and workflow state
//! - `draft`: the email being authored and its delivery payloads
//! - `intent`: free-chat intent classification
//! - `extract`: parsers for semi-structured AI replies
//! - `fallback`: deterministic content used when parsing fails
//! - `messages`: canned assistant text
//! - `event`/`action`: the session's inputs and outputs

pub mod action;
pub mod draft;
pub mod driver;
pub mod event;
pub mod extract;
pub mod fallback;
pub mod intent;
pub mod messages;
pub mod session;
pub mod state;
pub mod types;

pub use action::{Action, GenerationRequest, GenerationResponse, Purpose, RequestKind};
pub use draft::{
    parse_schedule, Draft, Recipient, SavedDraft, Section, SendMode, SendRequest,
    TestSendRequest,
};
pub use driver::Composer;
pub use event::{ComposerEvent, Field, Menu, Offer};
pub use intent::{IntentClassifier, KeywordClassifier};
pub use session::{ComposerSession, Transition};
pub use state::{
    ChatMessage, ConversationState, PendingOptions, Phase, Role, SubjectOption, WorkflowState,
    WorkflowStep,
};
pub use types::{AudienceType, CampaignType, Hook, Intent, Modifier, QuickAction, ThemeStyle};
