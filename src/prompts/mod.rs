//! System prompts and canned request messages
//!
//! Each guided step sends a role-specific system instruction as
//! `system_prompt_override` together with a short user message.

pub mod body_prompt;
pub mod quick_action_prompt;
pub mod subject_prompt;
pub mod theme_prompt;

pub use body_prompt::{body_request_message, generate_body_prompt};
pub use quick_action_prompt::quick_action_message;
pub use subject_prompt::{
    generate_revision_prompt, generate_subject_prompt, revision_request_message,
    subject_request_message,
};
pub use theme_prompt::{generate_theme_prompt, theme_request_message};
