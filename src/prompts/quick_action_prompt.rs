//! Canned messages behind the quick-action shortcuts
//!
//! Quick actions are sent as ordinary chat messages, so the reply goes
//! through the same intent detection and parsing as typed text.

use crate::composer::draft::Section;
use crate::composer::types::QuickAction;
use crate::providers::BrandContext;

/// Builds the chat message for a quick action
///
/// # Arguments
///
/// * `action` - Quick action
/// * `section` - Email section being edited
/// * `subject` - Current subject field
/// * `brand` - Brand colors for HTML generation
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{QuickAction, Section};
/// use campaign_composer::prompts::quick_action_prompt::quick_action_message;
/// use campaign_composer::providers::BrandContext;
///
/// let message = quick_action_message(QuickAction::GenerateCopy, Section::Store, "", &BrandContext::default());
/// assert!(message.contains("Transaction Email"));
/// ```
pub fn quick_action_message(
    action: QuickAction,
    section: Section,
    subject: &str,
    brand: &BrandContext,
) -> String {
    match action {
        QuickAction::GenerateCopy => format!(
            "Write an engaging email for this {}. Make it compelling and professional.",
            section.type_label()
        ),
        QuickAction::GenerateHtml => format!(
            "Create a complete, responsive HTML email template with inline styles. \
             Use my brand colors: primary {} and secondary {}. \
             Include proper HTML structure with DOCTYPE, head, and body tags. Make it mobile-responsive.",
            brand.primary_color, brand.secondary_color
        ),
        QuickAction::Improve => format!(
            "Please review and improve the current email copy. Here is the current subject: \"{}\" and body content.",
            subject
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand() -> BrandContext {
        BrandContext {
            site_name: "Acme".to_string(),
            logo_url: String::new(),
            primary_color: "#6366f1".to_string(),
            secondary_color: "#22d3ee".to_string(),
        }
    }

    #[test]
    fn test_generate_html_uses_brand_colors() {
        let message = quick_action_message(QuickAction::GenerateHtml, Section::General, "", &brand());
        assert!(message.contains("primary #6366f1"));
        assert!(message.contains("secondary #22d3ee"));
        assert!(message.contains("DOCTYPE"));
    }

    #[test]
    fn test_improve_quotes_subject() {
        let message = quick_action_message(QuickAction::Improve, Section::General, "Hello", &brand());
        assert!(message.contains("current subject: \"Hello\""));
    }

    #[test]
    fn test_generate_copy_general_section() {
        let message = quick_action_message(QuickAction::GenerateCopy, Section::General, "", &brand());
        assert!(message.starts_with("Write an engaging email for this Email."));
    }
}
