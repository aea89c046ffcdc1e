//! Theme restyling system prompt

use crate::composer::types::ThemeStyle;

/// Generates the system prompt that restyles `current_html` for `theme`
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::ThemeStyle;
/// use campaign_composer::prompts::theme_prompt::generate_theme_prompt;
///
/// let prompt = generate_theme_prompt(ThemeStyle::Dark, "<p>Hi</p>");
/// assert!(prompt.ends_with("<p>Hi</p>"));
/// ```
pub fn generate_theme_prompt(theme: ThemeStyle, current_html: &str) -> String {
    format!(
        r#"You are an expert Email Designer.

Task: Rewrite the following HTML email to match the requested THEME.
Theme Instruction: {instruction}
Key Constraints:
1. Keep the same text content, just change styles (colors, fonts, spacing, borders).
2. Output valid HTML with inline CSS.
3. Return ONLY the HTML.

Current HTML:
{html}"#,
        instruction = theme.instruction(),
        html = current_html,
    )
}

/// User message accompanying the theme prompt
pub fn theme_request_message(theme: ThemeStyle) -> String {
    format!("Apply theme: {}", theme.key())
}
