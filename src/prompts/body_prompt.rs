//! Body-copy system prompt

use crate::composer::types::{AudienceType, CampaignType};

/// Generates the system prompt for body copy
///
/// The prompt forbids document wrappers, asks for a campaign-matched
/// tone, short paragraphs, one call to action and `[Name]` placeholders.
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{AudienceType, CampaignType};
/// use campaign_composer::prompts::body_prompt::generate_body_prompt;
///
/// let prompt = generate_body_prompt(
///     Some(CampaignType::FlashSale),
///     Some(AudienceType::Vip),
///     Some("Last chance"),
///     "Ends Friday",
/// );
/// assert!(prompt.contains("Key Points to Cover: Ends Friday"));
/// ```
pub fn generate_body_prompt(
    campaign: Option<CampaignType>,
    audience: Option<AudienceType>,
    subject: Option<&str>,
    key_points: &str,
) -> String {
    let tone = campaign.map(|c| c.tone()).unwrap_or("clear and friendly");

    format!(
        r#"You are an Expert Email Copywriter.

CONTEXT:
- Campaign Type: {campaign}
- Audience: {audience}
- Subject Line: {subject}
- Key Points to Cover: {key_points}

INSTRUCTIONS:
1. Write the full email body copy in standard HTML format (paragraphs, bolding, lists).
2. Do NOT include <html>, <head>, or <body> tags, just the inner content.
3. Use a tone appropriate for the campaign type. For this email the tone is {tone}.
4. Keep paragraphs short (1-2 sentences) for readability.
5. Include a clear Call to Action (CTA) at the end as a link or button.
6. Use placeholders like [Name] where appropriate.

CRITICAL: Return ONLY the HTML content, nothing else."#,
        campaign = campaign.map(|c| c.key()).unwrap_or("email"),
        audience = audience.map(|a| a.key()).unwrap_or("subscribers"),
        subject = subject.unwrap_or(""),
        key_points = key_points,
        tone = tone,
    )
}

/// User message accompanying the body prompt
pub fn body_request_message(key_points: &str) -> String {
    format!("Generate email body copy for: {}", key_points)
}
