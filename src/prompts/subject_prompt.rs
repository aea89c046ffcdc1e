//! Subject-line system prompts
//!
//! Initial generation asks for three candidates, one per hook; revision
//! asks for three new candidates shaped by a modifier and forbids reuse of
//! the previous wording.

use crate::composer::types::{AudienceType, CampaignType, Modifier};

/// Generates the system prompt for initial subject lines
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{AudienceType, CampaignType};
/// use campaign_composer::prompts::subject_prompt::generate_subject_prompt;
///
/// let prompt = generate_subject_prompt(CampaignType::FlashSale, AudienceType::Vip);
/// assert!(prompt.contains("Flash Sale"));
/// assert!(prompt.contains("VIP loyal customers"));
/// ```
pub fn generate_subject_prompt(campaign: CampaignType, audience: AudienceType) -> String {
    format!(
        r#"You are an Expert Email Copywriter and Campaign Architect.

Context: The user is creating a {campaign} for {audience}.

Task: Generate exactly 3 distinct subject lines using these psychological hooks:
1. Benefit-Driven (What's in it for them?)
2. Curiosity-Driven (Open loop that makes them want to know more)
3. Urgency/Scarcity (FOMO, limited time)

CRITICAL: You MUST respond with ONLY a valid JSON object in this exact format, no other text:
{{"subject_lines": [{{"hook": "Benefit", "text": "..."}}, {{"hook": "Mystery", "text": "..."}}, {{"hook": "Urgency", "text": "..."}}]}}"#,
        campaign = campaign.prompt_label(),
        audience = audience.prompt_label(),
    )
}

/// User message accompanying the initial subject prompt
pub fn subject_request_message(campaign: CampaignType, audience: AudienceType) -> String {
    format!(
        "Generate 3 subject lines for my {} targeting {}",
        campaign.prompt_label(),
        audience.prompt_label()
    )
}

/// Generates the system prompt for a subject-line revision
///
/// # Arguments
///
/// * `previous` - Every candidate shown so far
/// * `modifier` - Requested revision
/// * `campaign` - Campaign type
/// * `audience` - Audience
pub fn generate_revision_prompt(
    previous: &[String],
    modifier: Modifier,
    campaign: CampaignType,
    audience: AudienceType,
) -> String {
    format!(
        r#"You are a Senior Copywriter.

CONTEXT:
- Previous Options: {previous}
- User Feedback: {feedback}
- Campaign Type: {campaign}
- Target Audience: {audience}

INSTRUCTIONS:
1. Generate 3 NEW subject lines that strictly adhere to the user's feedback.
2. Do NOT recycle words from the previous rejected options.

MODIFIER LOGIC:
- funnier: Use puns, pop culture references, or playful unexpectedness.
- shorter: Strict {limit}-character limit. Punchy 2-3 word phrases.
- less_salesy: Remove exclamation points, remove words like 'Buy'/'Sale', focus on value/news.

CRITICAL: Respond with ONLY valid JSON in this format:
{{"subject_lines": [{{"hook": "...", "text": "..."}}, {{"hook": "...", "text": "..."}}, {{"hook": "...", "text": "..."}}]}}"#,
        previous = previous.join(", "),
        feedback = modifier.label(),
        campaign = campaign.key(),
        audience = audience.key(),
        limit = Modifier::SHORT_LIMIT,
    )
}

/// User message accompanying a revision prompt
pub fn revision_request_message(modifier: Modifier) -> String {
    format!("Revise the subject lines: {}", modifier.label())
}
