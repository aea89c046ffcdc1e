//! Deterministic fallback content
//!
//! Used whenever an AI reply cannot be parsed into the expected shape, so
//! the guided flow never stalls.

use crate::composer::state::SubjectOption;
use crate::composer::types::{CampaignType, Hook, Modifier};

/// Number of subject candidates offered at a time
pub const SUBJECT_COUNT: usize = 3;

/// Canned subject lines for a campaign type, in hook order
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{fallback, CampaignType};
///
/// let lines = fallback::subject_lines(CampaignType::FlashSale);
/// assert_eq!(lines[0], "🎁 Your exclusive discount inside");
/// ```
pub fn subject_lines(campaign: CampaignType) -> [&'static str; SUBJECT_COUNT] {
    match campaign {
        CampaignType::FlashSale => [
            "🎁 Your exclusive discount inside",
            "We've been saving this just for you...",
            "⏰ Last chance: Sale ends tonight",
        ],
        CampaignType::Newsletter => [
            "This week's top insights for you",
            "You won't believe what happened...",
            "Don't miss these updates 📬",
        ],
        _ => [
            "Something special just for you",
            "You're going to want to see this...",
            "Limited time: Don't miss out",
        ],
    }
}

/// Canned revision candidates for a modifier
///
/// Every `Shorter` line fits the 30 character limit.
pub fn revision_pool(modifier: Modifier) -> &'static [&'static str] {
    match modifier {
        Modifier::Funnier => &[
            "Our prices took a nap. Oops.",
            "Warning: may cause happy dancing",
            "We put on our fancy pants for you",
            "Plot twist: you win this round",
            "Knock knock. It's a great deal.",
            "Your inbox called. It's excited.",
        ],
        Modifier::Shorter => &[
            "Just for you",
            "Don't miss this",
            "Your perk awaits",
            "Open me",
            "Quick news",
            "Last call",
        ],
        Modifier::LessSalesy => &[
            "A quick update from our team",
            "Something we think you'll like",
            "What's new this week",
            "A note for our community",
            "Ideas worth a look",
            "Here's what we've been working on",
        ],
    }
}

/// Builds exactly three distinct subject options
///
/// Candidates are trimmed, deduplicated case-insensitively, filtered
/// against `exclude` and the modifier's constraints, then topped up from
/// the revision pool (for revisions) or the campaign set. Hooks follow
/// position order.
pub fn complete_subject_set(
    candidates: Vec<String>,
    campaign: CampaignType,
    modifier: Option<Modifier>,
    exclude: &[String],
) -> Vec<SubjectOption> {
    let mut chosen: Vec<String> = Vec::with_capacity(SUBJECT_COUNT);

    let acceptable = |text: &str, chosen: &[String]| -> bool {
        !text.is_empty()
            && modifier.map_or(true, |m| m.accepts(text))
            && !exclude.iter().any(|e| e.eq_ignore_ascii_case(text))
            && !chosen.iter().any(|c| c.eq_ignore_ascii_case(text))
    };

    for candidate in candidates {
        if chosen.len() == SUBJECT_COUNT {
            break;
        }
        let text = candidate.trim().to_string();
        if acceptable(&text, &chosen) {
            chosen.push(text);
        }
    }

    if chosen.len() < SUBJECT_COUNT {
        tracing::warn!(
            "Only {} usable subject candidates, filling from fallback",
            chosen.len()
        );
        let pool: Vec<&str> = match modifier {
            Some(m) => revision_pool(m).to_vec(),
            None => subject_lines(campaign).to_vec(),
        };
        for text in pool {
            if chosen.len() == SUBJECT_COUNT {
                break;
            }
            if acceptable(text, &chosen) {
                chosen.push(text.to_string());
            }
        }
    }

    let mut counter = 1;
    while chosen.len() < SUBJECT_COUNT {
        let text = format!("Fresh idea #{}", counter);
        counter += 1;
        if acceptable(&text, &chosen) {
            chosen.push(text);
        }
    }

    chosen
        .into_iter()
        .enumerate()
        .map(|(i, text)| SubjectOption {
            hook: Hook::for_position(i),
            text,
        })
        .collect()
}

/// Opening line for a campaign's body copy
fn intro(campaign: Option<CampaignType>) -> &'static str {
    match campaign {
        Some(CampaignType::FlashSale) => "Our flash sale is live, and it won't last long.",
        Some(CampaignType::Newsletter) => "Here's what's new and worth your time this week.",
        Some(CampaignType::Welcome) => "We're so glad you're here. Here's how to get started.",
        Some(CampaignType::ProductLaunch) => "Something new just landed, and we think you'll love it.",
        Some(CampaignType::Event) => "You're invited, and we'd love to see you there.",
        Some(CampaignType::Other) | None => "We have a quick update we think you'll like.",
    }
}

/// Splits free-text key points on newlines, commas and semicolons
pub fn split_key_points(key_points: &str) -> Vec<String> {
    key_points
        .split(['\n', ',', ';'])
        .map(|p| {
            p.trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '-' || c == '•')
                .trim()
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Button-style call-to-action link
pub fn cta_html(label: &str, color: &str) -> String {
    format!(
        "<p style=\"text-align: center;\"><a href=\"#\" style=\"display: inline-block; padding: 12px 24px; background: {}; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: 600;\">{}</a></p>",
        color,
        escape_html(label)
    )
}

/// Key-points body used when generation returns nothing usable
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{fallback, CampaignType};
///
/// let html = fallback::body_copy(Some(CampaignType::FlashSale), "Ends Friday, free shipping", "#ef5c06");
/// assert!(html.contains("<li>Ends Friday</li>"));
/// assert!(html.contains("Shop the Sale"));
/// ```
pub fn body_copy(campaign: Option<CampaignType>, key_points: &str, cta_color: &str) -> String {
    let mut html = String::from("<p>Hi [Name],</p>\n");
    html.push_str(&format!("<p>{}</p>\n", intro(campaign)));

    let points = split_key_points(key_points);
    if !points.is_empty() {
        html.push_str("<ul>\n");
        for point in points {
            html.push_str(&format!("<li>{}</li>\n", escape_html(&point)));
        }
        html.push_str("</ul>\n");
    }

    let label = campaign.unwrap_or(CampaignType::Other).cta_label();
    html.push_str(&cta_html(label, cta_color));
    html
}

/// Escapes text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
