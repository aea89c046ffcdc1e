//! Extractors for semi-structured AI replies
//!
//! Each function looks for one response shape: subject-line JSON, labeled
//! `Subject:`/`Body:` sections, HTML documents or code blocks, markdown
//! images and designer JSON actions. Extractors never fail; they return
//! `None` or an empty list when the shape is absent.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid extraction pattern"))
}

/// Parses the first `{ ... "subject_lines": [...] ... }` object in `text`
///
/// Items may be `{hook, text}` objects or bare strings; only the text is
/// kept since hooks are assigned by position. Returns `None` when no such
/// object is present or it does not parse.
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::extract::subject_lines_json;
///
/// let reply = r#"Sure! {"subject_lines": [{"hook": "Benefit", "text": "Save 30% today"}]}"#;
/// let lines = subject_lines_json(reply).unwrap();
/// assert_eq!(lines, vec!["Save 30% today"]);
/// ```
pub fn subject_lines_json(text: &str) -> Option<Vec<String>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let found = cached(&RE, r#"\{[\s\S]*"subject_lines"[\s\S]*\}"#).find(text)?;

    let value: Value = match serde_json::from_str(found.as_str()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not parse subject lines JSON: {}", e);
            return None;
        }
    };

    let items = value.get("subject_lines")?.as_array()?;
    let lines: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.clone()),
            Value::Object(map) => map.get("text").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect();

    Some(lines)
}

/// Extracts lines of the form `Subject: ...`, optionally prefixed `Option N:`
///
/// Enclosing quotes are stripped and results outside 6..=149 characters are
/// dropped.
pub fn labeled_subjects(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"(?mi)^[ \t]*(?:Option\s+\d+[:.]\s*)?Subject[:\s]+(.+)$",
    )
    .captures_iter(text)
    .filter_map(|caps| caps.get(1))
    .map(|m| strip_quotes(m.as_str().trim()).to_string())
    .filter(|s| subject_length_ok(s))
    .collect()
}

/// Returns true if the reply lists two or more numbered subjects/options
pub fn has_multiple_subjects(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"(?i)(?:Subject|Option)\s*[:\s#]*\d")
        .find_iter(text)
        .count()
        >= 2
}

/// Loose subject detection for replies that match no other shape
pub fn loose_subjects(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let mut found: Vec<String> = Vec::new();
    for caps in cached(
        &RE,
        r#"(?i)(?:Subject|Option)\s*[:\s#]*\d*[:\s]*["']?([^"'\n]{10,120})["']?"#,
    )
    .captures_iter(text)
    {
        if let Some(m) = caps.get(1) {
            let cleaned = strip_quotes(m.as_str().trim()).to_string();
            if subject_length_ok(&cleaned) && !found.contains(&cleaned) {
                found.push(cleaned);
            }
        }
    }
    found
}

fn subject_length_ok(s: &str) -> bool {
    let len = s.chars().count();
    len > 5 && len < 150
}

/// Returns true if the reply contains a `Body:` section of at least 50 chars
pub fn has_body_section(text: &str) -> bool {
    body_section_raw(text).is_some()
}

fn body_section_raw(text: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"(?i)Body[:\s]+([\s\S]{50,}?)(?:\n\n|Subject|$)")
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts the `Body:` section with code fences and quotes stripped
///
/// Returns `None` unless the cleaned body is longer than 30 characters.
pub fn body_section(text: &str) -> Option<String> {
    let raw = body_section_raw(text)?;
    let cleaned = raw.trim().replace("```", "");
    let cleaned = strip_quotes(cleaned.trim()).trim().to_string();
    (cleaned.chars().count() > 30).then_some(cleaned)
}

/// Returns true if the reply holds a full HTML document or an HTML code block
pub fn contains_html_document(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    text.contains("<!DOCTYPE") || text.contains("<html") || cached(&RE, r"(?i)```html").is_match(text)
}

/// Extracts HTML from a fenced block, or the `<...>` span of a raw document
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::extract::extract_html;
///
/// let reply = "Here you go:\n```html\n<p>Hi</p>\n```";
/// assert_eq!(extract_html(reply), Some("<p>Hi</p>".to_string()));
/// ```
pub fn extract_html(text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    if let Some(caps) = cached(&RE, r"(?i)```html?\n?([\s\S]*?)```").captures(text) {
        if let Some(m) = caps.get(1) {
            return Some(m.as_str().trim().to_string());
        }
    }

    if text.contains("<!DOCTYPE") || text.contains("<html") {
        return tag_span(text);
    }

    None
}

/// HTML offered by replies that match no other shape
///
/// Looks for `<html`, `<table` or `<!DOCTYPE`; raw spans must exceed 50
/// characters.
pub fn loose_html(text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    if !(text.contains("<html") || text.contains("<table") || text.contains("<!DOCTYPE")) {
        return None;
    }
    if let Some(caps) = cached(&RE, r"(?i)```html?\n?([\s\S]*?)```").captures(text) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }
    tag_span(text).filter(|span| span.chars().count() > 50)
}

fn tag_span(text: &str) -> Option<String> {
    let start = text.find('<')?;
    let end = text.rfind('>')?;
    (end > start).then(|| text[start..=end].to_string())
}

/// Returns true if the reply seems to be asking the user something
pub fn asks_questions(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    text.contains('?')
        || cached(
            &RE,
            r"(?i)tell me|let me know|clarify|which|what kind|option \d",
        )
        .is_match(text)
}

/// A markdown image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownImage {
    /// Alt text
    pub alt: String,
    /// Image URL
    pub url: String,
}

/// Finds the first `![alt](url)` in the reply
pub fn markdown_image(text: &str) -> Option<MarkdownImage> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let caps = cached(&RE, r"!\[([^\]]*)\]\(([^)]+)\)").captures(text)?;
    Some(MarkdownImage {
        alt: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
        url: caps.get(2)?.as_str().to_string(),
    })
}

/// Where an inserted block lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPosition {
    /// Before the current body
    Top,
    /// After the current body
    Bottom,
}

/// Structured edit returned by the designer workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailAction {
    /// Replace the whole body
    ReplaceAll {
        /// Concatenated block HTML
        html: String,
        /// Message to show the user
        chat_response: String,
    },
    /// Insert one block
    InsertBlock {
        /// Block HTML
        html: String,
        /// Placement
        position: BlockPosition,
        /// Message to show the user
        chat_response: String,
    },
    /// An action this client does not understand
    Unsupported {
        /// Action name
        action: String,
        /// Message to show the user
        chat_response: String,
    },
}

/// Parses a reply that is entirely a JSON object with an `action` key
pub fn email_action(text: &str) -> Option<EmailAction> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let action = value.get("action")?.as_str()?.to_string();
    let chat_response = value
        .get("chat_response")
        .and_then(Value::as_str)
        .unwrap_or("Updates applied.")
        .to_string();

    let parsed = match action.as_str() {
        "replace_all" => {
            let html = value
                .get("blocks")
                .and_then(Value::as_array)
                .map(|blocks| blocks.iter().filter_map(block_html).collect::<String>())
                .unwrap_or_default();
            EmailAction::ReplaceAll {
                html,
                chat_response,
            }
        }
        "insert_block" => {
            let html = value
                .get("block")
                .and_then(|b| b.pointer("/attrs/content"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let position = match value.get("position").and_then(Value::as_str) {
                Some("bottom") => BlockPosition::Bottom,
                _ => BlockPosition::Top,
            };
            EmailAction::InsertBlock {
                html,
                position,
                chat_response,
            }
        }
        _ => EmailAction::Unsupported {
            action,
            chat_response,
        },
    };

    Some(parsed)
}

fn block_html(block: &Value) -> Option<String> {
    block
        .pointer("/attrs/content")
        .or_else(|| block.get("innerHTML"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Removes markdown code fences (```` ``` ```` and ```` ```html ````)
pub fn strip_code_fences(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"```(?:html)?")
        .replace_all(text, "")
        .trim()
        .to_string()
}

/// Removes doctype, `<html>`, `<head>...</head>` and `<body>` wrappers
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::extract::strip_document_wrappers;
///
/// let html = "<html><head><title>x</title></head><body><p>Hi</p></body></html>";
/// assert_eq!(strip_document_wrappers(html), "<p>Hi</p>");
/// ```
pub fn strip_document_wrappers(html: &str) -> String {
    static HEAD: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let without_head = cached(&HEAD, r"(?is)<head\b.*?</head\s*>").replace_all(html, "");
    cached(&TAGS, r"(?i)<!DOCTYPE[^>]*>|</?(?:html|body|head)\b[^>]*>")
        .replace_all(&without_head, "")
        .trim()
        .to_string()
}

/// Returns true if the HTML contains an anchor or button-like element
pub fn has_call_to_action(html: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r#"(?i)<a\b|<button\b|role\s*=\s*["']button"#).is_match(html)
}

/// Human-readable text segments of an HTML fragment
///
/// Script and style contents are ignored, tags split segments, common
/// entities are decoded and whitespace is collapsed.
pub fn text_segments(html: &str) -> Vec<String> {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let without_code =
        cached(&SCRIPT, r"(?is)<(script|style)\b.*?</(script|style)\s*>").replace_all(html, "\n");
    let text = cached(&TAG, r"<[^>]*>").replace_all(&without_code, "\n");

    decode_entities(&text)
        .lines()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns true if every text segment of `before` still appears in `after`
///
/// Segments are matched in order against the whitespace-collapsed visible
/// text of `after`, so restyling may merge or split elements freely. Each
/// match must sit on word boundaries and starts after the previous one, so
/// a short segment such as a button label cannot be satisfied by text that
/// another segment already accounts for.
pub fn preserves_text(before: &str, after: &str) -> bool {
    let after_text = text_segments(after).join(" ");
    let mut cursor = 0;
    for segment in text_segments(before) {
        match find_word_bounded(&after_text, &segment, cursor) {
            Some(end) => cursor = end,
            None => return false,
        }
    }
    true
}

/// End offset of the first word-bounded `needle` in `haystack` at or after `from`
fn find_word_bounded(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..]
        .match_indices(needle)
        .map(|(offset, _)| from + offset)
        .find(|&start| {
            let end = start + needle.len();
            let open = haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let close = haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            open && close
        })
        .map(|start| start + needle.len())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_lines_json_embedded_in_prose() {
        let reply = r#"Here you go:
{"subject_lines": [{"hook": "Benefit", "text": "Your VIP discount is here"}, {"hook": "Mystery", "text": "We saved something for you"}, "Ends at midnight"]}
Enjoy!"#;
        let lines = subject_lines_json(reply).unwrap();
        assert_eq!(
            lines,
            vec![
                "Your VIP discount is here",
                "We saved something for you",
                "Ends at midnight"
            ]
        );
    }

    #[test]
    fn test_subject_lines_json_missing_or_broken() {
        assert!(subject_lines_json("No JSON here").is_none());
        assert!(subject_lines_json(r#"{"subject_lines": [oops}"#).is_none());
    }

    #[test]
    fn test_labeled_subjects() {
        let reply = "Option 1: Subject: \"Your exclusive deal awaits\"\nSubject: Last chance to save\nSubject: Hi";
        let subjects = labeled_subjects(reply);
        assert_eq!(
            subjects,
            vec!["Your exclusive deal awaits", "Last chance to save"]
        );
    }

    #[test]
    fn test_has_multiple_subjects() {
        assert!(has_multiple_subjects("Option 1: a\nOption 2: b"));
        assert!(!has_multiple_subjects("Option 1: only one"));
    }

    #[test]
    fn test_loose_subjects_dedupes() {
        let reply = "Subject 1: Fresh arrivals just landed\nOption 2: Fresh arrivals just landed";
        assert_eq!(loose_subjects(reply), vec!["Fresh arrivals just landed"]);
    }

    #[test]
    fn test_body_section() {
        let reply = "Subject: Hello there friend\nBody: We are thrilled to announce our biggest sale of the season with savings everywhere.\n\nCheers";
        let body = body_section(reply).unwrap();
        assert!(body.starts_with("We are thrilled"));
        assert!(!body.contains("Cheers"));
        assert!(has_body_section(reply));
    }

    #[test]
    fn test_body_section_too_short() {
        assert!(body_section("Body: tiny").is_none());
    }

    #[test]
    fn test_extract_html_code_block() {
        let reply = "```html\n<table><tr><td>Hi</td></tr></table>\n```";
        assert_eq!(
            extract_html(reply),
            Some("<table><tr><td>Hi</td></tr></table>".to_string())
        );
    }

    #[test]
    fn test_extract_html_raw_document() {
        let reply = "Sure thing: <!DOCTYPE html><html><body>Hi</body></html> enjoy";
        assert_eq!(
            extract_html(reply),
            Some("<!DOCTYPE html><html><body>Hi</body></html>".to_string())
        );
    }

    #[test]
    fn test_extract_html_absent() {
        assert!(extract_html("<p>just a fragment</p>").is_none());
        assert!(!contains_html_document("<p>just a fragment</p>"));
    }

    #[test]
    fn test_loose_html_requires_length() {
        assert!(loose_html("<table></table>").is_none());
        let long = format!("<table><tr><td>{}</td></tr></table>", "x".repeat(60));
        assert_eq!(loose_html(&long), Some(long.clone()));
    }

    #[test]
    fn test_asks_questions() {
        assert!(asks_questions("Which colors do you prefer"));
        assert!(asks_questions("Ready?"));
        assert!(asks_questions("Option 2 might suit"));
        assert!(!asks_questions("Here is your styled email."));
    }

    #[test]
    fn test_markdown_image() {
        let image = markdown_image("Try this ![Beach](https://img.test/b.png) out").unwrap();
        assert_eq!(image.alt, "Beach");
        assert_eq!(image.url, "https://img.test/b.png");
        assert!(markdown_image("no image").is_none());
    }

    #[test]
    fn test_email_action_replace_all() {
        let reply = r#"{"action": "replace_all", "chat_response": "Rebuilt it", "blocks": [{"attrs": {"content": "<p>A</p>"}}, {"innerHTML": "<p>B</p>"}]}"#;
        assert_eq!(
            email_action(reply),
            Some(EmailAction::ReplaceAll {
                html: "<p>A</p><p>B</p>".to_string(),
                chat_response: "Rebuilt it".to_string(),
            })
        );
    }

    #[test]
    fn test_email_action_insert_block_defaults() {
        let reply = r#"{"action": "insert_block", "block": {"attrs": {"content": "<p>New</p>"}}}"#;
        assert_eq!(
            email_action(reply),
            Some(EmailAction::InsertBlock {
                html: "<p>New</p>".to_string(),
                position: BlockPosition::Top,
                chat_response: "Updates applied.".to_string(),
            })
        );
    }

    #[test]
    fn test_email_action_requires_json_action() {
        assert!(email_action("plain text").is_none());
        assert!(email_action(r#"{"subject_lines": []}"#).is_none());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```html\n<p>Hi</p>\n```"), "<p>Hi</p>");
    }

    #[test]
    fn test_strip_document_wrappers() {
        let html = "<!DOCTYPE html>\n<html lang=\"en\"><head><style>p{}</style></head><BODY class=\"x\"><p>Hi [Name]</p></BODY></html>";
        let stripped = strip_document_wrappers(html);
        assert_eq!(stripped, "<p>Hi [Name]</p>");
    }

    #[test]
    fn test_has_call_to_action() {
        assert!(has_call_to_action("<a href=\"#\">Shop</a>"));
        assert!(has_call_to_action("<button>Go</button>"));
        assert!(has_call_to_action("<div role='button'>Go</div>"));
        assert!(!has_call_to_action("<p>No action</p>"));
        assert!(!has_call_to_action("<abbr>x</abbr>"));
    }

    #[test]
    fn test_text_segments() {
        let html = "<p>Hello&nbsp;<strong>World</strong></p><style>p{color:red}</style><p>  Shop   now </p>";
        assert_eq!(text_segments(html), vec!["Hello", "World", "Shop now"]);
    }

    #[test]
    fn test_preserves_text_allows_restructuring() {
        let before = "<p>Hello <strong>World</strong></p><p>Shop now</p>";
        let after = "<div style=\"color:#000\"><p style=\"font-size:16px\">Hello World</p><a href=\"#\">Shop now</a></div>";
        assert!(preserves_text(before, after));
    }

    #[test]
    fn test_preserves_text_detects_loss() {
        let before = "<p>Hello</p><p>Ends Friday</p>";
        let after = "<p style=\"color:red\">Hello</p>";
        assert!(!preserves_text(before, after));
    }

    #[test]
    fn test_preserves_text_requires_whole_segments() {
        let before = "<p>Shop the sale today</p><a href=\"#\">Shop</a>";
        let dropped_button = "<p style=\"color:#fff\">Shop the sale today</p>";
        let kept_button =
            "<p style=\"color:#fff\">Shop the sale today</p><a style=\"padding:12px\" href=\"#\">Shop</a>";
        assert!(!preserves_text(before, dropped_button));
        assert!(preserves_text(before, kept_button));

        // Partial words do not count
        assert!(!preserves_text("<p>sale</p>", "<p>Wholesale prices</p>"));
    }
}
