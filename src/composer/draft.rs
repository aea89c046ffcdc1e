//! The email being authored and the payloads handed to delivery
//!
//! Validation happens here, before any network call: recipients, content
//! and schedule are checked when a send, schedule or test request is built.

use crate::error::{ComposerError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format of `schedule_datetime`
pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Email section the draft belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Timed or sequence emails
    Timed,
    /// Store transaction emails
    Store,
    /// Community notifications
    Community,
    /// Rewards and points emails
    Rewards,
    /// Proposal emails, sent to explicit recipients
    Proposals,
    /// Anything else
    #[default]
    General,
}

impl Section {
    /// Parse a section from its key
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::composer::Section;
    ///
    /// assert_eq!(Section::parse_str("store").unwrap(), Section::Store);
    /// assert!(Section::parse_str("billing").is_err());
    /// ```
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "timed" => Ok(Self::Timed),
            "store" => Ok(Self::Store),
            "community" => Ok(Self::Community),
            "rewards" => Ok(Self::Rewards),
            "proposals" => Ok(Self::Proposals),
            "general" => Ok(Self::General),
            other => Err(format!("Unknown email section: {}", other)),
        }
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Timed => "timed",
            Self::Store => "store",
            Self::Community => "community",
            Self::Rewards => "rewards",
            Self::Proposals => "proposals",
            Self::General => "general",
        }
    }

    /// Human label for the kind of email
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Timed => "Timed Email",
            Self::Store => "Transaction Email",
            Self::Community => "Community Email",
            Self::Rewards => "Rewards Email",
            Self::Proposals => "Proposal Email",
            Self::General => "Email",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Immediate or scheduled delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMode {
    /// Send now
    #[default]
    Immediate,
    /// Send at `schedule_at`
    Schedule,
}

/// A recipient address with display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Email address
    pub email: String,
    /// Display name, defaults to the address
    pub name: String,
}

/// The in-progress email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Section
    pub section: Section,
    /// Display label
    pub label: String,
    /// Subject field
    pub subject: String,
    /// Preheader field
    pub preheader: String,
    /// HTML body
    pub html: String,
    /// Recipients for direct sends
    pub recipients: Vec<Recipient>,
    /// Delivery mode
    pub send_mode: SendMode,
    /// Scheduled time, required when `send_mode` is `Schedule`
    pub schedule_at: Option<NaiveDateTime>,
    /// Identifier of the row this draft edits, if any
    pub external_id: Option<String>,
}

impl Draft {
    /// Creates an empty draft for a section
    pub fn new(section: Section, label: impl Into<String>) -> Self {
        Self {
            section,
            label: label.into(),
            ..Self::default()
        }
    }

    /// Adds a recipient
    ///
    /// Returns `Ok(false)` if the address is already present.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` if the address has no `@`
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::composer::{Draft, Section};
    ///
    /// let mut draft = Draft::new(Section::Proposals, "Q3");
    /// assert!(draft.add_recipient("ana@example.com", None).unwrap());
    /// assert!(!draft.add_recipient("ANA@example.com", None).unwrap());
    /// assert!(draft.add_recipient("nope", None).is_err());
    /// ```
    pub fn add_recipient(&mut self, email: &str, name: Option<&str>) -> Result<bool> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(
                ComposerError::Validation(format!("Invalid email address: {}", email)).into(),
            );
        }
        if self
            .recipients
            .iter()
            .any(|r| r.email.eq_ignore_ascii_case(email))
        {
            return Ok(false);
        }
        self.recipients.push(Recipient {
            email: email.to_string(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(email)
                .to_string(),
        });
        Ok(true)
    }

    /// Removes a recipient by address; returns true if one was removed
    pub fn remove_recipient(&mut self, email: &str) -> bool {
        let before = self.recipients.len();
        self.recipients
            .retain(|r| !r.email.eq_ignore_ascii_case(email.trim()));
        self.recipients.len() != before
    }

    /// Switches to immediate delivery
    pub fn send_now(&mut self) {
        self.send_mode = SendMode::Immediate;
        self.schedule_at = None;
    }

    /// Switches to scheduled delivery
    pub fn schedule(&mut self, at: NaiveDateTime) {
        self.send_mode = SendMode::Schedule;
        self.schedule_at = Some(at);
    }

    fn has_content(&self) -> bool {
        !self.subject.trim().is_empty() || !self.html.trim().is_empty()
    }

    /// Builds the send/schedule payload
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` when there are no recipients,
    /// neither subject nor body, or a schedule without a time
    pub fn send_request(&self) -> Result<SendRequest> {
        if self.recipients.is_empty() {
            return Err(
                ComposerError::Validation("Please add at least one recipient.".to_string()).into(),
            );
        }
        if !self.has_content() {
            return Err(ComposerError::Validation(
                "Please add subject and body content.".to_string(),
            )
            .into());
        }

        let schedule_datetime = match self.send_mode {
            SendMode::Immediate => None,
            SendMode::Schedule => match self.schedule_at {
                Some(at) => Some(at.format(SCHEDULE_FORMAT).to_string()),
                None => {
                    return Err(ComposerError::Validation(
                        "Please select a date and time for scheduling.".to_string(),
                    )
                    .into())
                }
            },
        };

        Ok(SendRequest {
            recipients: self.recipients.iter().map(|r| r.email.clone()).collect(),
            subject: self.subject.clone(),
            body: self.html.clone(),
            preheader: self.preheader.clone(),
            mode: self.send_mode,
            schedule_datetime,
        })
    }

    /// Builds the test-send payload for `to`
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` for an address without `@` or a
    /// draft with neither subject nor body
    pub fn test_request(&self, to: &str) -> Result<TestSendRequest> {
        let to = to.trim();
        if to.is_empty() || !to.contains('@') {
            return Err(ComposerError::Validation(
                "Please enter a valid email address.".to_string(),
            )
            .into());
        }
        if !self.has_content() {
            return Err(ComposerError::Validation(
                "Please add subject and body content first.".to_string(),
            )
            .into());
        }
        Ok(TestSendRequest {
            to: to.to_string(),
            subject: self.subject.clone(),
            body: self.html.clone(),
            preheader: self.preheader.clone(),
        })
    }

    /// Snapshot handed to the draft sink on save
    pub fn saved(&self) -> SavedDraft {
        SavedDraft {
            section: self.section,
            subject: self.subject.clone(),
            preheader: self.preheader.clone(),
            html: self.html.clone(),
            id: self.external_id.clone(),
        }
    }
}

/// Parses `YYYY-MM-DD` and `HH:MM` into a schedule time
///
/// # Errors
///
/// Returns `ComposerError::Validation` when either part is missing or
/// malformed
pub fn parse_schedule(date: &str, time: &str) -> Result<NaiveDateTime> {
    if date.trim().is_empty() || time.trim().is_empty() {
        return Err(ComposerError::Validation(
            "Please select a date and time for scheduling.".to_string(),
        )
        .into());
    }
    let joined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&joined, SCHEDULE_FORMAT).map_err(|e| {
        ComposerError::Validation(format!("Invalid schedule '{}': {}", joined, e)).into()
    })
}

/// Payload posted to the send/schedule service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Recipient addresses
    pub recipients: Vec<String>,
    /// Subject
    pub subject: String,
    /// HTML body
    pub body: String,
    /// Preheader
    pub preheader: String,
    /// Delivery mode
    pub mode: SendMode,
    /// `YYYY-MM-DD HH:MM`, present only for scheduled sends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_datetime: Option<String>,
}

/// Payload posted to the test-send service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSendRequest {
    /// Test address
    pub to: String,
    /// Subject
    pub subject: String,
    /// HTML body
    pub body: String,
    /// Preheader
    pub preheader: String,
}

/// Finished draft emitted on save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDraft {
    /// Section
    pub section: Section,
    /// Subject
    pub subject: String,
    /// Preheader
    pub preheader: String,
    /// HTML body
    pub html: String,
    /// Identifier of the edited row
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ready_draft() -> Draft {
        let mut draft = Draft::new(Section::Proposals, "Offer");
        draft.subject = "Hello".to_string();
        draft.html = "<p>Body</p>".to_string();
        draft.add_recipient("a@example.com", Some("Ana")).unwrap();
        draft
    }

    fn validation_message(err: anyhow::Error) -> String {
        match err.downcast_ref::<ComposerError>() {
            Some(ComposerError::Validation(msg)) => msg.clone(),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_recipient_name_defaults_to_email() {
        let mut draft = Draft::default();
        draft.add_recipient(" bo@example.com ", Some("  ")).unwrap();
        assert_eq!(draft.recipients[0].email, "bo@example.com");
        assert_eq!(draft.recipients[0].name, "bo@example.com");
    }

    #[test]
    fn test_remove_recipient() {
        let mut draft = ready_draft();
        assert!(draft.remove_recipient("A@EXAMPLE.COM"));
        assert!(!draft.remove_recipient("a@example.com"));
        assert!(draft.recipients.is_empty());
    }

    #[test]
    fn test_send_requires_recipients() {
        let mut draft = ready_draft();
        draft.recipients.clear();
        let err = draft.send_request().unwrap_err();
        assert_eq!(validation_message(err), "Please add at least one recipient.");
    }

    #[test]
    fn test_send_requires_subject_or_body() {
        let mut draft = ready_draft();
        draft.subject.clear();
        draft.html = "   ".to_string();
        let err = draft.send_request().unwrap_err();
        assert_eq!(validation_message(err), "Please add subject and body content.");

        draft.subject = "Only subject".to_string();
        assert!(draft.send_request().is_ok());
    }

    #[test]
    fn test_schedule_requires_time() {
        let mut draft = ready_draft();
        draft.send_mode = SendMode::Schedule;
        let err = draft.send_request().unwrap_err();
        assert_eq!(
            validation_message(err),
            "Please select a date and time for scheduling."
        );
    }

    #[test]
    fn test_scheduled_payload() {
        let mut draft = ready_draft();
        let at = NaiveDate::from_ymd_opt(2026, 11, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        draft.schedule(at);
        let request = draft.send_request().unwrap();
        assert_eq!(request.mode, SendMode::Schedule);
        assert_eq!(request.schedule_datetime.as_deref(), Some("2026-11-02 09:30"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["mode"], "schedule");
        assert_eq!(value["recipients"][0], "a@example.com");
    }

    #[test]
    fn test_immediate_payload_omits_schedule() {
        let request = ready_draft().send_request().unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["mode"], "immediate");
        assert!(value.get("schedule_datetime").is_none());
        assert_eq!(value["body"], "<p>Body</p>");
    }

    #[test]
    fn test_send_now_clears_schedule() {
        let mut draft = ready_draft();
        draft.schedule(parse_schedule("2026-01-01", "10:00").unwrap());
        draft.send_now();
        assert!(draft.schedule_at.is_none());
        assert_eq!(draft.send_mode, SendMode::Immediate);
    }

    #[test]
    fn test_test_request_validation() {
        let draft = ready_draft();
        assert!(draft.test_request("invalid").is_err());
        let request = draft.test_request("qa@example.com").unwrap();
        assert_eq!(request.to, "qa@example.com");

        let empty = Draft::default();
        let err = empty.test_request("qa@example.com").unwrap_err();
        assert_eq!(
            validation_message(err),
            "Please add subject and body content first."
        );
    }

    #[test]
    fn test_parse_schedule() {
        let at = parse_schedule("2026-12-24", "18:05").unwrap();
        assert_eq!(at.format(SCHEDULE_FORMAT).to_string(), "2026-12-24 18:05");
        assert!(parse_schedule("", "18:05").is_err());
        assert!(parse_schedule("24/12/2026", "18:05").is_err());
    }

    #[test]
    fn test_saved_draft_shape() {
        let mut draft = ready_draft();
        draft.external_id = Some("row-7".to_string());
        let value = serde_json::to_value(draft.saved()).unwrap();
        assert_eq!(value["section"], "proposals");
        assert_eq!(value["_id"], "row-7");
        assert_eq!(value["html"], "<p>Body</p>");
    }
}
