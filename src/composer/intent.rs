//! Free-chat intent classification
//!
//! Classifiers map a user message to one of the fixed authoring intents.
//! The keyword classifier checks each category in priority order and
//! falls back to the current conversation phase.

use crate::composer::state::Phase;
use crate::composer::types::Intent;
use regex::Regex;

/// Classifies free text into an authoring intent
pub trait IntentClassifier: Send + Sync {
    /// Returns the intent of `text` given the current conversation phase
    fn classify(&self, text: &str, phase: Phase) -> Intent;
}

/// Keyword/regex based classifier
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::{Intent, IntentClassifier, KeywordClassifier, Phase};
///
/// let classifier = KeywordClassifier::new();
/// assert_eq!(classifier.classify("Add HTML styling please", Phase::Initial), Intent::Styling);
/// assert_eq!(classifier.classify("hmm", Phase::Body), Intent::Body);
/// ```
#[derive(Debug)]
pub struct KeywordClassifier {
    rules: Vec<(Intent, Vec<Regex>)>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    /// Builds the classifier with the standard keyword rules
    pub fn new() -> Self {
        let rules: Vec<(Intent, Vec<&str>)> = vec![
            (
                Intent::Styling,
                vec![
                    r"\b(html|format|responsive)\b",
                    r"add (html|styling|design|formatting)",
                    r"make it (pretty|formatted)",
                    r"apply (html|styling|design)",
                    r"brand colors?\b",
                ],
            ),
            (Intent::Subject, vec![r"subject|headline|title"]),
            (
                Intent::Body,
                vec![r"body|content|copy|write|paragraph|message|text"],
            ),
            (Intent::Image, vec![r"image|picture|photo|visual|graphic"]),
            (Intent::Improve, vec![r"improve|better|enhance|refine|polish"]),
        ];

        let rules = rules
            .into_iter()
            .map(|(intent, patterns)| {
                let compiled = patterns
                    .into_iter()
                    .map(|p| Regex::new(p).expect("Invalid intent pattern"))
                    .collect();
                (intent, compiled)
            })
            .collect();

        Self { rules }
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str, phase: Phase) -> Intent {
        let lower = text.to_lowercase();

        for (intent, patterns) in &self.rules {
            if patterns.iter().any(|re| re.is_match(&lower)) {
                return *intent;
            }
        }

        match phase {
            Phase::Subject => Intent::Subject,
            Phase::Body => Intent::Body,
            Phase::Styling => Intent::Styling,
            Phase::Initial | Phase::Review => Intent::General,
        }
    }
}
