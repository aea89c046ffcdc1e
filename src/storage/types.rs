use crate::composer::draft::{SavedDraft, Section};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A draft row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDraft {
    /// Unique identifier for the draft
    pub id: String,
    /// Email section
    pub section: Section,
    /// Subject line
    pub subject: String,
    /// Preheader text
    pub preheader: String,
    /// HTML body
    pub html: String,
    /// When the draft was last saved
    pub saved_at: DateTime<Utc>,
}

impl StoredDraft {
    /// Converts back into the shape the composer emits
    pub fn to_saved(&self) -> SavedDraft {
        SavedDraft {
            section: self.section,
            subject: self.subject.clone(),
            preheader: self.preheader.clone(),
            html: self.html.clone(),
            id: Some(self.id.clone()),
        }
    }
}
