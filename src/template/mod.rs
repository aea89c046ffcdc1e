//! Saved templates and the shared theme
//!
//! Templates are named HTML bodies; saving under an existing name
//! replaces it. One template may be marked active. The theme is a single
//! flat settings object, see [`theme`].

pub mod theme;

pub use theme::{is_hex_color, SettingKind, Theme};

use crate::error::{ComposerError, Result};
use serde::{Deserialize, Serialize};

/// A named email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique name
    pub name: String,
    /// HTML body
    pub html: String,
}

impl Template {
    /// Creates a template, trimming the name
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` when the name is blank
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::template::Template;
    ///
    /// let template = Template::new("  welcome ", "<p>Hi</p>").unwrap();
    /// assert_eq!(template.name, "welcome");
    /// assert!(Template::new("   ", "<p>Hi</p>").is_err());
    /// ```
    pub fn new(name: impl AsRef<str>, html: impl Into<String>) -> Result<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ComposerError::Validation("Name required".to_string()).into());
        }
        Ok(Self {
            name: name.to_string(),
            html: html.into(),
        })
    }
}

/// Persistence for templates and the theme
pub trait TemplateStore {
    /// Saves a template, replacing any with the same name
    fn save_template(&self, template: &Template) -> Result<()>;

    /// Deletes a template; returns false when it did not exist
    fn delete_template(&self, name: &str) -> Result<bool>;

    /// All templates, sorted by name
    fn list_templates(&self) -> Result<Vec<Template>>;

    /// Marks a template as active
    fn set_active_template(&self, name: &str) -> Result<()>;

    /// Name of the active template
    fn active_template(&self) -> Result<Option<String>>;

    /// The theme with defaults applied
    fn load_theme(&self) -> Result<Theme>;

    /// Persists the theme
    fn save_theme(&self, theme: &Theme) -> Result<()>;

    /// Removes stored theme settings
    fn reset_theme(&self) -> Result<()>;
}
