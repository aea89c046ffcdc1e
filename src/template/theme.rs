//! Shared visual theme
//!
//! The theme is a flat settings object: typography per text level,
//! container colors, header and footer images, and the footer column
//! layout. Stored values are merged over the defaults, so a partially
//! saved theme always reads back complete.

use crate::error::{ComposerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text levels with their own typography
pub const TEXT_LEVELS: [&str; 7] = ["paragraph", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Fonts offered by the theme editor
pub const FONTS: [&str; 8] = [
    "sans-serif",
    "serif",
    "Comic Sans MS",
    "Garamond",
    "Georgia",
    "Tahoma",
    "Trebuchet MS",
    "Verdana",
];

/// Kind of value a setting holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// `#rgb` or `#rrggbb`
    Color,
    /// Non-negative integer
    Number,
    /// left, center or right
    Align,
    /// Empty or `1`
    Flag,
    /// One of [`FONTS`]
    Font,
    /// 1 or 2
    Columns,
    /// Free text, including URLs
    Text,
}

impl SettingKind {
    /// Kind of a known setting key
    pub fn of(key: &str) -> Option<Self> {
        if !Theme::defaults().contains_key(key) {
            return None;
        }
        let kind = if key == "footer_columns" {
            Self::Columns
        } else if key == "link_weight" {
            Self::Number
        } else if key.ends_with("_color") || key.ends_with("_bg") || key.ends_with("_copy") {
            Self::Color
        } else if key.ends_with("_size")
            || key.ends_with("_height")
            || key.ends_with("_width")
            || key.ends_with("_space")
            || key.ends_with("_pad")
            || key.ends_with("_radius")
        {
            Self::Number
        } else if key.ends_with("_align") {
            Self::Align
        } else if key.ends_with("_bold") || key.ends_with("_italic") || key.ends_with("_underline")
        {
            Self::Flag
        } else if key.ends_with("_font") {
            Self::Font
        } else {
            Self::Text
        };
        Some(kind)
    }

    /// Checks a value against this kind
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Color => is_hex_color(value),
            Self::Number => !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()),
            Self::Align => matches!(value, "left" | "center" | "right"),
            Self::Flag => matches!(value, "" | "1"),
            Self::Font => FONTS.contains(&value),
            Self::Columns => matches!(value, "1" | "2"),
            Self::Text => true,
        }
    }
}

/// Returns true for `#rgb` and `#rrggbb`
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .map(|hex| (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

/// The singleton theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    settings: BTreeMap<String, String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            settings: Self::defaults(),
        }
    }
}

impl Theme {
    /// Every known setting with its default value
    pub fn defaults() -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = [
            ("container_bg", "#ffffff"),
            ("copy_bg", "#f7f7f7"),
            ("body_color", "#0f1724"),
            ("link_color", "#ef5c06"),
            ("link_weight", "600"),
            ("header_url", ""),
            ("header_height", "120"),
            ("header_width", "600"),
            ("header_space", "24"),
            ("header_link", ""),
            ("header_align", "center"),
            ("footer_url", ""),
            ("footer_height", "80"),
            ("footer_width", "260"),
            ("footer_space", "16"),
            ("footer_link", ""),
            ("footer_text", ""),
            ("footer_columns", "2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        // (color, size, bold) per level
        let levels: [(&str, &str, &str, &str); 7] = [
            ("paragraph", "#0f1724", "14", ""),
            ("h1", "#0f1724", "28", "1"),
            ("h2", "#ef5c06", "24", "1"),
            ("h3", "#0f1724", "20", "1"),
            ("h4", "#0f1724", "18", ""),
            ("h5", "#0f1724", "16", ""),
            ("h6", "#0f1724", "14", ""),
        ];
        for (level, color, size, bold) in levels {
            map.insert(format!("{}_font", level), "sans-serif".to_string());
            map.insert(format!("{}_color", level), color.to_string());
            map.insert(format!("{}_size", level), size.to_string());
            map.insert(format!("{}_bold", level), bold.to_string());
            map.insert(format!("{}_italic", level), String::new());
            map.insert(format!("{}_underline", level), String::new());
            map.insert(format!("{}_align", level), "left".to_string());
        }

        for col in ["col1", "col2"] {
            map.insert(format!("footer_{}_bg", col), "#ffffff".to_string());
            map.insert(format!("footer_{}_copy", col), "#f7f7f7".to_string());
            map.insert(format!("footer_{}_bg_pad", col), "10".to_string());
            map.insert(format!("footer_{}_bg_radius", col), "10".to_string());
            map.insert(format!("footer_{}_copy_radius", col), "6".to_string());
        }

        map
    }

    /// Builds a theme from stored values merged over the defaults
    ///
    /// Unknown keys are kept as-is so settings written by newer editors
    /// survive a round trip.
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::template::Theme;
    /// use std::collections::BTreeMap;
    ///
    /// let mut stored = BTreeMap::new();
    /// stored.insert("link_color".to_string(), "#112233".to_string());
    /// let theme = Theme::from_stored(stored);
    /// assert_eq!(theme.get("link_color"), Some("#112233"));
    /// assert_eq!(theme.get("container_bg"), Some("#ffffff"));
    /// ```
    pub fn from_stored(stored: BTreeMap<String, String>) -> Self {
        let mut settings = Self::defaults();
        settings.extend(stored);
        Self { settings }
    }

    /// Value of a setting
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// All settings, sorted by key
    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.settings
    }

    /// Settings that differ from the defaults
    pub fn overrides(&self) -> BTreeMap<String, String> {
        let defaults = Self::defaults();
        self.settings
            .iter()
            .filter(|(k, v)| defaults.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Changes one setting
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` for an unknown key or a value
    /// that does not fit the setting's kind
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim();
        let value = value.trim();
        let kind = SettingKind::of(key).ok_or_else(|| {
            ComposerError::Validation(format!("Unknown theme setting: {}", key))
        })?;
        if !kind.accepts(value) {
            return Err(ComposerError::Validation(format!(
                "Invalid value '{}' for {} ({:?})",
                value, key, kind
            ))
            .into());
        }
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_level() {
        let defaults = Theme::defaults();
        for level in TEXT_LEVELS {
            for suffix in ["font", "color", "size", "bold", "italic", "underline", "align"] {
                assert!(
                    defaults.contains_key(&format!("{}_{}", level, suffix)),
                    "missing {}_{}",
                    level,
                    suffix
                );
            }
        }
        assert_eq!(defaults["h2_color"], "#ef5c06");
        assert_eq!(defaults["h1_bold"], "1");
    }

    #[test]
    fn test_setting_kinds() {
        assert_eq!(SettingKind::of("h1_color"), Some(SettingKind::Color));
        assert_eq!(SettingKind::of("footer_col1_copy"), Some(SettingKind::Color));
        assert_eq!(SettingKind::of("footer_col2_bg_radius"), Some(SettingKind::Number));
        assert_eq!(SettingKind::of("header_align"), Some(SettingKind::Align));
        assert_eq!(SettingKind::of("paragraph_italic"), Some(SettingKind::Flag));
        assert_eq!(SettingKind::of("h3_font"), Some(SettingKind::Font));
        assert_eq!(SettingKind::of("footer_url"), Some(SettingKind::Text));
        assert_eq!(SettingKind::of("footer_columns"), Some(SettingKind::Columns));
        assert_eq!(SettingKind::of("nope"), None);
    }

    #[test]
    fn test_set_validates_value() {
        let mut theme = Theme::default();
        theme.set("h1_color", "#abc").unwrap();
        assert_eq!(theme.get("h1_color"), Some("#abc"));
        assert!(theme.set("h1_color", "red").is_err());
        assert!(theme.set("h1_size", "big").is_err());
        assert!(theme.set("h1_align", "justify").is_err());
        assert!(theme.set("h1_font", "Papyrus").is_err());
        assert!(theme.set("unknown", "x").is_err());
        theme.set("footer_text", "© Acme").unwrap();
    }

    #[test]
    fn test_overrides_only_changed_values() {
        let mut theme = Theme::default();
        assert!(theme.overrides().is_empty());
        theme.set("copy_bg", "#000000").unwrap();
        let overrides = theme.overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["copy_bg"], "#000000");
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#A1b2C3"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#ggg"));
    }
}
