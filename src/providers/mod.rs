//! Provider module for the campaign composer
//!
//! This module contains the AI text-generation abstraction, its HTTP
//! implementation, and the image generation capability.

pub mod base;
pub mod http;
pub mod image;

pub use base::{extract_text, AiContext, AiRequest, BrandContext, DraftFlags, TextGenerator};
pub use http::HttpTextGenerator;
pub use image::{GeneratedImage, ImageGenerator, PlaceholderImageGenerator};

use crate::config::{AiConfig, ImageBackend, ImageConfig};
use crate::error::Result;

/// Create the text generator for the configured endpoint
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_text_generator(config: &AiConfig) -> Result<Box<dyn TextGenerator>> {
    Ok(Box::new(HttpTextGenerator::new(config.clone())?))
}

/// Create the image generator selected in configuration
///
/// Returns `None` when image generation is disabled.
///
/// # Errors
///
/// Returns error if the placeholder base URL is invalid
///
/// # Examples
///
/// ```
/// use campaign_composer::config::{ImageBackend, ImageConfig};
/// use campaign_composer::providers::create_image_generator;
///
/// let config = ImageConfig { backend: ImageBackend::Disabled, ..Default::default() };
/// assert!(create_image_generator(&config).unwrap().is_none());
/// ```
pub fn create_image_generator(config: &ImageConfig) -> Result<Option<Box<dyn ImageGenerator>>> {
    match config.backend {
        ImageBackend::Placeholder => Ok(Some(Box::new(PlaceholderImageGenerator::new(
            &config.placeholder_base,
        )?))),
        ImageBackend::Disabled => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_text_generator() {
        assert!(create_text_generator(&AiConfig::default()).is_ok());
    }

    #[test]
    fn test_create_placeholder_image_generator() {
        let generator = create_image_generator(&ImageConfig::default()).unwrap();
        assert!(generator.is_some());
    }

    #[test]
    fn test_create_image_generator_invalid_base() {
        let config = ImageConfig {
            backend: ImageBackend::Placeholder,
            placeholder_base: "::".to_string(),
        };
        assert!(create_image_generator(&config).is_err());
    }
}
