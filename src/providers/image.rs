//! Image generation capability
//!
//! The composer treats image generation as an injectable capability.
//! [`PlaceholderImageGenerator`] returns seeded images from a public
//! random-image service when no real backend is wired up.

use crate::error::{ComposerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Number of prompt characters used to seed a placeholder image
const PLACEHOLDER_SEED_CHARS: usize = 10;

/// An image produced for a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Image URL
    pub url: String,
    /// Prompt the image was generated from
    pub prompt: String,
    /// True when the image is a stand-in rather than a real generation
    pub placeholder: bool,
}

/// Image generation backend
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates an image for a prompt
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Transport` when the backend fails
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// Seeded placeholder images
///
/// # Examples
///
/// ```
/// use campaign_composer::providers::PlaceholderImageGenerator;
///
/// let generator = PlaceholderImageGenerator::new("https://picsum.photos/600/300").unwrap();
/// let url = generator.url_for("sunny beach at dawn").unwrap();
/// assert!(url.starts_with("https://picsum.photos/600/300?grammar="));
/// ```
#[derive(Debug, Clone)]
pub struct PlaceholderImageGenerator {
    base: Url,
}

impl PlaceholderImageGenerator {
    /// Creates a generator rooted at `base`
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Config` if `base` is not a valid URL
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).map_err(|e| {
            ComposerError::Config(format!("Invalid placeholder image base URL: {}", e))
        })?;
        Ok(Self { base })
    }

    /// Builds the placeholder URL for a prompt
    ///
    /// The first ten characters of the prompt seed the image so the same
    /// prompt yields the same picture.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Config` if the URL cannot be assembled
    pub fn url_for(&self, prompt: &str) -> Result<String> {
        let seed: String = prompt.chars().take(PLACEHOLDER_SEED_CHARS).collect();
        let url = Url::parse_with_params(self.base.as_str(), &[("grammar", seed.as_str())])
            .map_err(|e| ComposerError::Config(format!("Invalid placeholder image URL: {}", e)))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl ImageGenerator for PlaceholderImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let url = self.url_for(prompt)?;
        tracing::debug!("Placeholder image for prompt {:?}: {}", prompt, url);
        Ok(GeneratedImage {
            url,
            prompt: prompt.to_string(),
            placeholder: true,
        })
    }
}
