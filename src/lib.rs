//! Campaign Composer - guided AI email composition library
//!
//! This library provides a conversational composer that walks a user from
//! campaign strategy to a finished, styled email draft with the help of an
//! AI endpoint, plus the template, theme and delivery plumbing around it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `composer`: Session state machine, async driver, parsers and fallbacks
//! - `prompts`: System prompts and request messages for each step
//! - `providers`: AI text endpoint and image generation capability
//! - `delivery`: Send, schedule and test-send services, draft sinks
//! - `template`: Saved templates and the shared theme settings
//! - `storage`: SQLite persistence for templates, theme and drafts
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`/`commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use campaign_composer::cli::Cli;
//! use campaign_composer::composer::{Composer, ComposerSession, Draft};
//! use campaign_composer::providers::{create_image_generator, create_text_generator};
//! use campaign_composer::Config;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     let session = ComposerSession::new(Draft::default(), (&config.brand).into());
//!     let mut composer = Composer::new(
//!         session,
//!         create_text_generator(&config.ai)?,
//!         create_image_generator(&config.images)?,
//!         Duration::from_secs(config.ai.timeout_seconds),
//!     );
//!     for event in composer.open() {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod composer;
pub mod config;
pub mod delivery;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod storage;
pub mod template;

// Re-export commonly used types
pub use composer::{Action, Composer, ComposerEvent, ComposerSession, Draft};
pub use config::Config;
pub use error::{ComposerError, Result};
pub use storage::SqliteStore;
pub use template::{Template, TemplateStore, Theme};
