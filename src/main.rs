//! Campaign Composer - guided AI email composition CLI
//!
#![doc = "Campaign Composer - guided AI email composition CLI"]
#![doc = "Main entry point for the campaign composer application."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campaign_composer::cli::{Cli, Commands};
use campaign_composer::commands;
use campaign_composer::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Compose {
            section,
            label,
            subject,
            preheader,
            html_file,
        } => {
            tracing::info!("Starting interactive composer");
            if let Some(path) = &html_file {
                tracing::debug!("Loading body from: {}", path.display());
            }
            let options = commands::ComposeOptions {
                section,
                label,
                subject,
                preheader,
                html_file,
            };
            commands::run_compose(config, options).await?;
            Ok(())
        }
        Commands::Templates { command } => {
            tracing::info!("Starting template command");
            commands::handle_templates(&config, command)?;
            Ok(())
        }
        Commands::Theme { command } => {
            tracing::info!("Starting theme command");
            commands::handle_theme(&config, command)?;
            Ok(())
        }
        Commands::Drafts { command } => {
            tracing::info!("Starting drafts command");
            commands::handle_drafts(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs are written to stderr. Setting `COMPOSER_LOG_FORMAT=json` switches
/// to one JSON object per event.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "campaign_composer=debug"
    } else {
        "campaign_composer=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let json = std::env::var("COMPOSER_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
