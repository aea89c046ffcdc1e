//! Command-line interface definition for the campaign composer
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive composition, template management
//! and theme settings.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Campaign Composer - guided AI email composition
///
/// Walk through strategy, audience, subject lines, body copy, images and
/// theme with an AI endpoint, then save, test, send or schedule the result.
#[derive(Parser, Debug, Clone)]
#[command(name = "campaign-composer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the SQLite database path for templates, theme and drafts
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the interactive composer
    Compose {
        /// Email section (timed, store, community, rewards, proposals, general)
        #[arg(short, long, default_value = "general")]
        section: String,

        /// Display label for the draft
        #[arg(short, long)]
        label: Option<String>,

        /// Existing subject to start from
        #[arg(long)]
        subject: Option<String>,

        /// Existing preheader to start from
        #[arg(long)]
        preheader: Option<String>,

        /// Existing HTML body to start from
        #[arg(long)]
        html_file: Option<PathBuf>,
    },

    /// Manage saved templates
    Templates {
        /// Template subcommand
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Show or change theme settings
    Theme {
        /// Theme subcommand
        #[command(subcommand)]
        command: ThemeCommand,
    },

    /// Inspect saved drafts
    Drafts {
        /// Draft subcommand
        #[command(subcommand)]
        command: DraftCommand,
    },
}

/// Template management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TemplateCommand {
    /// List saved templates
    List {
        /// Output as JSON instead of a table
        #[arg(short, long)]
        json: bool,
    },

    /// Save (or replace) a template from an HTML file
    Save {
        /// Template name
        #[arg(short, long)]
        name: String,

        /// HTML file holding the template body
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete a template by name
    Delete {
        /// Template name
        #[arg(short, long)]
        name: String,
    },

    /// Mark a template as the active one
    Activate {
        /// Template name
        #[arg(short, long)]
        name: String,
    },
}

/// Theme subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ThemeCommand {
    /// Show the current theme with defaults applied
    Show {
        /// Output the flat settings object as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set a single flat theme setting, e.g. `h2_color #ef5c06`
    Set {
        /// Flat setting key
        key: String,

        /// New value
        value: String,
    },

    /// Remove stored theme settings so defaults apply again
    Reset,
}

/// Draft subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// List saved drafts
    List {
        /// Maximum number of drafts to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Print the HTML of a saved draft
    Show {
        /// Draft id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            db: None,
            command: Commands::Compose {
                section: "general".to_string(),
                label: None,
                subject: None,
                preheader: None,
                html_file: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(cli.db.is_none());

        if let Commands::Compose { section, .. } = cli.command {
            assert_eq!(section, "general");
        } else {
            panic!("Expected default command to be Compose");
        }
    }

    #[test]
    fn test_cli_parse_compose_command() {
        let cli = Cli::try_parse_from(["campaign-composer", "compose"]).unwrap();
        if let Commands::Compose {
            section,
            label,
            html_file,
            ..
        } = cli.command
        {
            assert_eq!(section, "general");
            assert!(label.is_none());
            assert!(html_file.is_none());
        } else {
            panic!("Expected Compose command");
        }
    }

    #[test]
    fn test_cli_parse_compose_with_options() {
        let cli = Cli::try_parse_from([
            "campaign-composer",
            "compose",
            "--section",
            "store",
            "--label",
            "Spring sale",
            "--subject",
            "Hello",
            "--html-file",
            "body.html",
        ])
        .unwrap();
        if let Commands::Compose {
            section,
            label,
            subject,
            html_file,
            ..
        } = cli.command
        {
            assert_eq!(section, "store");
            assert_eq!(label, Some("Spring sale".to_string()));
            assert_eq!(subject, Some("Hello".to_string()));
            assert_eq!(html_file, Some(PathBuf::from("body.html")));
        } else {
            panic!("Expected Compose command");
        }
    }

    #[test]
    fn test_cli_parse_templates_save() {
        let cli = Cli::try_parse_from([
            "campaign-composer",
            "templates",
            "save",
            "--name",
            "welcome",
            "--file",
            "welcome.html",
        ])
        .unwrap();
        if let Commands::Templates {
            command: TemplateCommand::Save { name, file },
        } = cli.command
        {
            assert_eq!(name, "welcome");
            assert_eq!(file, PathBuf::from("welcome.html"));
        } else {
            panic!("Expected Templates Save command");
        }
    }

    #[test]
    fn test_cli_parse_templates_list_json() {
        let cli = Cli::try_parse_from(["campaign-composer", "templates", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Templates {
                command: TemplateCommand::List { json: true }
            }
        ));
    }

    #[test]
    fn test_cli_parse_theme_set() {
        let cli =
            Cli::try_parse_from(["campaign-composer", "theme", "set", "h2_color", "#ef5c06"])
                .unwrap();
        if let Commands::Theme {
            command: ThemeCommand::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "h2_color");
            assert_eq!(value, "#ef5c06");
        } else {
            panic!("Expected Theme Set command");
        }
    }

    #[test]
    fn test_cli_parse_drafts_list_default_limit() {
        let cli = Cli::try_parse_from(["campaign-composer", "drafts", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Drafts {
                command: DraftCommand::List { limit: 20 }
            }
        ));
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "campaign-composer",
            "--verbose",
            "--db",
            "/tmp/c.db",
            "--config",
            "custom.yaml",
            "theme",
            "show",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/c.db")));
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["campaign-composer"]).is_err());
    }

    #[test]
    fn test_cli_templates_delete_requires_name() {
        assert!(Cli::try_parse_from(["campaign-composer", "templates", "delete"]).is_err());
    }
}
