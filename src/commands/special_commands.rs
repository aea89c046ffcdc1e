//! Special commands parser for the interactive composer
//!
//! Anything starting with `/` is a command; other input is either a menu
//! number or free text for the composer. Command names are
//! case-insensitive, arguments keep their case.

use crate::composer::types::{Modifier, QuickAction, ThemeStyle};
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Content offered by free chat that `/apply` can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyTarget {
    /// Subject candidate, 1-based
    Subject(usize),
    /// Offered body copy
    Body,
    /// Offered HTML design
    Html,
    /// Offered image
    Image,
}

/// Commands handled by the composer loop rather than sent as chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Choose subject candidate `n` (1-based)
    Pick(usize),
    /// Use a custom subject line
    Custom(String),
    /// Regenerate subject candidates
    Revise(Modifier),
    /// Start image generation
    Image,
    /// Insert an image by URL
    Upload(String),
    /// Skip the visual step
    Skip,
    /// Accept the generated image
    UseImage,
    /// Generate another image for the same prompt
    RegenerateImage,
    /// Restyle the body
    Theme(ThemeStyle),
    /// Run a quick action
    Quick(QuickAction),
    /// Apply offered content
    Apply(ApplyTarget),
    /// Re-send the last failed request
    Retry,
    /// Overwrite the subject field
    SetSubject(String),
    /// Overwrite the preheader field
    SetPreheader(String),
    /// Add a recipient, optionally with a display name
    AddRecipient {
        email: String,
        name: Option<String>,
    },
    /// Remove a recipient
    RemoveRecipient(String),
    /// List recipients
    Recipients,
    /// Send now
    Send,
    /// Schedule for a date and time
    Schedule { date: String, time: String },
    /// Send a test to one address
    Test(String),
    /// Save the draft
    Save,
    /// Print the current body HTML
    Preview,
    /// Show draft and workflow status
    ShowStatus,
    /// Display help information
    Help,
    /// Exit the composer
    Exit,
    /// Not a special command
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn unsupported(command: &str, arg: &str) -> CommandError {
    CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

fn parse_index(command: &str, arg: &str, usage: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(missing(command, usage));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(unsupported(command, arg)),
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/word`,
/// `CommandError::MissingArgument` when a required argument is absent and
/// `CommandError::UnsupportedArgument` when it does not parse.
///
/// # Examples
///
/// ```
/// use campaign_composer::commands::special_commands::{parse_special_command, SpecialCommand};
/// use campaign_composer::composer::Modifier;
///
/// assert_eq!(parse_special_command("/pick 2").unwrap(), SpecialCommand::Pick(2));
/// assert_eq!(
///     parse_special_command("/revise shorter").unwrap(),
///     SpecialCommand::Revise(Modifier::Shorter)
/// );
/// assert_eq!(parse_special_command("make it pop").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match head.as_str() {
        "/pick" => Ok(SpecialCommand::Pick(parse_index("/pick", rest, "/pick <n>")?)),
        "/custom" => {
            if rest.is_empty() {
                Err(missing("/custom", "/custom <subject line>"))
            } else {
                Ok(SpecialCommand::Custom(rest.to_string()))
            }
        }
        "/revise" => {
            if rest.is_empty() {
                return Err(missing("/revise", "/revise <funnier|shorter|less-salesy>"));
            }
            Modifier::parse_str(rest)
                .map(SpecialCommand::Revise)
                .map_err(|_| unsupported("/revise", rest))
        }
        "/image" => Ok(SpecialCommand::Image),
        "/upload" => {
            if rest.is_empty() {
                Err(missing("/upload", "/upload <image url>"))
            } else {
                Ok(SpecialCommand::Upload(rest.to_string()))
            }
        }
        "/skip" => Ok(SpecialCommand::Skip),
        "/use" => Ok(SpecialCommand::UseImage),
        "/regen" | "/regenerate" => Ok(SpecialCommand::RegenerateImage),
        "/theme" => {
            if rest.is_empty() {
                return Err(missing("/theme", "/theme <minimalist|bold|luxury|dark>"));
            }
            ThemeStyle::parse_str(rest)
                .map(SpecialCommand::Theme)
                .map_err(|_| unsupported("/theme", rest))
        }
        "/quick" => {
            if rest.is_empty() {
                return Err(missing("/quick", "/quick <copy|html|improve>"));
            }
            QuickAction::parse_str(rest)
                .map(SpecialCommand::Quick)
                .map_err(|_| unsupported("/quick", rest))
        }
        "/apply" => {
            let usage = "/apply <subject <n>|body|html|image>";
            let mut parts = rest.split_whitespace();
            match parts.next().map(str::to_lowercase).as_deref() {
                None => Err(missing("/apply", usage)),
                Some("subject") => {
                    let n = parts.next().unwrap_or("");
                    Ok(SpecialCommand::Apply(ApplyTarget::Subject(parse_index(
                        "/apply subject",
                        n,
                        "/apply subject <n>",
                    )?)))
                }
                Some("body") => Ok(SpecialCommand::Apply(ApplyTarget::Body)),
                Some("html") => Ok(SpecialCommand::Apply(ApplyTarget::Html)),
                Some("image") => Ok(SpecialCommand::Apply(ApplyTarget::Image)),
                Some(other) => Err(unsupported("/apply", other)),
            }
        }
        "/retry" => Ok(SpecialCommand::Retry),
        "/subject" => Ok(SpecialCommand::SetSubject(rest.to_string())),
        "/preheader" => Ok(SpecialCommand::SetPreheader(rest.to_string())),
        "/to" => {
            let mut parts = rest.splitn(2, char::is_whitespace);
            match parts.next().filter(|s| !s.is_empty()) {
                None => Err(missing("/to", "/to <email> [name]")),
                Some(email) => Ok(SpecialCommand::AddRecipient {
                    email: email.to_string(),
                    name: parts
                        .next()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                }),
            }
        }
        "/remove" => {
            if rest.is_empty() {
                Err(missing("/remove", "/remove <email>"))
            } else {
                Ok(SpecialCommand::RemoveRecipient(rest.to_string()))
            }
        }
        "/recipients" => Ok(SpecialCommand::Recipients),
        "/send" => Ok(SpecialCommand::Send),
        "/schedule" => {
            let usage = "/schedule <YYYY-MM-DD> <HH:MM>";
            let parts: Vec<&str> = rest.split_whitespace().collect();
            match parts.as_slice() {
                [date, time] => Ok(SpecialCommand::Schedule {
                    date: date.to_string(),
                    time: time.to_string(),
                }),
                [] | [_] => Err(missing("/schedule", usage)),
                _ => Err(unsupported("/schedule", rest)),
            }
        }
        "/test" => {
            if rest.is_empty() {
                Err(missing("/test", "/test <email>"))
            } else {
                Ok(SpecialCommand::Test(rest.to_string()))
            }
        }
        "/save" => Ok(SpecialCommand::Save),
        "/preview" | "/html" => Ok(SpecialCommand::Preview),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for composer commands
pub fn print_help() {
    println!(
        r#"
Composer Commands
=================

GUIDED WORKFLOW:
  <n>                 - Choose option n from the last menu
  /pick <n>           - Choose subject candidate n
  /custom <subject>   - Use your own subject line
  /revise <modifier>  - Regenerate subjects (funnier, shorter, less-salesy)
  /image              - Generate an image (you will be asked for a prompt)
  /upload <url>       - Insert an image by URL
  /use                - Insert the generated image
  /regen              - Generate another image for the same prompt
  /skip               - Skip images and go to review
  /theme <style>      - Restyle the body (minimalist, bold, luxury, dark)

FREE CHAT:
  <text>              - Talk to the assistant
  /quick <action>     - copy, html or improve
  /apply subject <n>  - Use an offered subject line
  /apply body         - Use offered body copy
  /apply html         - Use an offered HTML design
  /apply image        - Insert an offered image
  /retry              - Re-send the last failed request

DRAFT:
  /subject <text>     - Set the subject field
  /preheader <text>   - Set the preheader field
  /preview            - Print the body HTML
  /status             - Show draft and workflow status
  /save               - Save the draft

DELIVERY:
  /to <email> [name]  - Add a recipient
  /remove <email>     - Remove a recipient
  /recipients         - List recipients
  /test <email>       - Send a test email
  /send               - Send now
  /schedule <date> <time> - Schedule, e.g. /schedule 2026-11-01 09:30

SESSION:
  /help               - Show this help message
  exit                - Leave the composer
"#
    );
}
