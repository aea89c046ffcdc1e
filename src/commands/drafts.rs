use crate::cli::DraftCommand;
use crate::config::Config;
use crate::error::{ComposerError, Result};
use crate::storage::SqliteStore;
use colored::Colorize;
use prettytable::{format, Table};

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Handle draft commands
pub fn handle_drafts(config: &Config, command: DraftCommand) -> Result<()> {
    let store = SqliteStore::open(config.storage.db_path.as_deref())?;

    match command {
        DraftCommand::List { limit } => {
            let drafts = store.list_drafts(limit)?;

            if drafts.is_empty() {
                println!("{}", "No saved drafts found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "ID".bold(),
                "Section".bold(),
                "Subject".bold(),
                "Saved".bold()
            ]);

            for draft in drafts {
                let id_short: String = draft.id.chars().take(8).collect();
                table.add_row(prettytable::row![
                    id_short.cyan(),
                    draft.section.key(),
                    truncate(&draft.subject, 40),
                    draft.saved_at.format("%Y-%m-%d %H:%M").to_string()
                ]);
            }

            println!("\nSaved Drafts:");
            table.printstd();
            println!();
            println!(
                "Use {} to print a draft.",
                "campaign-composer drafts show <ID>".cyan()
            );
            println!();
        }
        DraftCommand::Show { id } => {
            let draft = store
                .get_draft(&id)?
                .ok_or_else(|| ComposerError::Store(format!("No draft with id {}", id)))?;
            println!("{} {}", "Subject:".bold(), draft.subject);
            println!("{} {}", "Preheader:".bold(), draft.preheader);
            println!("{} {}", "Section:".bold(), draft.section.key());
            println!();
            println!("{}", draft.html);
        }
    }

    Ok(())
}
