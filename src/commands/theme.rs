use crate::cli::ThemeCommand;
use crate::config::Config;
use crate::error::Result;
use crate::storage::SqliteStore;
use crate::template::{Theme, TemplateStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle theme commands
pub fn handle_theme(config: &Config, command: ThemeCommand) -> Result<()> {
    let store = SqliteStore::open(config.storage.db_path.as_deref())?;

    match command {
        ThemeCommand::Show { json } => {
            let theme = store.load_theme()?;

            if json {
                println!("{}", serde_json::to_string_pretty(theme.settings())?);
                return Ok(());
            }

            let defaults = Theme::defaults();
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row!["Setting".bold(), "Value".bold()]);

            for (key, value) in theme.settings() {
                let shown = if value.is_empty() { "-" } else { value.as_str() };
                let shown = if defaults.get(key) == Some(value) {
                    shown.normal()
                } else {
                    shown.cyan()
                };
                table.add_row(prettytable::row![key, shown]);
            }

            println!("\nTheme settings (customised values highlighted):");
            table.printstd();
            println!();
        }
        ThemeCommand::Set { key, value } => {
            let mut theme = store.load_theme()?;
            theme.set(&key, &value)?;
            store.save_theme(&theme)?;
            println!("{}", format!("Set {} = {}", key.trim(), value.trim()).green());
        }
        ThemeCommand::Reset => {
            store.reset_theme()?;
            println!("{}", "Theme reset to defaults.".green());
        }
    }

    Ok(())
}
