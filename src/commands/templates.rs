use crate::cli::TemplateCommand;
use crate::config::Config;
use crate::error::Result;
use crate::storage::SqliteStore;
use crate::template::{Template, TemplateStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle template commands
pub fn handle_templates(config: &Config, command: TemplateCommand) -> Result<()> {
    let store = SqliteStore::open(config.storage.db_path.as_deref())?;

    match command {
        TemplateCommand::List { json } => {
            let templates = store.list_templates()?;
            let active = store.active_template()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
                return Ok(());
            }

            if templates.is_empty() {
                println!("{}", "No saved templates found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "Name".bold(),
                "Size".bold(),
                "Active".bold()
            ]);

            for template in templates {
                let marker = if active.as_deref() == Some(template.name.as_str()) {
                    "✓".green()
                } else {
                    "".normal()
                };
                table.add_row(prettytable::row![
                    template.name.cyan(),
                    format!("{} chars", template.html.chars().count()),
                    marker
                ]);
            }

            println!("\nTemplates:");
            table.printstd();
            println!();
        }
        TemplateCommand::Save { name, file } => {
            let html = std::fs::read_to_string(&file)?;
            let template = Template::new(&name, html)?;
            store.save_template(&template)?;
            println!("{}", format!("Saved template {}", template.name).green());
        }
        TemplateCommand::Delete { name } => {
            if store.delete_template(&name)? {
                println!("{}", format!("Deleted template {}", name).green());
            } else {
                println!("{}", format!("No template named {}", name).yellow());
            }
        }
        TemplateCommand::Activate { name } => {
            let exists = store.list_templates()?.iter().any(|t| t.name == name.trim());
            if !exists {
                println!(
                    "{}",
                    format!("No template named {}; marking it active anyway", name).yellow()
                );
            }
            store.set_active_template(&name)?;
            println!("{}", format!("Active template: {}", name.trim()).green());
        }
    }

    Ok(())
}
