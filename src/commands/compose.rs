//! Interactive composer
//!
//! Wires a [`Composer`] to the configured AI endpoint, image capability,
//! delivery service and store, then runs a readline loop. Plain text goes
//! to the composer as chat, a bare number picks from the last menu and
//! `/` commands are parsed by [`special_commands`](super::special_commands).

use crate::commands::special_commands::{
    parse_special_command, print_help, ApplyTarget, SpecialCommand,
};
use crate::composer::extract::MarkdownImage;
use crate::composer::{
    parse_schedule, Action, AudienceType, CampaignType, Composer, ComposerEvent, ComposerSession,
    Draft, Field, Menu, Modifier, Offer, Role, Section, SubjectOption, ThemeStyle,
};
use crate::config::Config;
use crate::delivery::{create_send_service, DraftSink, SendService};
use crate::error::Result;
use crate::providers::{create_image_generator, create_text_generator, BrandContext};
use crate::storage::SqliteStore;
use crate::template::TemplateStore;
use colored::Colorize;
use regex::Regex;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Options for opening the composer
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    /// Section key
    pub section: String,
    /// Draft label; the section's type label when unset
    pub label: Option<String>,
    /// Starting subject
    pub subject: Option<String>,
    /// Starting preheader
    pub preheader: Option<String>,
    /// File holding the starting body
    pub html_file: Option<PathBuf>,
}

/// What a bare number refers to
#[derive(Debug, Clone, PartialEq)]
enum MenuChoice {
    Act(Action),
    AskUploadUrl,
}

/// Free-chat content waiting for `/apply`
#[derive(Debug, Default)]
struct Offers {
    subjects: Vec<String>,
    body: bool,
    html: bool,
    image: Option<MarkdownImage>,
}

impl Offers {
    fn record(&mut self, offer: &Offer) {
        match offer {
            Offer::SubjectCandidates(subjects) => self.subjects = subjects.clone(),
            Offer::Body(_) => self.body = true,
            Offer::Html(_) => self.html = true,
            Offer::Image(image) => self.image = Some(image.clone()),
            Offer::ImageSuggestion(_) => {}
        }
    }

    fn action(&self, target: &ApplyTarget) -> Option<Action> {
        match target {
            ApplyTarget::Subject(n) if *n <= self.subjects.len() => {
                Some(Action::ApplySubjectCandidate(n - 1))
            }
            ApplyTarget::Subject(_) => None,
            ApplyTarget::Body => self.body.then_some(Action::ApplyBody),
            ApplyTarget::Html => self.html.then_some(Action::ApplyHtml),
            ApplyTarget::Image => self.image.clone().map(Action::InsertImage),
        }
    }
}

/// Maps a 1-based menu number to what it selects
fn numbered_choice(menu: &Menu, n: usize, subject_count: usize) -> Option<MenuChoice> {
    let index = n.checked_sub(1)?;
    let act = |action: Action| Some(MenuChoice::Act(action));
    match menu {
        Menu::CampaignTypes => CampaignType::ALL
            .get(index)
            .and_then(|c| act(Action::SelectCampaign(*c))),
        Menu::Audiences => AudienceType::ALL
            .get(index)
            .and_then(|a| act(Action::SelectAudience(*a))),
        Menu::SubjectRevisions => {
            if index < subject_count {
                act(Action::SelectSubject(index))
            } else {
                Modifier::ALL
                    .get(index - subject_count)
                    .and_then(|m| act(Action::ReviseSubjects(*m)))
            }
        }
        Menu::VisualAssets => match n {
            1 => act(Action::GenerateImage),
            2 => Some(MenuChoice::AskUploadUrl),
            3 => act(Action::SkipVisuals),
            _ => None,
        },
        Menu::ImageReview => match n {
            1 => act(Action::UseImage),
            2 => act(Action::RetryImage),
            _ => None,
        },
        Menu::Themes => ThemeStyle::ALL
            .get(index)
            .and_then(|t| act(Action::ApplyTheme(*t))),
    }
}

fn markdown_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"\*\*(.+?)\*\*").expect("Invalid bold pattern"),
            Regex::new(r"`([^`]+)`").expect("Invalid code pattern"),
        )
    })
}

/// Renders `**bold**` and `` `code` `` for the terminal
fn format_markdown(text: &str) -> String {
    let (bold, code) = markdown_patterns();
    let text = bold.replace_all(text, |caps: &regex::Captures<'_>| {
        caps[1].bold().to_string()
    });
    code.replace_all(&text, |caps: &regex::Captures<'_>| caps[1].cyan().to_string())
        .into_owned()
}

/// Start the interactive composer
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `options` - Draft to start from
///
/// # Errors
///
/// Returns error if the section is unknown, the HTML file cannot be read,
/// or a collaborator cannot be created
pub async fn run_compose(config: Config, options: ComposeOptions) -> Result<()> {
    let section = Section::parse_str(&options.section)
        .map_err(crate::error::ComposerError::Validation)?;
    let label = options
        .label
        .clone()
        .unwrap_or_else(|| section.type_label().to_string());

    let store = SqliteStore::open(config.storage.db_path.as_deref())?;

    let mut draft = Draft::new(section, label);
    draft.subject = options.subject.unwrap_or_default();
    draft.preheader = options.preheader.unwrap_or_default();
    draft.html = match &options.html_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => active_template_html(&store)?.unwrap_or_default(),
    };

    let text = create_text_generator(&config.ai)?;
    let images = create_image_generator(&config.images)?;
    let sender = create_send_service(&config.delivery, &config.ai)?;
    let session = ComposerSession::new(draft, BrandContext::from(&config.brand));
    let mut composer = Composer::new(
        session,
        text,
        images,
        Duration::from_secs(config.ai.timeout_seconds),
    );

    let mut rl = DefaultEditor::new()?;
    let mut view = View::default();

    print_welcome_banner(composer.session().draft());
    view.render(&composer.open());

    loop {
        let prompt = format!("[{}]>> ", composer.session().workflow().step)
            .cyan()
            .to_string();
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                };

                let action = match command {
                    SpecialCommand::Exit => break,
                    SpecialCommand::Help => {
                        print_help();
                        continue;
                    }
                    SpecialCommand::None => match trimmed.parse::<usize>() {
                        Ok(n) => match view.choose(n, composer.session().workflow().subject_options.len()) {
                            Some(MenuChoice::Act(action)) => action,
                            Some(MenuChoice::AskUploadUrl) => {
                                match rl.readline("Image URL: ") {
                                    Ok(url) if !url.trim().is_empty() => {
                                        Action::UploadImage(url.trim().to_string())
                                    }
                                    _ => continue,
                                }
                            }
                            None => Action::Chat(trimmed.to_string()),
                        },
                        Err(_) => Action::Chat(trimmed.to_string()),
                    },
                    other => {
                        match handle_command(other, &mut composer, &mut view, &*sender, &store)
                            .await
                        {
                            Ok(Some(action)) => action,
                            Ok(None) => continue,
                            Err(e) => {
                                eprintln!("{}", format!("Error: {}", e).red());
                                continue;
                            }
                        }
                    }
                };

                match composer.handle(action).await {
                    Ok(events) => view.render(&events),
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn active_template_html(store: &SqliteStore) -> Result<Option<String>> {
    let Some(name) = store.active_template()? else {
        return Ok(None);
    };
    let template = store
        .list_templates()?
        .into_iter()
        .find(|t| t.name == name);
    if template.is_some() {
        tracing::info!("Starting from active template {}", name);
    } else {
        tracing::warn!("Active template {} no longer exists", name);
    }
    Ok(template.map(|t| t.html))
}

/// Handles commands that are not plain composer actions
///
/// Returns the action to dispatch, if the command maps to one.
async fn handle_command(
    command: SpecialCommand,
    composer: &mut Composer,
    view: &mut View,
    sender: &dyn SendService,
    store: &SqliteStore,
) -> Result<Option<Action>> {
    let action = match command {
        SpecialCommand::Pick(n) => Action::SelectSubject(n - 1),
        SpecialCommand::Custom(text) => Action::CustomSubject(text),
        SpecialCommand::Revise(modifier) => Action::ReviseSubjects(modifier),
        SpecialCommand::Image => Action::GenerateImage,
        SpecialCommand::Upload(url) => Action::UploadImage(url),
        SpecialCommand::Skip => Action::SkipVisuals,
        SpecialCommand::UseImage => Action::UseImage,
        SpecialCommand::RegenerateImage => Action::RetryImage,
        SpecialCommand::Theme(theme) => Action::ApplyTheme(theme),
        SpecialCommand::Quick(quick) => Action::Quick(quick),
        SpecialCommand::Retry => Action::Retry,
        SpecialCommand::Apply(target) => match view.offers.action(&target) {
            Some(action) => action,
            None => {
                println!("{}", "Nothing like that has been offered yet.".yellow());
                return Ok(None);
            }
        },
        SpecialCommand::SetSubject(text) => {
            composer.session_mut().draft_mut().subject = text;
            render_field(Field::Subject);
            return Ok(None);
        }
        SpecialCommand::SetPreheader(text) => {
            composer.session_mut().draft_mut().preheader = text;
            render_field(Field::Preheader);
            return Ok(None);
        }
        SpecialCommand::AddRecipient { email, name } => {
            let draft = composer.session_mut().draft_mut();
            if draft.add_recipient(&email, name.as_deref())? {
                println!("{}", format!("Added {}", email).green());
            } else {
                println!("{}", format!("{} is already a recipient", email).yellow());
            }
            return Ok(None);
        }
        SpecialCommand::RemoveRecipient(email) => {
            if composer.session_mut().draft_mut().remove_recipient(&email) {
                println!("{}", format!("Removed {}", email).green());
            } else {
                println!("{}", format!("{} is not a recipient", email).yellow());
            }
            return Ok(None);
        }
        SpecialCommand::Recipients => {
            print_recipients(composer.session().draft());
            return Ok(None);
        }
        SpecialCommand::Send => {
            let draft = composer.session_mut().draft_mut();
            draft.send_now();
            let request = draft.send_request()?;
            println!("{}", "Sending...".cyan());
            println!("{}", sender.send(&request).await?.green());
            return Ok(None);
        }
        SpecialCommand::Schedule { date, time } => {
            let at = parse_schedule(&date, &time)?;
            let draft = composer.session_mut().draft_mut();
            draft.schedule(at);
            let request = draft.send_request()?;
            println!("{}", "Scheduling...".cyan());
            println!("{}", sender.send(&request).await?.green());
            return Ok(None);
        }
        SpecialCommand::Test(to) => {
            let request = composer.session().draft().test_request(&to)?;
            println!("{}", "Sending test email...".cyan());
            println!("{}", sender.send_test(&request).await?.green());
            return Ok(None);
        }
        SpecialCommand::Save => {
            let saved = composer.session().draft().saved();
            let id = store.save_draft(&saved)?;
            composer.session_mut().draft_mut().external_id = Some(id.clone());
            println!("{}", format!("Draft saved ({})", id).green());
            return Ok(None);
        }
        SpecialCommand::Preview => {
            let html = &composer.session().draft().html;
            if html.trim().is_empty() {
                println!("{}", "The body is empty.".yellow());
            } else {
                println!("\n{}\n", html);
            }
            return Ok(None);
        }
        SpecialCommand::ShowStatus => {
            print_status(composer);
            return Ok(None);
        }
        SpecialCommand::Help | SpecialCommand::Exit | SpecialCommand::None => return Ok(None),
    };
    Ok(Some(action))
}

/// Terminal rendering and the context numbered input refers to
#[derive(Debug, Default)]
struct View {
    menu: Option<Menu>,
    offers: Offers,
}

impl View {
    fn choose(&self, n: usize, subject_count: usize) -> Option<MenuChoice> {
        self.menu
            .as_ref()
            .and_then(|menu| numbered_choice(menu, n, subject_count))
    }

    fn render(&mut self, events: &[ComposerEvent]) {
        for event in events {
            self.render_event(event);
        }
    }

    fn render_event(&mut self, event: &ComposerEvent) {
        match event {
            ComposerEvent::Message {
                role: Role::Assistant,
                text,
            } => println!("\n{}\n", format_markdown(text)),
            ComposerEvent::Message {
                role: Role::User,
                text,
            } => println!("{} {}", "you:".dimmed(), text.dimmed()),
            ComposerEvent::Generating(text) => println!("{}", text.dimmed()),
            ComposerEvent::Menu(menu) => {
                print_menu(menu);
                self.menu = Some(menu.clone());
            }
            ComposerEvent::SubjectOptions(options) => print_subject_options(options),
            ComposerEvent::Offer(offer) => {
                print_offer(offer);
                self.offers.record(offer);
            }
            ComposerEvent::ImagePreview(image) => {
                println!("  {} {}", "Image:".bold(), image.url.cyan());
            }
            ComposerEvent::FieldUpdated(field) => {
                render_field(*field);
                // Numbers from the previous menu no longer apply
                self.menu = None;
            }
            ComposerEvent::RetryAvailable => {
                println!("{}", "Type /retry to try again.".yellow());
            }
        }
    }
}

fn render_field(field: Field) {
    let name = match field {
        Field::Subject => "Subject",
        Field::Preheader => "Preheader",
        Field::Body => "Body",
    };
    println!("{}", format!("✓ {} updated", name).green());
}

fn print_menu(menu: &Menu) {
    let items: Vec<String> = match menu {
        Menu::CampaignTypes => CampaignType::ALL
            .iter()
            .map(|c| format!("{} {}", c.icon(), c.label()))
            .collect(),
        Menu::Audiences => AudienceType::ALL
            .iter()
            .map(|a| format!("{} {}", a.icon(), a.label()))
            .collect(),
        Menu::SubjectRevisions => {
            println!(
                "  {}",
                "Pick a subject by number, or revise:".dimmed()
            );
            for modifier in Modifier::ALL {
                println!("    /revise {:<12} {}", modifier.key(), modifier.label());
            }
            println!("    /custom <your subject line>");
            return;
        }
        Menu::VisualAssets => vec![
            "🎨 Generate with AI".to_string(),
            "📁 Upload image".to_string(),
            "⏭️ Skip visuals".to_string(),
        ],
        Menu::ImageReview => vec!["✅ Use this image".to_string(), "🔄 Try again".to_string()],
        Menu::Themes => ThemeStyle::ALL
            .iter()
            .map(|t| t.label().to_string())
            .collect(),
    };
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", (i + 1).to_string().bold(), item);
    }
}

fn print_subject_options(options: &[SubjectOption]) {
    for (i, option) in options.iter().enumerate() {
        println!(
            "  {}. {} {}",
            (i + 1).to_string().bold(),
            option.hook.colored_tag(),
            option.text
        );
    }
}

fn print_offer(offer: &Offer) {
    match offer {
        Offer::SubjectCandidates(subjects) => {
            for (i, subject) in subjects.iter().enumerate() {
                println!("  {}. {}", (i + 1).to_string().bold(), subject);
            }
            println!("{}", "Use /apply subject <n> to pick one.".dimmed());
        }
        Offer::Body(_) => println!("{}", "Use /apply body to put this in the body.".dimmed()),
        Offer::Html(_) => println!("{}", "Use /apply html to use this design.".dimmed()),
        Offer::Image(image) => {
            println!("  {} {}", "Image:".bold(), image.url.cyan());
            println!("{}", "Use /apply image to insert it.".dimmed());
        }
        Offer::ImageSuggestion(prompt) => {
            println!("  {} {}", "Suggested prompt:".bold(), prompt);
            println!(
                "{}",
                "Use /image and send this prompt (or \"suggest\") to generate it.".dimmed()
            );
        }
    }
}

fn print_recipients(draft: &Draft) {
    if draft.recipients.is_empty() {
        println!("{}", "No recipients yet. Add one with /to <email>.".yellow());
        return;
    }
    for recipient in &draft.recipients {
        if recipient.name == recipient.email {
            println!("  {}", recipient.email);
        } else {
            println!("  {} <{}>", recipient.name, recipient.email);
        }
    }
}

fn print_welcome_banner(draft: &Draft) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                Campaign Composer - Welcome!                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Section: {} ({})", draft.section.key().bold(), draft.label);
    println!("Type '/help' for available commands, 'exit' to quit");
}

fn print_status(composer: &Composer) {
    let session = composer.session();
    let draft = session.draft();
    let or_empty = |s: &str| {
        if s.trim().is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            s.to_string()
        }
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Composer Status                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Section:    {} ({})", draft.section.key(), draft.label);
    println!("Step:       {}", session.workflow().step);
    println!("Phase:      {}", session.conversation().phase);
    println!("Subject:    {}", or_empty(&draft.subject));
    println!("Preheader:  {}", or_empty(&draft.preheader));
    println!("Body:       {} characters", draft.html.len());
    println!("Recipients: {}", draft.recipients.len());
    if let Some(id) = &draft.external_id {
        println!("Saved as:   {}", id);
    }
    if session.can_retry() {
        println!("{}", "Last request failed; /retry is available".yellow());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_campaign_choice() {
        assert_eq!(
            numbered_choice(&Menu::CampaignTypes, 1, 0),
            Some(MenuChoice::Act(Action::SelectCampaign(CampaignType::FlashSale)))
        );
        assert_eq!(numbered_choice(&Menu::CampaignTypes, 0, 0), None);
        assert_eq!(numbered_choice(&Menu::CampaignTypes, 7, 0), None);
    }

    #[test]
    fn test_numbered_subject_choice_then_modifiers() {
        assert_eq!(
            numbered_choice(&Menu::SubjectRevisions, 3, 3),
            Some(MenuChoice::Act(Action::SelectSubject(2)))
        );
        assert_eq!(
            numbered_choice(&Menu::SubjectRevisions, 4, 3),
            Some(MenuChoice::Act(Action::ReviseSubjects(Modifier::Funnier)))
        );
        assert_eq!(numbered_choice(&Menu::SubjectRevisions, 7, 3), None);
    }

    #[test]
    fn test_numbered_visual_choice() {
        assert_eq!(
            numbered_choice(&Menu::VisualAssets, 2, 0),
            Some(MenuChoice::AskUploadUrl)
        );
        assert_eq!(
            numbered_choice(&Menu::VisualAssets, 3, 0),
            Some(MenuChoice::Act(Action::SkipVisuals))
        );
        assert_eq!(
            numbered_choice(&Menu::ImageReview, 2, 0),
            Some(MenuChoice::Act(Action::RetryImage))
        );
    }

    #[test]
    fn test_numbered_theme_choice() {
        assert_eq!(
            numbered_choice(&Menu::Themes, 4, 0),
            Some(MenuChoice::Act(Action::ApplyTheme(ThemeStyle::Dark)))
        );
    }

    #[test]
    fn test_offers_map_to_actions() {
        let mut offers = Offers::default();
        assert_eq!(offers.action(&ApplyTarget::Body), None);

        offers.record(&Offer::SubjectCandidates(vec!["A".into(), "B".into()]));
        offers.record(&Offer::Html("<html></html>".into()));
        let image = MarkdownImage {
            alt: "Hero".into(),
            url: "https://img.test/h.png".into(),
        };
        offers.record(&Offer::Image(image.clone()));

        assert_eq!(
            offers.action(&ApplyTarget::Subject(2)),
            Some(Action::ApplySubjectCandidate(1))
        );
        assert_eq!(offers.action(&ApplyTarget::Subject(3)), None);
        assert_eq!(offers.action(&ApplyTarget::Html), Some(Action::ApplyHtml));
        assert_eq!(
            offers.action(&ApplyTarget::Image),
            Some(Action::InsertImage(image))
        );
        assert_eq!(offers.action(&ApplyTarget::Body), None);
    }

    #[test]
    fn test_view_tracks_last_menu() {
        colored::control::set_override(false);
        let mut view = View::default();
        assert_eq!(view.choose(1, 0), None);
        view.render(&[ComposerEvent::Menu(Menu::Audiences)]);
        assert_eq!(
            view.choose(2, 0),
            Some(MenuChoice::Act(Action::SelectAudience(AudienceType::Subscribers)))
        );
    }

    #[test]
    fn test_view_forgets_menu_once_field_changes() {
        colored::control::set_override(false);
        let mut view = View::default();
        view.render(&[ComposerEvent::Menu(Menu::SubjectRevisions)]);
        assert_eq!(
            view.choose(2, 3),
            Some(MenuChoice::Act(Action::SelectSubject(1)))
        );

        view.render(&[
            ComposerEvent::assistant("Subject locked"),
            ComposerEvent::FieldUpdated(Field::Subject),
        ]);
        assert_eq!(view.choose(2, 3), None);

        // A menu that follows the update is live again
        view.render(&[
            ComposerEvent::FieldUpdated(Field::Body),
            ComposerEvent::Menu(Menu::VisualAssets),
        ]);
        assert_eq!(view.choose(2, 0), Some(MenuChoice::AskUploadUrl));
    }

    #[test]
    fn test_image_suggestion_is_not_applicable() {
        let mut offers = Offers::default();
        offers.record(&Offer::ImageSuggestion("A sunny beach".into()));
        assert_eq!(offers.action(&ApplyTarget::Image), None);
    }

    #[test]
    fn test_format_markdown_strips_markers() {
        colored::control::set_override(false);
        assert_eq!(
            format_markdown("Pick **one** of `these`"),
            "Pick one of these"
        );
    }
}
