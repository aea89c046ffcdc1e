/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `compose`   - Interactive composer
- `templates` - Saved template management
- `theme`     - Theme settings
- `drafts`    - Saved drafts

The composer loop parses `/` commands with `special_commands`.
*/

pub mod compose;
pub mod drafts;
pub mod special_commands;
pub mod templates;
pub mod theme;

pub use compose::{run_compose, ComposeOptions};
pub use drafts::handle_drafts;
pub use templates::handle_templates;
pub use theme::handle_theme;
