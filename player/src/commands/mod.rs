use std::path::Path;

use anyhow::{Result, anyhow};
use ratatui::style::Color;

use crate::app::{App, AuthoredFlag};

/// Command handler for the application
pub struct CommandHandler;

impl CommandHandler {
    /// Parse and execute a command
    pub fn execute(app: &mut App, command_str: &str) -> Result<()> {
        let parts: Vec<&str> = command_str.trim().splitn(2, ' ').collect();
        let cmd = parts[0].to_lowercase();
        let args = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

        match cmd.as_str() {
            "open" | "o" => {
                let reference = args.ok_or_else(|| anyhow!("Open command requires a video reference"))?;
                app.open_reference(reference);
            }
            "add" => {
                let reference = args.ok_or_else(|| anyhow!("Add command requires a video reference"))?;
                app.add_reference(reference);
            }
            "autoplay" => app.toggle_flag(AuthoredFlag::Autoplay)?,
            "background" | "bg" => app.toggle_flag(AuthoredFlag::Background)?,
            "motion" => {
                let reduced = match args {
                    // "motion on" means motion is allowed
                    Some("on" | "true" | "1") => false,
                    Some("off" | "false" | "0" | "reduce") => true,
                    Some(other) => return Err(anyhow!("Invalid motion setting: {}", other)),
                    None => !app.reduced_motion,
                };
                app.set_reduced_motion(reduced);
            }
            "view" | "v" => {
                if args == Some("all") {
                    app.view_all();
                } else {
                    app.view_selected();
                }
            }
            "click" | "play" | "p" => app.click_selected(),
            "ready" | "r" => app.ready_selected(),
            "reset" => {
                app.redecorate_all();
                app.set_status("Page decorated again", Color::Blue);
            }
            "export" | "e" => {
                let path = args.ok_or_else(|| anyhow!("Export command requires a file path"))?;
                app.export_html(Path::new(path))?;
                app.set_status(format!("Exported markup to {}", path), Color::Green);
            }
            "help" | "h" | "?" => {
                app.show_help = true;
            }
            "quit" | "q" | "exit" => {
                app.should_quit = true;
            }
            "" => {
                // Empty command, do nothing
            }
            _ => {
                return Err(anyhow!("Unknown command: {}", cmd));
            }
        }

        Ok(())
    }
}

/// Handle a command string entered by the user
pub fn handle_command(app: &mut App, command: &str) -> Result<()> {
    log::debug!("Executing command: {}", command);
    CommandHandler::execute(app, command)
}
