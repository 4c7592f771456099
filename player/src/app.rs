use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{KeyCode, KeyEvent};
use embed_core::{
    BlockContent, DataAttributes, DecoratedBlock, Decorator, EmbedConfig, EventOutcome,
    MediaCommand, Picture, RequestFlags, StaticMotionPreference,
};
use ratatui::style::Color;
use serde::Deserialize;

/// A page file: either a bare list of blocks or a page carrying its own URL
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PageFile {
    Blocks(Vec<BlockContent>),
    Page {
        #[serde(rename = "pageUrl")]
        page_url: Option<String>,
        blocks: Vec<BlockContent>,
    },
}

/// Load the authored blocks of a page from a JSON file
pub fn load_page(path: &Path) -> Result<Vec<BlockContent>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read page file: {}", path.display()))?;
    let page: PageFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse page file: {}", path.display()))?;

    let blocks = match page {
        PageFile::Blocks(blocks) => blocks,
        PageFile::Page { page_url, blocks } => blocks
            .into_iter()
            .map(|mut block| {
                if block.page_url.is_none() {
                    block.page_url = page_url.clone();
                }
                block
            })
            .collect(),
    };

    Ok(blocks
        .into_iter()
        .map(|mut block| {
            if block.classes.is_empty() {
                block.classes.push("video".to_string());
            }
            block
        })
        .collect())
}

/// Build a single authored block from a reference and command line flags
pub fn authored_block(
    reference: &str,
    autoplay: bool,
    background: bool,
    preview: Option<&str>,
    title: Option<&str>,
) -> BlockContent {
    let mut block = BlockContent::new().with_data(DataAttributes {
        src: Some(reference.to_string()),
        title: title.map(str::to_string),
        ..Default::default()
    });
    if autoplay {
        block = block.with_class("autoplay");
    }
    if background {
        block = block.with_class("background");
    }
    if let Some(preview) = preview {
        block = block.with_picture(Picture::new(preview));
    }
    block
}

/// Request flags an author can toggle from the previewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoredFlag {
    Autoplay,
    Background,
}

impl AuthoredFlag {
    fn class(&self) -> &'static str {
        match self {
            AuthoredFlag::Autoplay => "autoplay",
            AuthoredFlag::Background => "background",
        }
    }

    /// Flip the flag where it is authored: the structured attribute when one
    /// exists, the class marker otherwise
    fn toggle(&self, source: &mut BlockContent) {
        let slot = match self {
            AuthoredFlag::Autoplay => &mut source.dataset.autoplay,
            AuthoredFlag::Background => &mut source.dataset.background,
        };
        if let Some(value) = slot.as_mut() {
            let enabled = value.trim().eq_ignore_ascii_case("true");
            *value = (!enabled).to_string();
        } else if !source.remove_class(self.class()) {
            source.classes.push(self.class().to_string());
        }
    }

    fn is_requested(&self, flags: RequestFlags) -> bool {
        match self {
            AuthoredFlag::Autoplay => flags.autoplay_requested,
            AuthoredFlag::Background => flags.background_requested,
        }
    }
}

// App state
pub struct App {
    /// Authored blocks, kept so they can be decorated again
    pub sources: Vec<BlockContent>,
    /// Live blocks, one per source
    pub blocks: Vec<DecoratedBlock>,
    /// Index of the selected block
    pub selected: usize,
    pub config: EmbedConfig,
    /// Reduced-motion preference handed to the decorator
    pub reduced_motion: bool,
    decorator: Decorator,
    /// Start time, drives the spinner animation
    pub started: Instant,
    /// Status message to display
    pub status_message: Option<(String, Instant, Color)>,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Help dialog visibility
    pub show_help: bool,
    /// Whether command mode is active
    pub command_mode: bool,
    /// Command buffer for command mode
    pub command_buffer: String,
    /// Vertical scroll of the markup pane
    pub markup_scroll: u16,
}

impl App {
    pub fn new(config: EmbedConfig, reduced_motion: bool) -> Self {
        let decorator = Decorator::new(config.clone(), &StaticMotionPreference(reduced_motion));
        Self {
            sources: Vec::new(),
            blocks: Vec::new(),
            selected: 0,
            config,
            reduced_motion,
            decorator,
            started: Instant::now(),
            status_message: None,
            should_quit: false,
            show_help: false,
            command_mode: false,
            command_buffer: String::new(),
            markup_scroll: 0,
        }
    }

    /// Set a status message with a color
    pub fn set_status(&mut self, message: impl Into<String>, color: Color) {
        let message_string = message.into();
        log::debug!("Status message: {} ({})", message_string, color);
        self.status_message = Some((message_string, Instant::now(), color));
    }

    /// Replace the page with new authored blocks and decorate them
    pub fn load(&mut self, sources: Vec<BlockContent>) {
        self.blocks = sources.iter().map(|s| self.decorator.decorate(s)).collect();
        self.sources = sources;
        self.selected = 0;
        self.markup_scroll = 0;
        log::info!("Loaded page with {} block(s)", self.blocks.len());
    }

    pub fn selected_block(&self) -> Option<&DecoratedBlock> {
        self.blocks.get(self.selected)
    }

    /// Label of a block for the list and status line
    pub fn block_label(&self, index: usize) -> String {
        self.blocks
            .get(index)
            .and_then(DecoratedBlock::name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("block {}", index + 1))
    }

    /// Replace the page with one block referencing `reference`
    pub fn open_reference(&mut self, reference: &str) {
        self.load(vec![authored_block(reference, false, false, None, None)]);
        self.set_status(format!("Opened {}", reference), Color::Green);
    }

    /// Append a block referencing `reference` and select it
    pub fn add_reference(&mut self, reference: &str) {
        let source = authored_block(reference, false, false, None, None);
        self.blocks.push(self.decorator.decorate(&source));
        self.sources.push(source);
        self.selected = self.blocks.len() - 1;
        self.markup_scroll = 0;
        self.set_status(format!("Added {}", reference), Color::Green);
    }

    /// Decorate every block again from its authored source
    pub fn redecorate_all(&mut self) {
        self.blocks = self.sources.iter().map(|s| self.decorator.decorate(s)).collect();
        self.markup_scroll = 0;
    }

    fn redecorate_selected(&mut self) {
        if let Some(source) = self.sources.get(self.selected) {
            let decorated = self.decorator.decorate(source);
            self.blocks[self.selected] = decorated;
        }
        self.markup_scroll = 0;
    }

    pub fn toggle_flag(&mut self, flag: AuthoredFlag) -> Result<()> {
        let source = self
            .sources
            .get_mut(self.selected)
            .ok_or_else(|| anyhow!("No block selected"))?;
        flag.toggle(source);
        let enabled = flag.is_requested(RequestFlags::from_content(source));
        self.redecorate_selected();
        self.set_status(
            format!(
                "{}: {} {}",
                self.block_label(self.selected),
                flag.class(),
                if enabled { "requested" } else { "off" }
            ),
            Color::Green,
        );
        Ok(())
    }

    /// Change the motion preference; decoration starts over for every block
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        self.reduced_motion = enabled;
        self.decorator = Decorator::new(self.config.clone(), &StaticMotionPreference(enabled));
        self.redecorate_all();
        self.set_status(
            format!("Reduced motion {}", if enabled { "on" } else { "off" }),
            Color::Blue,
        );
    }

    fn report(&mut self, index: usize, action: &str, outcome: EventOutcome) {
        let label = self.block_label(index);
        match outcome {
            EventOutcome::Activated => {
                self.set_status(format!("{}: embed attached ({})", label, action), Color::Green)
            }
            EventOutcome::Ready(commands) => {
                let applied = if commands.is_empty() {
                    String::new()
                } else {
                    let names: Vec<&str> = commands.iter().map(command_name).collect();
                    format!(", applied {}", names.join(" + "))
                };
                self.set_status(format!("{}: embed loaded{}", label, applied), Color::Green)
            }
            EventOutcome::Ignored => {
                self.set_status(format!("{}: {} ignored", label, action), Color::Yellow)
            }
        }
    }

    /// Scroll the selected block into view
    pub fn view_selected(&mut self) {
        let index = self.selected;
        if let Some(block) = self.blocks.get_mut(index) {
            let outcome = block.intersect();
            self.report(index, "view", outcome);
        }
    }

    /// Scroll every block into view, returning how many were activated
    pub fn view_all(&mut self) -> usize {
        let activated = self
            .blocks
            .iter_mut()
            .map(DecoratedBlock::intersect)
            .filter(|outcome| *outcome == EventOutcome::Activated)
            .count();
        self.set_status(format!("{} block(s) activated", activated), Color::Green);
        activated
    }

    /// Click the play button of the selected block
    pub fn click_selected(&mut self) {
        let index = self.selected;
        if let Some(block) = self.blocks.get_mut(index) {
            let outcome = block.click_play();
            self.report(index, "click", outcome);
        }
    }

    /// Deliver the readiness signal to the selected block
    pub fn ready_selected(&mut self) {
        let index = self.selected;
        if let Some(block) = self.blocks.get_mut(index) {
            let outcome = block.ready();
            self.report(index, "ready", outcome);
        }
    }

    pub fn ready_all(&mut self) -> usize {
        self.blocks
            .iter_mut()
            .map(DecoratedBlock::ready)
            .filter(|outcome| matches!(outcome, EventOutcome::Ready(_)))
            .count()
    }

    /// Markup of every block, one per line
    pub fn page_html(&self) -> String {
        self.blocks
            .iter()
            .map(DecoratedBlock::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn export_html(&self, path: &Path) -> Result<()> {
        let mut html = self.page_html();
        html.push('\n');
        fs::write(path, html)
            .with_context(|| format!("Failed to write markup to {}", path.display()))?;
        log::info!("Exported {} block(s) to {}", self.blocks.len(), path.display());
        Ok(())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.blocks.len() {
            self.selected += 1;
            self.markup_scroll = 0;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.markup_scroll = 0;
        }
    }

    /// Handle key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.is_command_mode() {
            match key.code {
                KeyCode::Char(c) => self.add_to_command_buffer(c),
                KeyCode::Backspace => self.remove_from_command_buffer(),
                KeyCode::Esc => self.exit_command_mode(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::F(1) | KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Esc if self.show_help => self.show_help = false,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Home => {
                self.selected = 0;
                self.markup_scroll = 0;
            }
            KeyCode::End => {
                self.selected = self.blocks.len().saturating_sub(1);
                self.markup_scroll = 0;
            }
            KeyCode::PageDown => self.markup_scroll = self.markup_scroll.saturating_add(5),
            KeyCode::PageUp => self.markup_scroll = self.markup_scroll.saturating_sub(5),
            KeyCode::Char('v') => self.view_selected(),
            KeyCode::Char('a') => {
                self.view_all();
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.click_selected(),
            KeyCode::Char('r') => self.ready_selected(),
            KeyCode::Char('m') => self.set_reduced_motion(!self.reduced_motion),
            _ => {}
        }

        Ok(())
    }

    /// Update application state
    pub fn update(&mut self) -> Result<()> {
        // Clear status message after timeout
        if let Some((_, time, _)) = &self.status_message {
            if time.elapsed() > Duration::from_secs(5) {
                self.status_message = None;
            }
        }
        if self.selected >= self.blocks.len() {
            self.selected = self.blocks.len().saturating_sub(1);
        }
        Ok(())
    }

    pub fn is_command_mode(&self) -> bool {
        self.command_mode
    }

    pub fn enter_command_mode(&mut self) {
        self.command_mode = true;
        self.command_buffer.clear();
    }

    pub fn exit_command_mode(&mut self) {
        self.command_mode = false;
    }

    pub fn get_command_buffer(&self) -> &str {
        &self.command_buffer
    }

    pub fn add_to_command_buffer(&mut self, c: char) {
        self.command_buffer.push(c);
    }

    pub fn remove_from_command_buffer(&mut self) {
        self.command_buffer.pop();
    }
}

pub fn command_name(command: &MediaCommand) -> &'static str {
    match command {
        MediaCommand::Mute => "mute",
        MediaCommand::Play => "play",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embed_core::{ActivationState, Presentation};

    fn app_with(sources: Vec<BlockContent>) -> App {
        let mut app = App::new(EmbedConfig::default(), false);
        app.load(sources);
        app
    }

    #[test]
    fn test_page_file_forms() {
        let dir = std::env::temp_dir();
        let bare = dir.join("embed_player_bare_page.json");
        fs::write(&bare, r#"[{ "link": "https://youtu.be/abc123" }]"#).unwrap();
        let blocks = load_page(&bare).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].classes, vec!["video".to_string()]);

        let page = dir.join("embed_player_full_page.json");
        fs::write(
            &page,
            r#"{ "pageUrl": "https://example.com/p", "blocks": [{ "text": "clip.mp4" }, { "pageUrl": "https://other.test/" }] }"#,
        )
        .unwrap();
        let blocks = load_page(&page).unwrap();
        assert_eq!(blocks[0].page_url.as_deref(), Some("https://example.com/p"));
        assert_eq!(blocks[1].page_url.as_deref(), Some("https://other.test/"));

        let _ = fs::remove_file(bare);
        let _ = fs::remove_file(page);
    }

    #[test]
    fn test_missing_page_file_has_context() {
        let err = load_page(Path::new("/nonexistent/page.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read page file"));
    }

    #[test]
    fn test_view_and_ready_selected() {
        let mut app = app_with(vec![authored_block("https://vimeo.com/555", false, true, None, None)]);
        app.view_selected();
        assert_eq!(app.blocks[0].state(), ActivationState::Loaded);
        assert!(app.page_html().contains("?autoplay=1&amp;background=1"));

        app.ready_selected();
        assert!(app.blocks[0].block().embed_loaded());
    }

    #[test]
    fn test_toggle_flag_redecorates() {
        let mut app = app_with(vec![authored_block(
            "https://youtu.be/abc123",
            false,
            false,
            Some("/poster.jpg"),
            None,
        )]);
        assert_eq!(app.blocks[0].presentation(), Presentation::Preview { play_button: true });

        app.toggle_flag(AuthoredFlag::Autoplay).unwrap();
        assert!(app.sources[0].has_class("autoplay"));
        assert_eq!(app.blocks[0].presentation(), Presentation::Preview { play_button: false });

        app.toggle_flag(AuthoredFlag::Autoplay).unwrap();
        assert!(!app.sources[0].has_class("autoplay"));
    }

    #[test]
    fn test_toggle_prefers_structured_attribute() {
        let mut source = BlockContent::new().with_data(DataAttributes {
            src: Some("https://vimeo.com/1".into()),
            background: Some("true".into()),
            ..Default::default()
        });
        AuthoredFlag::Background.toggle(&mut source);
        assert_eq!(source.dataset.background.as_deref(), Some("false"));
        assert!(!source.has_class("background"));
    }

    #[test]
    fn test_motion_toggle_resets_blocks() {
        let mut app = app_with(vec![authored_block("https://youtu.be/a", true, false, None, None)]);
        app.view_all();
        assert_eq!(app.blocks[0].state(), ActivationState::Loaded);

        app.set_reduced_motion(true);
        assert_eq!(app.blocks[0].state(), ActivationState::Armed);
        app.view_all();
        assert!(app.page_html().contains("autoplay=0"));
    }

    #[test]
    fn test_add_selects_new_block() {
        let mut app = app_with(Vec::new());
        app.add_reference("clip.mp4");
        app.add_reference("https://youtu.be/b");
        assert_eq!(app.selected, 1);
        app.select_previous();
        assert_eq!(app.block_label(app.selected), "block 1");
    }
}
