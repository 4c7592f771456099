use embed_core::{ActivationState, DecoratedBlock, Presentation};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Colored badge for a block's activation state and loaded flag
pub fn state_badge(block: &DecoratedBlock) -> Span<'static> {
    let (label, color) = match (block.state(), block.block().embed_loaded()) {
        (ActivationState::Loaded, true) => ("LOADED ✔", Color::LightGreen),
        (ActivationState::Loaded, false) => ("LOADED", Color::Green),
        (ActivationState::Armed, _) if block.is_observing() => ("ARMED 👁", Color::Yellow),
        (ActivationState::Armed, _) => ("ARMED ▶", Color::Yellow),
        (ActivationState::Idle, _) => ("IDLE", Color::DarkGray),
    };
    Span::styled(
        format!("[{:<9}]", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Short description of what a block shows
pub fn presentation_label(presentation: Presentation) -> &'static str {
    match presentation {
        Presentation::NoMedia => "no media",
        Presentation::InvalidReference => "invalid URL",
        Presentation::Preview { play_button: true } => "preview + play",
        Presentation::Preview { play_button: false } => "preview",
        Presentation::Deferred => "deferred",
        Presentation::Embedded => "embedded",
    }
}

/// Break serialized markup before every tag so it reads as one tag per line
pub fn markup_lines(html: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut depth: usize = 0;
    let mut rest = html;

    while !rest.is_empty() {
        let end = if rest.starts_with('<') {
            rest.find('>').map_or(rest.len(), |i| i + 1)
        } else {
            rest.find('<').unwrap_or(rest.len())
        };
        let (piece, tail) = rest.split_at(end);
        rest = tail;

        let closing = piece.starts_with("</");
        if closing {
            depth = depth.saturating_sub(1);
        }

        let color = if piece.starts_with('<') { Color::Cyan } else { Color::White };
        lines.push(Line::from(vec![
            Span::raw("  ".repeat(depth)),
            Span::styled(piece.to_string(), Style::default().fg(color)),
        ]));

        if piece.starts_with('<') && !closing && !is_void(piece) {
            depth += 1;
        }
    }

    lines
}

fn is_void(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>')
        .next()
        .unwrap_or("");
    matches!(name, "br" | "img" | "source" | "input" | "hr" | "meta" | "link")
}

/// Display a status message with fade effect
pub struct StatusMessage<'a> {
    message: &'a str,
    color: Color,
    age: Duration,
    max_age: Duration,
}

impl<'a> StatusMessage<'a> {
    pub fn new(message: &'a str, color: Color, age: Duration) -> Self {
        Self {
            message,
            color,
            age,
            max_age: Duration::from_secs(3), // Default fade after 3 seconds
        }
    }

    pub fn max_age(mut self, duration: Duration) -> Self {
        self.max_age = duration;
        self
    }
}

impl<'a> Widget for StatusMessage<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fade_factor = if self.age > self.max_age {
            0.0
        } else {
            1.0 - (self.age.as_secs_f32() / self.max_age.as_secs_f32())
        };

        if fade_factor <= 0.0 {
            return;
        }

        let color = match (self.color, fade_factor) {
            (Color::Red, _) => Color::Red, // Errors always stay red
            (_, f) if f > 0.7 => self.color,
            _ => Color::DarkGray,
        };

        let text = Paragraph::new(Text::from(self.message))
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .style(Style::default().bg(Color::Black)),
            );

        let message_width = self.message.width() as u16 + 4; // Add space for borders
        let message_area = Rect {
            x: area.x + (area.width.saturating_sub(message_width)) / 2,
            y: area.y,
            width: message_width.min(area.width),
            height: area.height.min(3),
        };

        Clear.render(message_area, buf);
        text.render(message_area, buf);
    }
}

/// Help overlay listing keys and commands
pub struct HelpOverlay {
    show_commands: bool,
}

impl HelpOverlay {
    pub fn new(show_commands: bool) -> Self {
        Self { show_commands }
    }
}

fn help_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" - "),
        Span::raw(description),
    ])
}

fn heading(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            heading("Keyboard Controls"),
            Line::from(""),
            help_line("↑/↓", "Select block"),
            help_line("v", "Scroll selected block into view"),
            help_line("a", "Scroll every block into view"),
            help_line("Enter/Space", "Click play"),
            help_line("r", "Deliver readiness signal"),
            help_line("m", "Toggle reduced motion"),
            help_line("PgUp/PgDn", "Scroll markup"),
            help_line(":", "Command mode"),
            help_line("h/F1", "Toggle help"),
            help_line("q/Ctrl+Q", "Quit"),
        ];

        if self.show_commands {
            lines.extend([
                Line::from(""),
                heading("Commands"),
                help_line("open <ref>", "Replace page with one block"),
                help_line("add <ref>", "Append a block"),
                help_line("autoplay / background", "Toggle flag on selected block"),
                help_line("motion on|off", "Allow or reduce motion"),
                help_line("view [all] / click / ready", "Drive the selected block"),
                help_line("reset", "Decorate the page again"),
                help_line("export <path>", "Write page markup"),
            ]);
        }

        let help = Paragraph::new(Text::from(lines))
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .style(Style::default().fg(Color::White).bg(Color::Black))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });

        Clear.render(area, buf);
        help.render(area, buf);
    }
}

/// Get a spinner frame for loading animations
pub fn get_spinner_frame(duration_ms: u128) -> &'static str {
    const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"];
    let frame_idx = (duration_ms / 80) % SPINNER_FRAMES.len() as u128;
    SPINNER_FRAMES[frame_idx as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_markup_lines_indent_nested_tags() {
        let lines = markup_lines(r#"<div><video controls><source src="a.mp4"></video></div>"#);
        let flat: Vec<String> = lines.iter().map(flatten).collect();
        assert_eq!(
            flat,
            vec![
                "<div>",
                "  <video controls>",
                "    <source src=\"a.mp4\">",
                "  </video>",
                "</div>",
            ]
        );
    }

    #[test]
    fn test_markup_lines_text_and_void() {
        let lines = markup_lines("<p>hi<br>there</p>");
        let flat: Vec<String> = lines.iter().map(flatten).collect();
        assert_eq!(flat, vec!["<p>", "  hi", "  <br>", "  there", "</p>"]);
    }

    #[test]
    fn test_spinner_cycles() {
        assert_eq!(get_spinner_frame(0), get_spinner_frame(800));
        assert_ne!(get_spinner_frame(0), get_spinner_frame(80));
    }
}
