use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::components::{
    HelpOverlay, StatusMessage, get_spinner_frame, markup_lines, presentation_label, state_badge,
};
use crate::app::App;

/// Draw the page view: block list on the left, markup of the selection on the right
pub fn draw_page_view(f: &mut Frame, app: &App, area: Rect) {
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(5),    // Blocks and markup
            Constraint::Length(3), // Selected block details
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    draw_block_list(f, app, body[0]);
    draw_markup_pane(f, app, body[1]);
    draw_details(f, app, chunks[2]);

    let status_text = "↑/↓: Select | v: View | a: View all | Enter: Play | r: Ready | m: Motion | :: Command | F1: Help | q: Quit";
    let status = Paragraph::new(Text::from(status_text))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    f.render_widget(status, chunks[3]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let motion = if app.reduced_motion {
        Span::styled("reduced motion", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("motion allowed", Style::default().fg(Color::Green))
    };
    let line = Line::from(vec![
        Span::raw(format!("{} block(s) | ", app.blocks.len())),
        motion,
    ]);

    let title = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Embed Player ")
            .title_alignment(Alignment::Center),
    );
    f.render_widget(title, area);
}

fn draw_block_list(f: &mut Frame, app: &App, area: Rect) {
    let elapsed = app.started.elapsed().as_millis();
    let items: Vec<ListItem> = app
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let mut spans = vec![
                state_badge(block),
                Span::raw(" "),
                Span::styled(app.block_label(index), Style::default().fg(Color::White)),
                Span::styled(
                    format!(" ({})", presentation_label(block.presentation())),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if block.readiness_signal().is_some() {
                spans.push(Span::styled(
                    format!(" {}", get_spinner_frame(elapsed)),
                    Style::default().fg(Color::Cyan),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut list_state = ListState::default();
    if !app.blocks.is_empty() {
        list_state.select(Some(app.selected));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Blocks "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_markup_pane(f: &mut Frame, app: &App, area: Rect) {
    let lines = match app.selected_block() {
        Some(block) => markup_lines(&block.to_html()),
        None => vec![Line::from(Span::styled(
            "No blocks. Use :open <reference> to create one.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let markup = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Markup "))
        .wrap(Wrap { trim: false })
        .scroll((app.markup_scroll, 0));
    f.render_widget(markup, area);
}

fn draw_details(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.selected_block() {
        Some(block) => {
            let reference = block
                .reference()
                .map(|r| r.uri().to_string())
                .unwrap_or_else(|| "none".to_string());
            let flags = block.flags();
            let mut spans = vec![
                Span::styled("ref: ", Style::default().fg(Color::Green)),
                Span::raw(reference),
                Span::styled("  autoplay: ", Style::default().fg(Color::Green)),
                Span::raw(flags.autoplay_requested.to_string()),
                Span::styled("  background: ", Style::default().fg(Color::Green)),
                Span::raw(flags.background_requested.to_string()),
            ];
            if let Some(error) = block.error() {
                spans.push(Span::styled(
                    format!("  {}", error),
                    Style::default().fg(Color::Red),
                ));
            }
            Line::from(spans)
        }
        None => Line::from(""),
    };

    let details = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(" Selected "));
    f.render_widget(details, area);
}

/// Draw status message with fade effect
pub fn draw_status_message(f: &mut Frame, message: &str, color: Color, age: Duration) {
    let status_message = StatusMessage::new(message, color, age).max_age(Duration::from_secs(3));

    let area = f.area();
    let message_width = message.width() as u16 + 4; // Add space for borders
    let message_area = Rect {
        x: area.x + (area.width.saturating_sub(message_width)) / 2,
        y: area.y + area.height.saturating_sub(8), // Show near the bottom
        width: message_width.min(area.width),
        height: 3u16.min(area.height),
    };

    f.render_widget(status_message, message_area);
}

/// Draw command prompt
pub fn draw_command_prompt(f: &mut Frame, command: &str) {
    let area = f.area();
    let prompt_area = Rect::new(0, area.height.saturating_sub(3), area.width, 3.min(area.height));

    let prompt_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, prompt_area);
    f.render_widget(&prompt_block, prompt_area);

    let inner_area = prompt_block.inner(prompt_area);
    let command_para = Paragraph::new(Text::from(format!(":{}", command)))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left);

    f.render_widget(command_para, inner_area);
    f.set_cursor_position((inner_area.x + 1 + command.width() as u16, inner_area.y));
}

/// Draw help dialog
pub fn draw_help_dialog(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);
    f.render_widget(HelpOverlay::new(true), area);
}

/// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
