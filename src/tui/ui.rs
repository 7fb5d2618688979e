// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! UI rendering for the TUI
//!
//! The chat view is drawn first, then every modal from the bottom of the
//! stack to the top so the newest one ends up in front.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::app::App;
use super::view::{View, ViewKind};
use super::views::Speaker;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(3),    // Conversation
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    draw_title(frame, chunks[0], app);
    draw_messages(frame, chunks[1], app);
    draw_input(frame, chunks[2], app);
    draw_status(frame, chunks[3], app);

    for view in app.modals().iter() {
        draw_modal(frame, frame.area(), view);
    }
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let provider = session.provider_name().unwrap_or("no provider");
    let mode = if session.will_stream() { "stream" } else { "send" };

    let line = Line::from(vec![
        Span::styled(" parley ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("─ ", Style::default().fg(Color::Gray)),
        Span::styled(provider.to_string(), Style::default().fg(Color::White)),
        Span::styled(" ─ ", Style::default().fg(Color::Gray)),
        Span::styled(session.model().to_string(), Style::default().fg(Color::White)),
        Span::styled(format!(" ({})", mode), Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

fn speaker_style(speaker: Speaker) -> Style {
    match speaker {
        Speaker::User => Style::default().fg(Color::Cyan).bold(),
        Speaker::Assistant => Style::default().fg(Color::Green).bold(),
        Speaker::Error => Style::default().fg(Color::Red).bold(),
        Speaker::Info => Style::default().fg(Color::DarkGray),
    }
}

fn push_message<'a>(lines: &mut Vec<Line<'a>>, speaker: Speaker, text: &'a str) {
    let mut rows = text.lines();
    let first = rows.next().unwrap_or("");
    lines.push(Line::from(vec![
        Span::styled(format!("{}: ", speaker.label()), speaker_style(speaker)),
        Span::raw(first),
    ]));
    lines.extend(rows.map(|row| Line::from(format!("  {}", row))));
}

fn draw_messages(frame: &mut Frame, area: Rect, app: &App) {
    let chat = app.chat();
    let mut lines: Vec<Line> = Vec::new();

    if chat.messages().is_empty() && !chat.is_waiting() {
        lines.push(Line::from(Span::styled(
            "Type a message and press Enter. F1 for help, Ctrl+K to set up a provider.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for message in chat.messages() {
        push_message(&mut lines, message.speaker, &message.text);
        lines.push(Line::from(""));
    }
    if let Some(pending) = chat.pending() {
        push_message(&mut lines, Speaker::Assistant, pending);
        if let Some(last) = lines.last_mut() {
            last.push_span(Span::styled("▌", Style::default().fg(Color::Green)));
        }
    }

    // Keep the newest lines in view
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let chat = app.chat();
    let (title, color) = if chat.is_waiting() {
        (" Waiting for reply... ", Color::Yellow)
    } else {
        (" Message ", Color::Cyan)
    };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(chat.input()),
        Span::styled("_", Style::default().fg(color)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title),
    );
    frame.render_widget(input, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match app.status() {
        Some(status) if status.is_error => (
            status.message.as_str(),
            Style::default().fg(Color::Red),
        ),
        Some(status) => (status.message.as_str(), Style::default().fg(Color::Green)),
        None => (
            "Enter send | Ctrl+K setup | F1 help | Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(format!(" {}", text)).style(style), area);
}

fn draw_modal(frame: &mut Frame, area: Rect, view: &dyn View) {
    let (width, height, color) = match view.kind() {
        ViewKind::Flow => (60, 50, Color::Yellow),
        ViewKind::Help => (60, 70, Color::Cyan),
        ViewKind::ConnectionTest => (60, 40, Color::Magenta),
        ViewKind::Chat => (80, 80, Color::White),
    };
    let popup = centered_rect(width, height, area);
    frame.render_widget(Clear, popup);

    let body = Paragraph::new(view.render())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", view.title()))
                .title_style(Style::default().fg(Color::White).bold()),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, popup);
}

/// Helper to create a centered rect using up certain percentage of the available rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatSession;
    use crate::config::Settings;
    use crate::llm::registry::ProviderRegistry;
    use crate::tui::input::InputEvent;
    use ratatui::backend::TestBackend;

    fn create_test_terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(80, 24)).unwrap()
    }

    fn test_app() -> App {
        let mut session = ChatSession::new(ProviderRegistry::builtin(), "gpt-4o-mini");
        session.select_provider("OpenAI Stream").unwrap();
        App::new(session, Settings::default())
    }

    fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
        let mut result = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                let cell = buffer.cell((x, y)).unwrap();
                result.push_str(cell.symbol());
            }
            result.push('\n');
        }
        result
    }

    fn render(app: &App) -> String {
        let mut terminal = create_test_terminal();
        terminal.draw(|f| draw(f, app)).expect("Failed to draw");
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn test_draw_empty_chat() {
        let content = render(&test_app());
        assert!(content.contains("parley"));
        assert!(content.contains("OpenAI Stream"));
        assert!(content.contains("gpt-4o-mini"));
        assert!(content.contains("Type a message"));
        assert!(content.contains("F1 help"));
    }

    #[test]
    fn test_draw_help_overlay() {
        let mut app = test_app();
        app.handle_input(InputEvent::Help);
        let content = render(&app);
        assert!(content.contains(" Help "));
        assert!(content.contains("Ctrl+K"));
    }

    #[test]
    fn test_draw_masked_setup_step() {
        let mut app = test_app();
        app.open_setup();
        app.handle_input(InputEvent::Enter);
        app.handle_input(InputEvent::Enter);
        for c in "sk-secret".chars() {
            app.handle_input(InputEvent::Char(c));
        }

        let content = render(&app);
        assert!(content.contains("API key setup"));
        assert!(content.contains("*********"));
        assert!(!content.contains("sk-secret"));
    }

    #[test]
    fn test_draw_status_error() {
        let mut app = test_app();
        app.set_error("No API key for OpenAI Stream");
        let content = render(&app);
        assert!(content.contains("No API key for OpenAI Stream"));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 80, 24);
        let popup = centered_rect(60, 50, area);
        assert!(popup.width <= 48 && popup.width > 0);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }
}
