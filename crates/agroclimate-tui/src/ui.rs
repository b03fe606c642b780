//! Frame layout and widget rendering.

use agroclimate_core::ChatSnapshot;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::transcript::build_transcript;

const TITLE: &str = "AgroClimate Data-Gov India Analyst";
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const MAX_INPUT_ROWS: usize = 4;

pub fn draw(frame: &mut Frame, app: &mut App, snapshot: &ChatSnapshot) {
    let input_rows = app.input.line_count().min(MAX_INPUT_ROWS);
    let error_rows = u16::from(snapshot.last_error.is_some());
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(error_rows),
        Constraint::Length(input_rows as u16 + 2),
        Constraint::Length(1),
    ])
    .split(frame.size());

    draw_header(frame, chunks[0]);
    draw_transcript(frame, chunks[1], app, snapshot);
    if let Some(error) = &snapshot.last_error {
        draw_error(frame, chunks[2], error);
    }
    draw_input(frame, chunks[3], app, snapshot);
    draw_footer(frame, chunks[4]);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Span::styled(
        TITLE,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn draw_transcript(frame: &mut Frame, area: Rect, app: &mut App, snapshot: &ChatSnapshot) {
    let block = Block::default().borders(Borders::ALL).title(" Conversation ");
    let inner = block.inner(area);

    let lines = build_transcript(snapshot, inner.width as usize);
    let scroll = app.apply_scroll(lines.len(), inner.height as usize);

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(transcript, area);
}

fn draw_error(frame: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(Span::styled(
        error.to_string(),
        Style::default().fg(Color::Red),
    ));
    frame.render_widget(banner, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &mut App, snapshot: &ChatSnapshot) {
    let title = if snapshot.busy {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        Line::from(Span::styled(
            format!(" {spinner} Consulting data.gov.in… "),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(" Ask a question about India's agriculture and climate ")
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);

    let (cursor_row, cursor_col) = app.input.cursor_position();
    let visible_rows = inner.height.max(1) as usize;
    // Keep the cursor row inside the visible window.
    let row_offset = cursor_row.saturating_sub(visible_rows.saturating_sub(1));

    let text_style = if snapshot.busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let lines: Vec<Line> = app
        .input
        .lines()
        .into_iter()
        .map(|line| Line::from(Span::styled(line.to_string(), text_style)))
        .collect();

    let input = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((row_offset as u16, 0));
    frame.render_widget(input, area);

    if !snapshot.busy {
        let x = inner.x + (cursor_col as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_row - row_offset) as u16;
        frame.set_cursor(x, y);
    }
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Span::styled(
        "Enter send · Shift+Enter newline · ↑/↓ PgUp/PgDn scroll · Esc quit",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use agroclimate_core::{
        AnalystError, ChatController, Message, QueryGateway, QueryReply, Result,
    };
    use async_trait::async_trait;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    struct NullGateway;

    #[async_trait]
    impl QueryGateway for NullGateway {
        async fn run_query(&self, _prompt: &str) -> Result<QueryReply> {
            Err(AnalystError::gateway("unused"))
        }
    }

    fn render(snapshot: &ChatSnapshot) -> Terminal<TestBackend> {
        let mut app = App::new(ChatController::new(Arc::new(NullGateway)));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app, snapshot)).unwrap();
        terminal
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn draws_header_input_and_error_banner() {
        let snapshot = ChatSnapshot {
            messages: vec![Message::user("hello")],
            busy: false,
            last_error: Some("Failed to get response from the assistant.".to_string()),
        };
        let text = buffer_text(&render(&snapshot));
        assert!(text.contains(TITLE));
        assert!(text.contains("Failed to get response"));
        assert!(text.contains("Ask a question"));
    }

    #[test]
    fn transcripts_beyond_u16_scroll_range_still_render() {
        let snapshot = ChatSnapshot {
            messages: vec![Message::assistant("line\n\n".repeat(40_000), Vec::new())],
            busy: false,
            last_error: None,
        };
        // Auto-scroll pushes the offset past u16::MAX display lines; the
        // draw must clamp instead of wrapping around.
        let terminal = render(&snapshot);
        assert!(buffer_text(&terminal).contains("Conversation"));
    }
}
