//! Transcript rendering: messages to display lines.
//!
//! Builds the scrollable line buffer from a [`ChatSnapshot`], wrapping to
//! the viewport width so scroll offsets stay in display-line units.

use agroclimate_core::{ChatSnapshot, Message, Role};
use ratatui::layout::Alignment;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::markdown::render_markdown;

const USER_LABEL: &str = "You";
const ASSISTANT_LABEL: &str = "Analyst";

/// Builds the full transcript, oldest message first, wrapped to `width`.
pub fn build_transcript(snapshot: &ChatSnapshot, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, message) in snapshot.messages.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        match message.role {
            Role::User => push_user_turn(&mut lines, message, width),
            Role::Assistant => push_assistant_turn(&mut lines, message, width),
        }
    }
    lines
}

fn push_user_turn(lines: &mut Vec<Line<'static>>, message: &Message, width: usize) {
    lines.push(
        Line::from(Span::styled(
            USER_LABEL,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
    );
    let style = Style::default().fg(Color::Cyan);
    for raw_line in message.text.lines() {
        let line = Line::from(Span::styled(raw_line.to_string(), style));
        for wrapped in wrap_line(line, width) {
            lines.push(wrapped.alignment(Alignment::Right));
        }
    }
}

fn push_assistant_turn(lines: &mut Vec<Line<'static>>, message: &Message, width: usize) {
    lines.push(Line::from(Span::styled(
        ASSISTANT_LABEL,
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )));
    for line in render_markdown(&message.text) {
        lines.extend(wrap_line(line, width));
    }
    if message.has_sources() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Sources:",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        for source in &message.sources {
            let link_style = Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED);
            let line = Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::DarkGray)),
                Span::styled(source.label().to_string(), link_style),
            ]);
            lines.extend(wrap_line(line, width));
            // Show the locator itself when the label hides it.
            if source.label() != source.uri {
                let uri_line = Line::from(Span::styled(
                    format!("  {}", source.uri),
                    Style::default().fg(Color::DarkGray),
                ));
                lines.extend(wrap_line(uri_line, width));
            }
        }
    }
}

/// Word-wraps one styled line to `width` columns, preserving span styles.
///
/// Tokens keep their trailing space so table padding survives; a token
/// longer than the width is hard-broken at character boundaries.
pub fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let alignment = line.alignment;
    let mut wrapped: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    let mut flush = |current: &mut Vec<Span<'static>>, current_width: &mut usize| {
        let mut line = Line::from(std::mem::take(current));
        line.alignment = alignment;
        wrapped.push(line);
        *current_width = 0;
    };

    for span in line.spans {
        let style = span.style;
        for token in split_tokens(&span.content) {
            let mut token = token;
            let mut token_width = token.chars().count();
            if current_width + token_width > width && current_width > 0 {
                flush(&mut current, &mut current_width);
                // Leading whitespace is meaningless at a wrap break.
                if token.trim().is_empty() {
                    continue;
                }
                token = token.trim_start().to_string();
                token_width = token.chars().count();
            }
            while token_width > width {
                let split_at = token
                    .char_indices()
                    .nth(width)
                    .map(|(index, _)| index)
                    .unwrap_or(token.len());
                let head = token[..split_at].to_string();
                token = token[split_at..].to_string();
                token_width = token.chars().count();
                current.push(Span::styled(head, style));
                flush(&mut current, &mut current_width);
            }
            if !token.is_empty() {
                current.push(Span::styled(token, style));
                current_width += token_width;
            }
        }
    }

    if !current.is_empty() || wrapped.is_empty() {
        let mut line = Line::from(current);
        line.alignment = alignment;
        wrapped.push(line);
    }
    wrapped
}

/// Splits text into word tokens, each keeping its trailing spaces.
fn split_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_spaces = false;
    for ch in text.chars() {
        if ch == ' ' {
            in_spaces = true;
            current.push(ch);
        } else {
            if in_spaces {
                tokens.push(std::mem::take(&mut current));
                in_spaces = false;
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroclimate_core::Source;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn plain(text: &str) -> Line<'static> {
        Line::from(Span::raw(text.to_string()))
    }

    #[test]
    fn short_lines_pass_through() {
        let wrapped = wrap_line(plain("hello world"), 40);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(line_text(&wrapped[0]), "hello world");
    }

    #[test]
    fn long_lines_wrap_at_word_boundaries() {
        let wrapped = wrap_line(plain("annual rainfall in Maharashtra"), 16);
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["annual rainfall ", "in Maharashtra"]);
    }

    #[test]
    fn oversized_tokens_are_hard_broken() {
        let wrapped = wrap_line(plain("https://data.gov.in/catalog/rainfall"), 12);
        assert!(wrapped.len() >= 3);
        assert!(wrapped.iter().all(|l| line_text(l).chars().count() <= 12));
    }

    #[test]
    fn empty_line_survives_wrapping() {
        let wrapped = wrap_line(Line::default(), 10);
        assert_eq!(wrapped.len(), 1);
        assert!(line_text(&wrapped[0]).is_empty());
    }

    #[test]
    fn transcript_renders_citation_block_only_with_sources() {
        let snapshot = ChatSnapshot {
            messages: vec![
                Message::assistant("no sources here", Vec::new()),
                Message::assistant(
                    "grounded",
                    vec![Source::new("http://data.gov.in/ds1", "Rainfall Dataset")],
                ),
            ],
            busy: false,
            last_error: None,
        };
        let lines = build_transcript(&snapshot, 80);
        let texts: Vec<String> = lines.iter().map(|l| line_text(l)).collect();
        assert_eq!(texts.iter().filter(|t| t.as_str() == "Sources:").count(), 1);
        assert!(texts.iter().any(|t| t.contains("Rainfall Dataset")));
        assert!(texts.iter().any(|t| t.contains("http://data.gov.in/ds1")));
    }

    #[test]
    fn user_turns_are_right_aligned() {
        let snapshot = ChatSnapshot {
            messages: vec![Message::user("question")],
            busy: false,
            last_error: None,
        };
        let lines = build_transcript(&snapshot, 80);
        assert!(
            lines
                .iter()
                .all(|line| line.alignment == Some(Alignment::Right))
        );
    }
}
