//! Markdown to ratatui text conversion.
//!
//! Assistant answers arrive as markdown (tables for comparisons, lists for
//! items, a trailing Sources heading). This renders them into styled
//! [`Line`]s instead of showing literal markup.

use pulldown_cmark::{Alignment, Event, HeadingLevel, Options, Parser, Tag};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Renders a markdown document into styled lines, one block at a time.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    bold: usize,
    italic: usize,
    heading: Option<HeadingLevel>,
    link: bool,
    in_code_block: bool,
    blockquote_depth: usize,
    /// One entry per open list; `Some(n)` carries the next ordered index.
    list_stack: Vec<Option<u64>>,
    in_table: bool,
    in_table_head: bool,
    table_alignments: Vec<Alignment>,
    table_header: Vec<String>,
    table_rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    current_cell: String,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if self.in_table {
                    self.current_cell.push_str(&code);
                } else {
                    self.current
                        .push(Span::styled(code.into_string(), inline_code_style()));
                }
            }
            Event::SoftBreak => {
                if self.in_table {
                    self.current_cell.push(' ');
                } else {
                    self.push_text(" ");
                }
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.blank();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(32),
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank();
            }
            // Raw HTML, footnotes, and task markers have no terminal rendering.
            Event::Html(_) | Event::FootnoteReference(_) | Event::TaskListMarker(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.flush();
                    self.blank();
                }
            }
            Tag::Heading(level, _, _) => {
                self.flush();
                self.blank();
                self.heading = Some(level);
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.blank();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.flush();
                    self.blank();
                }
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.list_stack.len().saturating_sub(1);
                let indent = "  ".repeat(depth);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(index)) => {
                        let marker = format!("{indent}{index}. ");
                        *index += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.current
                    .push(Span::styled(marker, Style::default().fg(Color::Yellow)));
            }
            Tag::Strong => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::Link(..) => self.link = true,
            Tag::BlockQuote => {
                self.flush();
                if self.blockquote_depth == 0 {
                    self.blank();
                }
                self.blockquote_depth += 1;
            }
            Tag::Table(alignments) => {
                self.flush();
                self.blank();
                self.in_table = true;
                self.table_alignments = alignments;
                self.table_header.clear();
                self.table_rows.clear();
            }
            Tag::TableHead => self.in_table_head = true,
            Tag::TableRow => self.current_row.clear(),
            Tag::TableCell => self.current_cell.clear(),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.flush();
                }
            }
            Tag::Heading(..) => {
                self.flush();
                self.heading = None;
                self.blank();
            }
            Tag::CodeBlock(_) => {
                self.in_code_block = false;
                self.blank();
            }
            Tag::List(_) => {
                self.flush();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank();
                }
            }
            Tag::Item => self.flush(),
            Tag::Strong => self.bold = self.bold.saturating_sub(1),
            Tag::Emphasis => self.italic = self.italic.saturating_sub(1),
            Tag::Link(..) => self.link = false,
            Tag::BlockQuote => {
                self.flush();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                if self.blockquote_depth == 0 {
                    self.blank();
                }
            }
            Tag::Table(_) => {
                self.emit_table();
                self.in_table = false;
                self.blank();
            }
            Tag::TableHead => {
                self.in_table_head = false;
                self.table_header = std::mem::take(&mut self.current_row);
            }
            Tag::TableRow => {
                let row = std::mem::take(&mut self.current_row);
                self.table_rows.push(row);
            }
            Tag::TableCell => {
                let cell = std::mem::take(&mut self.current_cell);
                self.current_row.push(cell);
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_table {
            self.current_cell.push_str(text);
        } else if self.in_code_block {
            for line in text.lines() {
                self.lines.push(Line::from(Span::styled(
                    format!("  {line}"),
                    Style::default().fg(Color::Gray),
                )));
            }
        } else {
            self.push_text(text);
        }
    }

    fn push_text(&mut self, text: &str) {
        self.current
            .push(Span::styled(text.to_string(), self.current_style()));
    }

    fn current_style(&self) -> Style {
        let mut style = match self.heading {
            Some(HeadingLevel::H1) => Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Some(HeadingLevel::H2) => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            Some(_) => Style::default().add_modifier(Modifier::BOLD),
            None => Style::default(),
        };
        if self.bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.link {
            style = style
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED);
        }
        style
    }

    fn emit_table(&mut self) {
        let header = std::mem::take(&mut self.table_header);
        let rows = std::mem::take(&mut self.table_rows);
        let columns = header
            .len()
            .max(rows.iter().map(|row| row.len()).max().unwrap_or(0));
        if columns == 0 {
            return;
        }

        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&header).chain(rows.iter()) {
            for (index, cell) in row.iter().enumerate() {
                widths[index] = widths[index].max(cell.chars().count());
            }
        }

        if !header.is_empty() {
            let text = format_row(&header, &widths, &self.table_alignments);
            self.lines.push(Line::from(Span::styled(
                text,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            self.lines.push(Line::from(Span::styled(
                rule.join("──"),
                Style::default().fg(Color::DarkGray),
            )));
        }
        for row in &rows {
            self.lines.push(Line::from(format_row(
                row,
                &widths,
                &self.table_alignments,
            )));
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let mut spans = std::mem::take(&mut self.current);
            if self.blockquote_depth > 0 {
                spans.insert(
                    0,
                    Span::styled(
                        "│ ".repeat(self.blockquote_depth),
                        Style::default().fg(Color::DarkGray),
                    ),
                );
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn blank(&mut self) {
        if matches!(self.lines.last(), Some(line) if !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while matches!(self.lines.last(), Some(line) if line.spans.is_empty()) {
            self.lines.pop();
        }
        while matches!(self.lines.first(), Some(line) if line.spans.is_empty()) {
            self.lines.remove(0);
        }
        self.lines
    }
}

fn format_row(row: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let cell = row.get(index).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.chars().count());
            match alignments.get(index) {
                Some(Alignment::Right) => format!("{}{cell}", " ".repeat(pad)),
                Some(Alignment::Center) => {
                    let left = pad / 2;
                    format!("{}{cell}{}", " ".repeat(left), " ".repeat(pad - left))
                }
                _ => format!("{cell}{}", " ".repeat(pad)),
            }
        })
        .collect();
    cells.join("  ").trim_end().to_string()
}

fn inline_code_style() -> Style {
    Style::default().fg(Color::Cyan)
}
