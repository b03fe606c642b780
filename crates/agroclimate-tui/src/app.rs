//! Application event loop and key handling.

use std::time::Duration;

use agroclimate_core::ChatController;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::input::InputState;

/// Repaint interval; also paces the busy spinner.
const TICK: Duration = Duration::from_millis(100);

pub struct App {
    pub(crate) controller: ChatController,
    pub(crate) input: InputState,
    pub(crate) scroll: usize,
    pub(crate) auto_scroll: bool,
    pub(crate) viewport_height: usize,
    pub(crate) spinner_frame: usize,
    seen_messages: usize,
    seen_busy: bool,
    should_quit: bool,
}

impl App {
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            input: InputState::default(),
            scroll: 0,
            auto_scroll: true,
            viewport_height: 0,
            spinner_frame: 0,
            seen_messages: 0,
            seen_busy: false,
            should_quit: false,
        }
    }

    /// Runs the UI until the user quits. Query completions surface through
    /// the controller snapshot polled each frame.
    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            let snapshot = self.controller.snapshot().await;
            if snapshot.messages.len() != self.seen_messages || snapshot.busy != self.seen_busy {
                // Jump to the newest entry whenever the store or busy flag
                // changes.
                self.auto_scroll = true;
                self.seen_messages = snapshot.messages.len();
                self.seen_busy = snapshot.busy;
            }

            terminal.draw(|frame| crate::ui::draw(frame, &mut self, &snapshot))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()?
                    && key.kind == KeyEventKind::Press
                {
                    self.handle_key(key, snapshot.busy);
                }
            } else if snapshot.busy {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, busy: bool) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            // Plain Enter confirms; Shift/Alt+Enter inserts a line break.
            KeyCode::Enter if key.modifiers.is_empty() => self.submit(busy),
            KeyCode::Enter => self.input.insert_newline(),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(self.viewport_height.max(1)),
            KeyCode::PageDown => self.scroll_down(self.viewport_height.max(1)),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert_char(ch);
            }
            _ => {}
        }
    }

    fn submit(&mut self, busy: bool) {
        if busy || self.input.is_blank() {
            return;
        }
        let text = self.input.take();
        tracing::debug!(chars = text.len(), "spawning submission");
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.submit(&text).await });
    }

    fn scroll_up(&mut self, amount: usize) {
        self.auto_scroll = false;
        self.scroll = self.scroll.saturating_sub(amount);
    }

    fn scroll_down(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_add(amount);
    }

    /// Clamps the scroll offset after layout and re-engages auto-scroll when
    /// the view reaches the bottom. Called by the renderer once the
    /// transcript height is known.
    pub(crate) fn apply_scroll(&mut self, total_lines: usize, viewport_height: usize) -> usize {
        self.viewport_height = viewport_height;
        let max_scroll = total_lines.saturating_sub(viewport_height);
        if self.auto_scroll || self.scroll >= max_scroll {
            self.scroll = max_scroll;
            self.auto_scroll = true;
        }
        self.scroll
    }
}
