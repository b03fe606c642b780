//! Multi-line input buffer for the question box.

/// Editable text buffer with a character-indexed cursor.
///
/// Supports multi-line editing; Enter-to-submit versus Shift/Alt+Enter for
/// a literal line break is decided by the key handler, not here.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    /// Cursor position in characters, 0..=char_count.
    cursor: usize,
}

impl InputState {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// True when the buffer is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Takes the buffer contents, leaving the input cleared.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn insert_char(&mut self, ch: char) {
        let index = self.byte_index();
        self.buffer.insert(index, ch);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index();
        self.buffer.remove(index);
    }

    pub fn delete(&mut self) {
        let index = self.byte_index();
        if index < self.buffer.len() {
            self.buffer.remove(index);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    /// Moves to the start of the current line.
    pub fn move_home(&mut self) {
        let (row, _) = self.cursor_position();
        self.cursor = self.line_start(row);
    }

    /// Moves to the end of the current line.
    pub fn move_end(&mut self) {
        let (row, _) = self.cursor_position();
        let start = self.line_start(row);
        let len = self.lines().get(row).map_or(0, |l| l.chars().count());
        self.cursor = start + len;
    }

    pub fn lines(&self) -> Vec<&str> {
        // `split` keeps a trailing empty line, unlike `str::lines`.
        self.buffer.split('\n').collect()
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }

    /// Cursor position as (row, column) in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut remaining = self.cursor;
        for (row, line) in self.lines().iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                return (row, remaining);
            }
            remaining -= len + 1;
        }
        (self.line_count().saturating_sub(1), 0)
    }

    fn line_start(&self, row: usize) -> usize {
        self.lines()
            .iter()
            .take(row)
            .map(|line| line.chars().count() + 1)
            .sum()
    }

    fn byte_index(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.buffer.len())
    }
}
