//! Single-line URL input — edit buffer plus its widget.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::core::status::Status;
use crate::ui::theme::Theme;

/// Edit buffer with a char-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct UrlField {
    text: String,
    cursor: usize,
}

impl UrlField {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Insert pasted text; line breaks are dropped.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert(c);
        }
    }

    /// Returns `true` if the text changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Returns `true` if the text changed.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Returns `true` if the text changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.text.is_empty();
        self.text.clear();
        self.cursor = 0;
        changed
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// First visible char so that the cursor fits in `width` columns.
    fn scroll_start(&self, width: usize) -> usize {
        if width == 0 {
            return self.cursor;
        }
        self.cursor.saturating_sub(width - 1)
    }
}

/// The bordered input box.  The status label sits in the top-right title.
pub struct UrlFieldWidget<'a> {
    pub field: &'a UrlField,
    pub status: Status,
    pub focused: bool,
}

impl UrlFieldWidget<'_> {
    /// Where the terminal cursor goes when the field has focus.
    pub fn cursor_position(&self, area: Rect) -> Position {
        let width = area.width.saturating_sub(2) as usize;
        let start = self.field.scroll_start(width);
        Position::new(
            area.x + 1 + (self.field.cursor() - start) as u16,
            area.y + 1,
        )
    }
}

impl Widget for UrlFieldWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .title(Line::from(Span::styled(" JSON URL ", Theme::title_style())))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style(self.focused));
        if self.status != Status::Empty {
            block = block.title(
                Line::from(Span::styled(
                    format!(" {} ", self.status.label()),
                    Theme::status_style(self.status),
                ))
                .right_aligned(),
            );
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let start = self.field.scroll_start(inner.width as usize);
        let visible: String = self
            .field
            .text
            .chars()
            .skip(start)
            .take(inner.width as usize)
            .collect();
        Paragraph::new(Line::from(Span::styled(visible, Theme::url_input_style())))
            .render(inner, buf);
    }
}
