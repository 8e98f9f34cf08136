//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::status::Status;

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── status label ───────────────────────────────────────────
    pub fn status_style(status: Status) -> Style {
        let base = Style::default().add_modifier(Modifier::BOLD);
        match status {
            Status::Success => base.fg(Color::Green),
            Status::Fail => base.fg(Color::Red),
            Status::Empty => base.fg(Color::Reset),
        }
    }

    pub fn spinner_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    // ── widgets ────────────────────────────────────────────────
    pub fn widget_border_style(selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    pub fn text_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn segment_style(active: bool) -> Style {
        if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    /// Grey pill drawn over the bottom of an image.
    pub fn caption_style() -> Style {
        Style::default().fg(Color::Black).bg(Color::Rgb(153, 153, 153))
    }

    pub fn placeholder_style() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style(focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::LightBlue)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn url_input_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
