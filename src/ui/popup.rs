//! Informational pop-up shown when a widget is activated.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

pub const INFO_TITLE: &str = "Информация об объекте";
pub const INFO_MISSING: &str = "Информация отсутствует.";
pub const CLOSE_LABEL: &str = "Закрыть";

/// Centered alert with the widget's description and a close button.
pub struct InfoPopup<'a> {
    /// `None` or a blank message renders the "no information" fallback.
    pub message: Option<&'a str>,
}

impl Widget for InfoPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(INFO_MISSING);
        let message_lines = message.lines().count().max(1) as u16;
        // message + blank + button + blank top + 2 border
        let height = message_lines + 5;
        let popup = centered_fixed(56, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(format!(" {INFO_TITLE} "))
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        lines.extend(message.lines().map(|l| Line::raw(l.to_string())));
        lines.push(Line::raw(""));
        lines.push(
            Line::from(Span::styled(
                format!("[ {CLOSE_LABEL} ]"),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

/// Message for a choice widget whose option just changed.
pub fn choice_changed_message(info: &str, option: usize) -> String {
    format!("{info}\nВыбранный вариант: {}", option + 1)
}

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(message: Option<&str>) -> String {
        let area = Rect::new(0, 0, 70, 20);
        let mut buf = Buffer::empty(area);
        InfoPopup { message }.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn shows_message_lines_and_close_button() {
        let screen = rendered(Some("Имя: a\nID: 0\nТекст: hi"));
        assert!(screen.contains(INFO_TITLE));
        assert!(screen.contains("Имя: a"));
        assert!(screen.contains("Текст: hi"));
        assert!(screen.contains(CLOSE_LABEL));
    }

    #[test]
    fn falls_back_when_no_message() {
        assert!(rendered(None).contains(INFO_MISSING));
        assert!(rendered(Some("  ")).contains(INFO_MISSING));
    }

    #[test]
    fn choice_message_is_one_based() {
        assert_eq!(
            choice_changed_message("Имя: c", 0),
            "Имя: c\nВыбранный вариант: 1"
        );
    }

    #[test]
    fn centered_fixed_clamps_to_area() {
        assert_eq!(centered_fixed(56, 9, Rect::new(0, 0, 40, 5)), Rect::new(0, 0, 40, 5));
        assert_eq!(centered_fixed(10, 4, Rect::new(0, 0, 20, 10)), Rect::new(5, 3, 10, 4));
    }
}
