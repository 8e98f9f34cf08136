//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: URL field on top, the form below, a hint bar at
/// the bottom.
pub struct AppLayout {
    pub url_area: Rect,
    pub form_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // bordered URL input
                Constraint::Min(3),    // form pane (takes all remaining space)
                Constraint::Length(1), // key hints
            ])
            .split(area);

        Self {
            url_area: chunks[0],
            form_area: chunks[1],
            status_area: chunks[2],
        }
    }

    /// Area inside the form border, minus the scrollbar column.  Widgets
    /// are laid out (and images sized) against this.
    pub fn form_content(&self) -> Rect {
        let a = self.form_area;
        Rect::new(
            a.x.saturating_add(1),
            a.y.saturating_add(1),
            a.width.saturating_sub(3),
            a.height.saturating_sub(2),
        )
    }
}

pub fn point_in_rect(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}
