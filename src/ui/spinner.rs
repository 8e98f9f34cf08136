//! Request indicator drawn over the form border while a fetch is running.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::fetch::FetchPhase;
use crate::ui::theme::Theme;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Shows `⠋ loading` in the top-right corner of `area` for
/// [`FetchPhase::Fetching`]; draws nothing when idle.
pub struct FetchIndicator {
    pub phase: FetchPhase,
    /// Advances the spinner frame.
    pub tick: u64,
}

impl Widget for FetchIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.phase == FetchPhase::Idle || area.height == 0 {
            return;
        }
        let frame = SPINNER_FRAMES[(self.tick % SPINNER_FRAMES.len() as u64) as usize];
        let label = format!(" {frame} loading ");
        let width = label.chars().count() as u16;
        // Keep clear of the corner glyph.
        if area.width < width + 2 {
            return;
        }
        buf.set_line(
            area.right() - width - 1,
            area.y,
            &Line::from(Span::styled(label, Theme::spinner_style())),
            width,
        );
    }
}
