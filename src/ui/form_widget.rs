//! Form pane — draws the widget stack with a vertical scroll offset.
//!
//! ## Architecture
//!
//! * **State** (`FormState`) — selection and scroll offset, owned by
//!   `AppState`.
//! * **Geometry** (`hit_test`, `segment_rects`) — pure layout math shared
//!   between the widget (rendering) and the handler (mouse hit-testing).
//! * **Widget** (`FormWidget`) — paints only the widgets that overlap the
//!   scroll window.  Images resample just their visible rows; the small
//!   bordered widgets are drawn whole into a scratch buffer and their
//!   visible rows copied, so a border cut by the viewport edge stays right.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::app::net_runtime::LoadedImage;
use crate::core::render::{
    Placement, RenderedWidget, WidgetStack, WidgetView, FIXED_WIDGET_HEIGHT, WIDGET_GAP,
};
use crate::ui::{image::render_halfblocks, theme::Theme};

// ─── state ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct FormState {
    /// Index into the stack of the highlighted widget.
    pub selected: usize,
    /// First visible content row.
    pub offset: u32,
}

impl FormState {
    pub fn select_next(&mut self, count: usize) {
        if count > 0 && self.selected < count - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn scroll_by(&mut self, delta: i64, max_scroll: u32) {
        let next = (self.offset as i64 + delta).clamp(0, max_scroll as i64);
        self.offset = next as u32;
    }

    /// Scroll so the selected widget is in view, as far as `max_scroll`
    /// allows.
    pub fn reveal(&mut self, placement: Placement, viewport: u16, max_scroll: u32) {
        let viewport = viewport as u32;
        if placement.top < self.offset {
            self.offset = placement.top.saturating_sub(WIDGET_GAP as u32);
        } else if placement.bottom() > self.offset + viewport {
            self.offset = placement.bottom().saturating_sub(viewport);
        }
        self.offset = self.offset.min(max_scroll);
    }
}

// ─── geometry ───────────────────────────────────────────────────

/// What a click inside the form content landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormHit {
    pub index: usize,
    /// Segment under the pointer, for choice widgets.
    pub option: Option<usize>,
}

/// Equal-width segments across `area`, like a segmented control.  The last
/// segment absorbs the rounding remainder.
pub fn segment_rects(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 || area.width == 0 {
        return Vec::new();
    }
    let count = count.min(area.width as usize) as u16;
    let base = area.width / count;
    (0..count)
        .map(|i| {
            let x = area.x + i * base;
            let w = if i == count - 1 {
                area.width - i * base
            } else {
                base
            };
            Rect::new(x, area.y, w, area.height)
        })
        .collect()
}

/// Map a screen position inside `content` (the form pane's inner area) to
/// the widget under it.
pub fn hit_test(
    stack: &WidgetStack,
    state: &FormState,
    content: Rect,
    x: u16,
    y: u16,
) -> Option<FormHit> {
    if x < content.x || x >= content.x + content.width || y < content.y {
        return None;
    }
    let content_row = (y - content.y) as u32 + state.offset;
    let placements = stack.layout();
    let index = placements
        .iter()
        .position(|p| content_row >= p.top && content_row < p.bottom())?;

    let option = match &stack.widgets()[index].view {
        WidgetView::Choice { options, .. } => {
            let inner = Rect::new(content.x + 1, 0, content.width.saturating_sub(2), 1);
            segment_rects(inner, options.len())
                .iter()
                .position(|r| x >= r.x && x < r.x + r.width)
        }
        _ => None,
    };
    Some(FormHit { index, option })
}

// ─── widget ─────────────────────────────────────────────────────

pub struct FormWidget<'a> {
    pub block: Block<'a>,
    pub stack: &'a WidgetStack,
    pub state: &'a FormState,
    pub images: &'a HashMap<String, LoadedImage>,
    pub has_focus: bool,
}

impl Widget for FormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.block.inner(area);
        self.block.render(area, buf);
        if inner.width < 2 || inner.height == 0 {
            return;
        }
        // Rightmost column is the scrollbar.
        let content = Rect::new(inner.x, inner.y, inner.width - 1, inner.height);

        let view_top = self.state.offset;
        let view_bottom = view_top + content.height as u32;

        for (i, (widget, placement)) in self
            .stack
            .widgets()
            .iter()
            .zip(self.stack.layout())
            .enumerate()
        {
            if placement.bottom() <= view_top {
                continue;
            }
            if placement.top >= view_bottom {
                break;
            }
            let top = placement.top.max(view_top);
            let bottom = placement.bottom().min(view_bottom);
            let slice = Slice {
                skip: (top - placement.top) as u16,
                dest: Rect::new(
                    content.x,
                    content.y + (top - view_top) as u16,
                    content.width,
                    (bottom - top) as u16,
                ),
                full_height: placement.height,
            };
            let selected = self.has_focus && i == self.state.selected;
            render_widget(widget, slice, selected, self.images, buf);
        }

        let scrollbar = Rect::new(inner.x + inner.width - 1, inner.y, 1, inner.height);
        render_scrollbar(
            scrollbar,
            self.stack.content_height(),
            self.state.offset,
            inner.height as u32,
            buf,
        );
    }
}

/// The visible part of one widget: rows `skip..skip + dest.height` of a
/// widget `full_height` rows tall, drawn at `dest`.
#[derive(Debug, Clone, Copy)]
struct Slice {
    skip: u16,
    dest: Rect,
    full_height: u16,
}

impl Slice {
    /// Row `row` of the widget on screen, if it is visible.
    fn screen_row(&self, row: u16) -> Option<u16> {
        (row >= self.skip && row < self.skip + self.dest.height)
            .then(|| self.dest.y + row - self.skip)
    }
}

fn render_widget(
    widget: &RenderedWidget,
    slice: Slice,
    selected: bool,
    images: &HashMap<String, LoadedImage>,
    buf: &mut Buffer,
) {
    if let WidgetView::Image {
        caption,
        url,
        height: Some(_),
    } = &widget.view
    {
        if let Some(img) = images.get(url) {
            render_halfblocks(&img.thumb, slice.full_height, slice.skip, slice.dest, buf);
            let caption_row = slice.full_height.saturating_sub(2);
            if let Some(y) = slice.screen_row(caption_row) {
                render_caption(caption, Rect::new(slice.dest.x, y, slice.dest.width, 1), buf);
            }
            if selected {
                mark_selected(slice.dest, buf);
            }
            return;
        }
    }

    // Bordered and placeholder widgets are a few rows tall: draw them whole
    // off-screen and copy the visible rows.
    let height = slice.full_height.min(FIXED_WIDGET_HEIGHT);
    let rect = Rect::new(0, 0, slice.dest.width, height);
    let mut scratch = Buffer::empty(rect);
    render_small_widget(widget, rect, selected, &mut scratch);

    for row in 0..height {
        let Some(y) = slice.screen_row(row) else {
            continue;
        };
        for col in 0..slice.dest.width {
            let src = scratch.cell(Position::new(col, row)).cloned();
            let dst = buf.cell_mut(Position::new(slice.dest.x + col, y));
            if let (Some(src), Some(dst)) = (src, dst) {
                *dst = src;
            }
        }
    }
}

fn render_small_widget(widget: &RenderedWidget, rect: Rect, selected: bool, buf: &mut Buffer) {
    match &widget.view {
        WidgetView::Text { text } => {
            let block = widget_block(selected);
            Paragraph::new(Line::from(Span::styled(text.as_str(), Theme::text_style())))
                .alignment(Alignment::Center)
                .block(block)
                .render(rect, buf);
        }
        WidgetView::Image { caption, .. } => {
            let marker = if selected { "▸ " } else { "  " };
            Paragraph::new(Line::from(vec![
                Span::styled(marker, Theme::widget_border_style(true)),
                Span::styled(format!("⧗ {caption}"), Theme::placeholder_style()),
            ]))
            .alignment(Alignment::Center)
            .render(rect, buf);
        }
        WidgetView::Choice { options, selected: active } => {
            let block = widget_block(selected);
            let inner = block.inner(rect);
            block.render(rect, buf);
            let segments = segment_rects(inner, options.len());
            for (i, (label, seg)) in options.iter().zip(&segments).enumerate() {
                let style = Theme::segment_style(*active == Some(i));
                buf.set_style(*seg, style);
                Paragraph::new(Line::from(Span::styled(label.as_str(), style)))
                    .alignment(Alignment::Center)
                    .render(*seg, buf);
                if i > 0 {
                    if let Some(cell) = buf.cell_mut(Position::new(seg.x, seg.y)) {
                        cell.set_char('│').set_fg(Color::DarkGray);
                    }
                }
            }
        }
    }
}

fn widget_block(selected: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::widget_border_style(selected))
}

/// Caption pill: 60 % of the row width, centred.
fn render_caption(caption: &str, row: Rect, buf: &mut Buffer) {
    let width = (row.width as u32 * 6 / 10) as u16;
    let pill = Rect::new(row.x + (row.width - width) / 2, row.y, width, 1);
    buf.set_style(pill, Theme::caption_style());
    Paragraph::new(Line::from(Span::styled(caption, Theme::caption_style())))
        .alignment(Alignment::Center)
        .render(pill, buf);
}

/// Images have no border; a selected one gets a marker in its left column.
fn mark_selected(rect: Rect, buf: &mut Buffer) {
    for row in rect.y..rect.y + rect.height {
        if let Some(cell) = buf.cell_mut(Position::new(rect.x, row)) {
            cell.set_char('▌').set_fg(Color::Cyan);
        }
    }
}

// ─── scrollbar ──────────────────────────────────────────────────

fn render_scrollbar(area: Rect, total: u32, offset: u32, visible: u32, buf: &mut Buffer) {
    if total <= visible || area.height < 2 || area.width == 0 {
        return;
    }
    let h = area.height as f64;
    let thumb_sz = ((visible as f64 / total as f64) * h).ceil().max(1.0) as u16;
    let max_off = total.saturating_sub(visible) as f64;
    let thumb_pos = ((offset.min(total - visible) as f64 / max_off) * (h - thumb_sz as f64))
        .round() as u16;

    for row in 0..area.height {
        let is_thumb = row >= thumb_pos && row < thumb_pos + thumb_sz;
        let (ch, fg) = if is_thumb {
            ('█', Color::LightBlue)
        } else {
            ('│', Color::DarkGray)
        };
        if let Some(cell) = buf.cell_mut(Position::new(area.x, area.y + row)) {
            cell.set_char(ch).set_fg(fg);
        }
    }
}
