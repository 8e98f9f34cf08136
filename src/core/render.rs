//! Widget-stack construction — document in, ordered vertical stack out.
//!
//! Each view entry is resolved to its datum, classified, and handed to one of
//! three construction routines.  Every widget is chained below the previous
//! one (see [`WidgetStack::layout`]).
//!
//! Two height notions coexist on purpose:
//!
//! * the *layout chain* — where each widget sits, recomputed from the current
//!   widget heights;
//! * the *content height* — a running accumulator that defines the scrollable
//!   extent.  Text and choice widgets add their increment when built; an image
//!   adds its increment only when its bitmap arrives ([`WidgetStack::image_loaded`]).
//!   The extent is therefore eventually consistent, not immediately correct.

use std::fmt::Write as _;

use super::schema::{Variant, ViewDocument};
use super::widget::WidgetKind;

/// Rows between consecutive widgets (and above the first one).
pub const WIDGET_GAP: u16 = 1;
/// Height of text and choice widgets.
pub const FIXED_WIDGET_HEIGHT: u16 = 3;
/// Content-height increment for a fixed-height widget.
pub const FIXED_INCREMENT: u32 = (FIXED_WIDGET_HEIGHT + WIDGET_GAP) as u32;
/// Rows an image occupies until its bitmap has loaded.
pub const IMAGE_PLACEHOLDER_HEIGHT: u16 = 1;

/// Visual content of one rendered widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetView {
    Text {
        text: String,
    },
    Image {
        caption: String,
        url: String,
        /// `None` until the image has loaded.
        height: Option<u16>,
    },
    Choice {
        /// Option labels, sorted by variant id.
        options: Vec<String>,
        selected: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWidget {
    pub name: String,
    /// Index in the document's `view` list.
    pub position: usize,
    pub view: WidgetView,
    /// Human-readable description shown when the widget is activated.
    pub info: String,
}

impl RenderedWidget {
    /// Current layout height in rows.
    pub fn height(&self) -> u16 {
        match &self.view {
            WidgetView::Text { .. } | WidgetView::Choice { .. } => FIXED_WIDGET_HEIGHT,
            WidgetView::Image { height, .. } => height.unwrap_or(IMAGE_PLACEHOLDER_HEIGHT),
        }
    }
}

/// Vertical placement of one widget inside the scroll content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub top: u32,
    pub height: u16,
}

impl Placement {
    pub fn bottom(&self) -> u32 {
        self.top + self.height as u32
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidgetStack {
    widgets: Vec<RenderedWidget>,
    content_height: u32,
}

impl WidgetStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widgets(&self) -> &[RenderedWidget] {
        &self.widgets
    }

    pub fn get(&self, index: usize) -> Option<&RenderedWidget> {
        self.widgets.get(index)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Scrollable extent accumulated so far.
    pub fn content_height(&self) -> u32 {
        self.content_height
    }

    /// Remove every widget and reset the content height.
    pub fn clear(&mut self) {
        self.widgets.clear();
        self.content_height = 0;
    }

    /// Tear down the previous stack and build one widget per view entry.
    pub fn render(&mut self, doc: &ViewDocument) {
        self.clear();

        for (position, name) in doc.view.iter().enumerate() {
            let Some(datum) = doc.resolve(name) else {
                tracing::debug!(%name, "render: document has no data, skipping");
                continue;
            };
            match datum.payload.classify() {
                Some(WidgetKind::Text { text }) => self.add_text(name, position, text),
                Some(WidgetKind::Image { caption, url }) => {
                    self.add_image(name, position, caption, url)
                }
                Some(WidgetKind::Choice { variants, .. }) => {
                    self.add_choice(name, position, variants)
                }
                None => tracing::debug!(%name, "render: unclassifiable payload skipped"),
            }
        }
    }

    fn add_text(&mut self, name: &str, position: usize, text: &str) {
        self.widgets.push(RenderedWidget {
            name: name.to_string(),
            position,
            view: WidgetView::Text {
                text: text.to_string(),
            },
            info: format!("Имя: {name}\nID: {position}\nТекст: {text}"),
        });
        self.content_height += FIXED_INCREMENT;
    }

    fn add_image(&mut self, name: &str, position: usize, caption: &str, url: &str) {
        self.widgets.push(RenderedWidget {
            name: name.to_string(),
            position,
            view: WidgetView::Image {
                caption: caption.to_string(),
                url: url.to_string(),
                height: None,
            },
            info: format!("Имя: {name}\nID: {position}\nURL: {url}\nТекст: {caption}"),
        });
    }

    fn add_choice(&mut self, name: &str, position: usize, variants: &[Variant]) {
        let mut sorted: Vec<&Variant> = variants.iter().collect();
        sorted.sort_by_key(|v| v.id);
        let options: Vec<String> = sorted.into_iter().map(|v| v.label.clone()).collect();

        // The initial selection follows the widget's position in the view
        // list, not the payload's `selectedId`.
        let selected = position
            .checked_sub(1)
            .filter(|&i| i < options.len());

        self.widgets.push(RenderedWidget {
            name: name.to_string(),
            position,
            view: WidgetView::Choice { options, selected },
            info: format!(
                "Имя: {name}\nID: {position}\nВарианты: {}",
                describe_variants(variants)
            ),
        });
        self.content_height += FIXED_INCREMENT;
    }

    /// An image finished loading.  Sizes every still-unloaded image widget
    /// showing `url` to `container_width` at the bitmap's aspect ratio, and
    /// grows the content height by each widget's new extent.
    ///
    /// Returns how many widgets were updated.
    pub fn image_loaded(
        &mut self,
        url: &str,
        image_width: u32,
        image_height: u32,
        container_width: u16,
    ) -> usize {
        if image_width == 0 {
            return 0;
        }
        let rows = image_rows(image_width, image_height, container_width);

        let mut updated = 0;
        for widget in &mut self.widgets {
            if let WidgetView::Image {
                url: widget_url,
                height: height @ None,
                ..
            } = &mut widget.view
            {
                if widget_url.as_str() == url {
                    *height = Some(rows);
                    self.content_height += rows as u32 + WIDGET_GAP as u32;
                    updated += 1;
                }
            }
        }
        updated
    }

    /// Image URLs that still have no height.
    pub fn pending_images(&self) -> impl Iterator<Item = &str> {
        self.widgets.iter().filter_map(|w| match &w.view {
            WidgetView::Image {
                url, height: None, ..
            } => Some(url.as_str()),
            _ => None,
        })
    }

    /// Change the selected option of the choice widget at `index`.
    /// Returns the new selection, or `None` if the widget is not a choice.
    pub fn select_option(&mut self, index: usize, option: usize) -> Option<usize> {
        match self.widgets.get_mut(index).map(|w| &mut w.view) {
            Some(WidgetView::Choice { options, selected }) if option < options.len() => {
                *selected = Some(option);
                Some(option)
            }
            _ => None,
        }
    }

    /// Chain every widget below the previous one, starting one gap below
    /// the top anchor.
    pub fn layout(&self) -> Vec<Placement> {
        let mut out = Vec::with_capacity(self.widgets.len());
        let mut bottom = 0u32;
        for widget in &self.widgets {
            let placement = Placement {
                top: bottom + WIDGET_GAP as u32,
                height: widget.height(),
            };
            bottom = placement.bottom();
            out.push(placement);
        }
        out
    }
}

/// Rows needed to show an image at `container_width` columns.  Each
/// half-block cell carries two vertical pixels.
pub fn image_rows(image_width: u32, image_height: u32, container_width: u16) -> u16 {
    if image_width == 0 {
        return IMAGE_PLACEHOLDER_HEIGHT;
    }
    let aspect = image_height as f64 / image_width as f64;
    let rows = (container_width as f64 * aspect / 2.0).ceil();
    rows.clamp(1.0, u16::MAX as f64) as u16
}

fn describe_variants(variants: &[Variant]) -> String {
    let mut s = String::from("[");
    for (i, v) in variants.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        let _ = write!(s, "Variant(id: {}, text: {:?})", v.id, v.label);
    }
    s.push(']');
    s
}
