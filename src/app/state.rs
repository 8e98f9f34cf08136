//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::{
    fetch::FetchController, render::WidgetStack, schema::ViewDocument,
};
use crate::ui::{form_widget::FormState, url_field::UrlField};

use super::net_runtime::LoadedImage;

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    UrlField,
    #[default]
    Form,
}

/// Top-level application state.
pub struct AppState {
    /// Owns the URL, the current document and the status.
    pub controller: FetchController,
    /// Editable copy of the URL shown in the input field.
    pub url_field: UrlField,
    /// The rendered widgets for the current document.
    pub stack: WidgetStack,
    /// Selection and scroll offset in the form pane.
    pub form_state: FormState,
    pub focus: Focus,
    /// Message of the open info pop-up, if any.
    pub popup: Option<String>,
    /// Decoded bitmaps by URL.  Lives for the whole session.
    pub image_cache: HashMap<String, LoadedImage>,
    /// URLs with a download currently running.
    pub images_in_flight: HashSet<String>,
    /// URLs that failed since the last rebuild; not retried until then.
    pub images_failed: HashSet<String>,
    /// Last known terminal size, for mouse hit-testing.
    pub terminal_area: Rect,
    /// Inner width of the form pane, used to size images.
    pub form_width: u16,
    /// Inner height of the form pane, used to clamp scrolling.
    pub form_height: u16,
    pub config: AppConfig,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Monotonic tick counter (drives the fetch spinner).
    pub tick: u64,
}

impl AppState {
    pub fn new(controller: FetchController, config: AppConfig) -> Self {
        let url_field = UrlField::new(controller.url());
        Self {
            controller,
            url_field,
            stack: WidgetStack::new(),
            form_state: FormState::default(),
            focus: Focus::default(),
            popup: None,
            image_cache: HashMap::new(),
            images_in_flight: HashSet::new(),
            images_failed: HashSet::new(),
            terminal_area: Rect::default(),
            form_width: 0,
            form_height: 0,
            config,
            should_quit: false,
            tick: 0,
        }
    }

    /// The URL text changed: hand it to the controller.
    pub fn url_edited(&mut self, now: Instant) {
        let text = self.url_field.text().to_string();
        self.controller.set_url(text, now);
    }

    /// Tear down and rebuild the stack for `doc`, then re-apply every image
    /// that is already cached so its height settles immediately.
    pub fn rebuild(&mut self, doc: &ViewDocument) {
        self.stack.render(doc);
        self.images_failed.clear();
        self.form_state.selected = 0;
        self.form_state.offset = 0;
        self.apply_cached_images();
    }

    /// Size every pending image whose bitmap is already in the cache.
    pub fn apply_cached_images(&mut self) {
        let ready: Vec<(String, u32, u32)> = self
            .stack
            .pending_images()
            .filter_map(|url| {
                self.image_cache
                    .get(url)
                    .map(|img| (url.to_string(), img.width, img.height))
            })
            .collect();
        for (url, w, h) in ready {
            self.stack.image_loaded(&url, w, h, self.form_width);
        }
    }

    /// Pending image URLs that are not cached, not downloading and have not
    /// failed since the last rebuild.  Marks them in flight.
    pub fn take_images_to_load(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        for url in self.stack.pending_images() {
            if self.image_cache.contains_key(url)
                || self.images_in_flight.contains(url)
                || self.images_failed.contains(url)
                || out.iter().any(|u: &String| u == url)
            {
                continue;
            }
            out.push(url.to_string());
        }
        self.images_in_flight.extend(out.iter().cloned());
        out
    }

    /// A download finished.  Cache it and size the widgets that show it.
    pub fn image_arrived(&mut self, url: String, image: LoadedImage) {
        self.images_in_flight.remove(&url);
        let updated = self
            .stack
            .image_loaded(&url, image.width, image.height, self.form_width);
        tracing::debug!(%url, updated, "image loaded");
        self.image_cache.insert(url, image);
    }

    /// A download failed.  The widget keeps its placeholder.
    pub fn image_failed(&mut self, url: String) {
        self.images_in_flight.remove(&url);
        self.images_failed.insert(url);
    }

    /// Largest scroll offset the current content extent allows.
    pub fn max_scroll(&self) -> u32 {
        self.stack
            .content_height()
            .saturating_sub(self.form_height as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::decode;
    use std::sync::Arc;

    const DOC: &[u8] = br#"{
        "data": [
            { "name": "t", "data": { "text": "hello" } },
            { "name": "i", "data": { "text": "cap", "url": "http://img/a.png" } }
        ],
        "view": ["t", "i", "i"]
    }"#;

    fn loaded(width: u32, height: u32) -> LoadedImage {
        LoadedImage {
            width,
            height,
            thumb: Arc::new(image::RgbaImage::new(width, height)),
        }
    }

    fn state() -> AppState {
        let mut s = AppState::new(FetchController::default(), AppConfig::default());
        s.form_width = 40;
        s.form_height = 10;
        s
    }

    #[test]
    fn each_image_url_is_requested_once() {
        let mut s = state();
        s.rebuild(&decode(DOC).expect("decode"));

        assert_eq!(s.take_images_to_load(), vec!["http://img/a.png".to_string()]);
        assert!(s.take_images_to_load().is_empty());
    }

    #[test]
    fn arrival_sizes_every_widget_with_that_url() {
        let mut s = state();
        s.rebuild(&decode(DOC).expect("decode"));
        let before = s.stack.content_height();

        s.take_images_to_load();
        s.image_arrived("http://img/a.png".into(), loaded(40, 40));

        // 40 columns at 1:1 → 20 rows each, plus a gap each.
        assert_eq!(s.stack.content_height(), before + 2 * 21);
        assert!(s.images_in_flight.is_empty());
        assert!(s.image_cache.contains_key("http://img/a.png"));
    }

    #[test]
    fn rebuild_reuses_cached_images_at_new_width() {
        let mut s = state();
        let doc = decode(DOC).expect("decode");
        s.rebuild(&doc);
        s.image_arrived("http://img/a.png".into(), loaded(40, 40));

        s.form_width = 20;
        s.rebuild(&doc);
        assert_eq!(s.stack.pending_images().count(), 0);
        assert_eq!(s.stack.widgets()[1].height(), 10);
        assert!(s.take_images_to_load().is_empty());
    }

    #[test]
    fn failed_image_is_retried_only_after_rebuild() {
        let mut s = state();
        let doc = decode(DOC).expect("decode");
        s.rebuild(&doc);
        s.take_images_to_load();
        s.image_failed("http://img/a.png".into());

        assert_eq!(s.stack.pending_images().count(), 2);
        assert!(s.take_images_to_load().is_empty());

        s.rebuild(&doc);
        assert_eq!(s.take_images_to_load().len(), 1);
    }

    #[test]
    fn max_scroll_follows_content_height() {
        let mut s = state();
        assert_eq!(s.max_scroll(), 0);
        s.rebuild(&decode(DOC).expect("decode"));
        // One text widget only so far: 4 rows < 10 visible.
        assert_eq!(s.max_scroll(), 0);
        s.image_arrived("http://img/a.png".into(), loaded(40, 40));
        assert_eq!(s.max_scroll(), 4 + 42 - 10);
    }
}
