//! Tagged widget kinds, derived from the presence-based wire payload.

use super::schema::{Variant, WidgetPayload};

/// The three renderable widget kinds, each with its required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind<'a> {
    Text {
        text: &'a str,
    },
    Image {
        caption: &'a str,
        url: &'a str,
    },
    Choice {
        selected_index: i64,
        variants: &'a [Variant],
    },
}

impl WidgetPayload {
    /// Decide which widget this payload describes.
    ///
    /// Checked in order: `text`+`url` is an image, `selectedId`+`variants` a
    /// choice, a lone `text` a text block.  Any other combination is not a
    /// widget and yields `None`.
    pub fn classify(&self) -> Option<WidgetKind<'_>> {
        if let (Some(text), Some(url)) = (&self.text, &self.url) {
            return Some(WidgetKind::Image { caption: text, url });
        }
        if let (Some(selected_index), Some(variants)) = (self.selected_index, &self.variants) {
            return Some(WidgetKind::Choice {
                selected_index,
                variants,
            });
        }
        self.text.as_deref().map(|text| WidgetKind::Text { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(
        text: Option<&str>,
        url: Option<&str>,
        selected: Option<i64>,
        variants: Option<Vec<Variant>>,
    ) -> WidgetPayload {
        WidgetPayload {
            text: text.map(str::to_string),
            url: url.map(str::to_string),
            selected_index: selected,
            variants,
        }
    }

    #[test]
    fn text_and_url_is_an_image() {
        let p = payload(Some("cap"), Some("http://x/y.png"), None, None);
        assert_eq!(
            p.classify(),
            Some(WidgetKind::Image {
                caption: "cap",
                url: "http://x/y.png"
            })
        );
    }

    #[test]
    fn image_wins_over_choice_when_everything_is_present() {
        let p = payload(Some("cap"), Some("u"), Some(1), Some(vec![]));
        assert!(matches!(p.classify(), Some(WidgetKind::Image { .. })));
    }

    #[test]
    fn choice_needs_both_fields() {
        let variants = vec![Variant { id: 1, label: "a".into() }];
        let p = payload(None, None, Some(3), Some(variants.clone()));
        assert_eq!(
            p.classify(),
            Some(WidgetKind::Choice {
                selected_index: 3,
                variants: &variants
            })
        );

        assert_eq!(payload(None, None, Some(3), None).classify(), None);
        assert_eq!(payload(None, None, None, Some(variants)).classify(), None);
    }

    #[test]
    fn choice_with_text_is_still_a_choice() {
        let p = payload(Some("label"), None, Some(0), Some(vec![]));
        assert!(matches!(p.classify(), Some(WidgetKind::Choice { .. })));
    }

    #[test]
    fn lone_text_is_text_and_lone_url_is_nothing() {
        assert_eq!(
            payload(Some("hi"), None, None, None).classify(),
            Some(WidgetKind::Text { text: "hi" })
        );
        assert_eq!(payload(None, Some("u"), None, None).classify(), None);
        assert_eq!(WidgetPayload::default().classify(), None);
    }
}
