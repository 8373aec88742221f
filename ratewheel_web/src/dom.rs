// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM queries feeding the selection heuristic and keyboard dispatch.

use ratewheel_core::select::Candidate;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, EventTarget, HtmlElement, HtmlVideoElement, Window};

/// Collects every `<video>` element currently in the document, in document
/// order.
pub(crate) fn collect_videos(document: &Document) -> Vec<HtmlVideoElement> {
    let mut videos = Vec::new();
    let Ok(list) = document.query_selector_all("video") else {
        return videos;
    };
    for index in 0..list.length() {
        if let Some(node) = list.get(index)
            && let Ok(video) = node.dyn_into::<HtmlVideoElement>()
        {
            videos.push(video);
        }
    }
    videos
}

/// Snapshots one video for the selection heuristic.
pub(crate) fn candidate_for(window: &Window, video: &HtmlVideoElement) -> Candidate {
    Candidate {
        visible: is_video_visible(window, video),
        playing: !video.paused() && !video.ended(),
        area: f64::from(video.client_width()) * f64::from(video.client_height()),
    }
}

/// Whether a video is rendered at non-zero size, not hidden by CSS, and
/// intersects the viewport.
pub(crate) fn is_video_visible(window: &Window, video: &HtmlVideoElement) -> bool {
    let rect = video.get_bounding_client_rect();
    if rect.width() == 0.0 || rect.height() == 0.0 {
        return false;
    }

    if let Ok(Some(style)) = window.get_computed_style(video) {
        for (property, hidden_value) in [
            ("visibility", "hidden"),
            ("display", "none"),
            ("opacity", "0"),
        ] {
            if style
                .get_property_value(property)
                .is_ok_and(|value| value == hidden_value)
            {
                return false;
            }
        }
    }

    let (viewport_width, viewport_height) = viewport_size(window);
    rect.bottom() > 0.0
        && rect.right() > 0.0
        && rect.top() < viewport_height
        && rect.left() < viewport_width
}

/// Viewport size, falling back to the root element's client box when the
/// window reports zero (some embedded contexts do).
fn viewport_size(window: &Window) -> (f64, f64) {
    let root = window.document().and_then(|d| d.document_element());
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|w| *w > 0.0)
        .or_else(|| root.as_ref().map(|r| f64::from(r.client_width())))
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|h| *h > 0.0)
        .or_else(|| root.as_ref().map(|r| f64::from(r.client_height())))
        .unwrap_or(0.0);
    (width, height)
}

/// Whether a keyboard event targeted an editable control and must be left
/// alone.
pub(crate) fn is_editable_target(target: Option<EventTarget>) -> bool {
    let Some(target) = target else {
        return false;
    };
    let Some(element) = target.dyn_ref::<HtmlElement>() else {
        return false;
    };
    is_editable_tag(&element.tag_name(), element.is_content_editable())
}

fn is_editable_tag(tag: &str, content_editable: bool) -> bool {
    content_editable
        || tag.eq_ignore_ascii_case("input")
        || tag.eq_ignore_ascii_case("textarea")
        || tag.eq_ignore_ascii_case("select")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_controls_are_editable() {
        assert!(is_editable_tag("INPUT", false));
        assert!(is_editable_tag("TEXTAREA", false));
        assert!(is_editable_tag("SELECT", false));
        assert!(is_editable_tag("input", false));
    }

    #[test]
    fn content_editable_wins_for_any_tag() {
        assert!(is_editable_tag("DIV", true));
    }

    #[test]
    fn plain_elements_are_not_editable() {
        assert!(!is_editable_tag("DIV", false));
        assert!(!is_editable_tag("VIDEO", false));
        assert!(!is_editable_tag("BUTTON", false));
    }
}
