// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay presentation: injected stylesheet, positioning, and timer
//! bindings.
//!
//! The overlay is a small rate badge anchored to the top-left of each bound
//! video, appended as a sibling under the video's parent. It never
//! intercepts pointer events and fades via an opacity transition; showing
//! and hiding is driven by [`VISIBLE_CLASS`].

use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::{Document, Element, HtmlElement};

/// Class carried by every overlay container element.
pub(crate) const OVERLAY_CLASS: &str = "ratewheel-overlay";

/// Class carried by the rate label inside the overlay.
pub(crate) const LABEL_CLASS: &str = "ratewheel-rate";

/// Class toggled to fade the overlay in and out.
pub(crate) const VISIBLE_CLASS: &str = "is-visible";

/// Marker attribute on parents whose position has already been fixed up.
const POSITIONED_ATTR: &str = "data-ratewheel-positioned";

const OVERLAY_CSS: &str = "
  .ratewheel-overlay {
    position: absolute;
    top: 8px;
    left: 8px;
    z-index: 999999;
    display: flex;
    align-items: center;
    padding: 4px 8px;
    background: rgba(0, 0, 0, 0.65);
    color: #fff;
    font: 12px/1.2 Arial, sans-serif;
    border-radius: 6px;
    pointer-events: none;
    opacity: 0;
    user-select: none;
    max-width: calc(100% - 16px);
    transition: opacity 150ms ease;
  }
  .ratewheel-overlay.is-visible {
    opacity: 1;
  }
  .ratewheel-rate {
    font-weight: 600;
    letter-spacing: 0.2px;
  }
";

// Direct global bindings instead of `web_sys::Window` methods — avoids
// fetching (and unwrapping) the Window object on every overlay trigger.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    pub(crate) fn set_timeout(callback: &JsValue, timeout_ms: u32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    pub(crate) fn clear_timeout(id: i32);
}

/// Injects the shared overlay stylesheet. Called once per document.
pub(crate) fn inject_styles(document: &Document) {
    let Ok(style) = document.create_element("style") else {
        log::warn!("failed to create overlay stylesheet");
        return;
    };
    style.set_text_content(Some(OVERLAY_CSS));
    if let Some(root) = document.document_element()
        && let Err(err) = root.append_child(&style)
    {
        log::warn!("failed to inject overlay styles: {err:?}");
    }
}

/// Forces `position: relative` onto a statically positioned parent so the
/// absolutely positioned overlay anchors to it. Each parent is touched once.
pub(crate) fn ensure_positioned(parent: &Element) {
    if parent.has_attribute(POSITIONED_ATTR) {
        return;
    }
    if let Some(window) = web_sys::window()
        && let Ok(Some(style)) = window.get_computed_style(parent)
        && style
            .get_property_value("position")
            .is_ok_and(|position| position == "static")
        && let Some(host) = parent.dyn_ref::<HtmlElement>()
        && let Err(err) = host.style().set_property("position", "relative")
    {
        log::warn!("failed to position overlay parent: {err:?}");
    }
    let _ = parent.set_attribute(POSITIONED_ATTR, "true");
}
