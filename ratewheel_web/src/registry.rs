// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-video state and rate application.
//!
//! [`VideoRegistry`] is the side table mapping video elements to their
//! [`VideoBinding`] — overlay elements, hide timer, and the write/reconcile
//! state machine. The association must not outlive the element's presence in
//! the document: [`prune_disconnected`](VideoRegistry::prune_disconnected)
//! runs on every discovery pass (the mutation observer fires on any removal)
//! and drops bindings for detached elements, and entries are lazily
//! re-created when an event arrives for a video that was pruned.

use ratewheel_core::overlay::OverlayTimer;
use ratewheel_core::rate::{clamp, format_rate, nearly_equal};
use ratewheel_core::reconcile::{Outcome, Reconciler};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlElement, HtmlVideoElement};

use crate::overlay;

/// Marker attribute identifying videos that already have listeners attached.
pub(crate) const BOUND_ATTR: &str = "data-ratewheel-bound";

/// State owned per bound video element.
pub(crate) struct VideoBinding {
    video: HtmlVideoElement,
    reconciler: Reconciler,
    timer: OverlayTimer,
    overlay: Option<HtmlElement>,
    label: Option<HtmlElement>,
    hide_timeout: Option<i32>,
    /// Keeps the scheduled hide callback alive. Replaced (after cancelling
    /// the timeout) on each new show; never dropped from within the callback
    /// itself.
    hide_closure: Option<Closure<dyn FnMut()>>,
}

impl std::fmt::Debug for VideoBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoBinding")
            .field("video", &"HtmlVideoElement")
            .field("reconciler", &self.reconciler)
            .field("timer", &self.timer)
            .field("has_overlay", &self.overlay.is_some())
            .field("hide_timeout", &self.hide_timeout)
            .finish()
    }
}

impl VideoBinding {
    fn new(video: HtmlVideoElement) -> Self {
        Self {
            video,
            reconciler: Reconciler::new(),
            timer: OverlayTimer::new(),
            overlay: None,
            label: None,
            hide_timeout: None,
            hide_closure: None,
        }
    }

    /// Lazily (re)creates the overlay and label under the video's parent.
    /// Silently does nothing when the video has no parent yet.
    fn ensure_overlay(&mut self, document: &Document, rate: f64) {
        if let Some(existing) = &self.overlay
            && existing.is_connected()
        {
            return;
        }
        let Some(parent) = self.video.parent_element() else {
            return;
        };
        overlay::ensure_positioned(&parent);

        let Ok(container) = document.create_element("div") else {
            log::warn!("failed to create overlay element");
            return;
        };
        let container: HtmlElement = container.unchecked_into();
        container.set_class_name(overlay::OVERLAY_CLASS);

        let Ok(label) = document.create_element("div") else {
            log::warn!("failed to create overlay label");
            return;
        };
        let label: HtmlElement = label.unchecked_into();
        label.set_class_name(overlay::LABEL_CLASS);
        label.set_text_content(Some(&format_rate(rate)));

        let _ = container.append_child(&label);
        if let Err(err) = parent.append_child(&container) {
            log::warn!("failed to attach overlay: {err:?}");
            return;
        }
        self.overlay = Some(container);
        self.label = Some(label);
    }

    fn set_label(&self, rate: f64) {
        if let Some(label) = &self.label {
            label.set_text_content(Some(&format_rate(rate)));
        }
    }

    fn cancel_hide_timer(&mut self) {
        if let Some(id) = self.hide_timeout.take() {
            overlay::clear_timeout(id);
        }
        self.hide_closure = None;
    }
}

/// Side table of all bound videos for one document.
pub(crate) struct VideoRegistry {
    document: Document,
    bindings: Vec<VideoBinding>,
    styles_injected: bool,
}

impl std::fmt::Debug for VideoRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoRegistry")
            .field("document", &"Document")
            .field("bindings", &self.bindings)
            .field("styles_injected", &self.styles_injected)
            .finish()
    }
}

impl VideoRegistry {
    pub(crate) fn new(document: Document) -> Self {
        Self {
            document,
            bindings: Vec::new(),
            styles_injected: false,
        }
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    /// Drops bindings whose element left the document, cancelling pending
    /// hide timers and removing the owned overlay node. The overlay must
    /// not outlive its binding: a re-attached video gets a fresh binding
    /// with no overlay, and a leftover node under the old parent would
    /// duplicate on the next show. State for a re-attached element is
    /// recreated lazily.
    pub(crate) fn prune_disconnected(&mut self) {
        self.bindings.retain_mut(|binding| {
            if binding.video.is_connected() {
                return true;
            }
            binding.cancel_hide_timer();
            if let Some(overlay) = binding.overlay.take() {
                overlay.remove();
            }
            binding.label = None;
            false
        });
    }

    fn index_of(&self, video: &HtmlVideoElement) -> Option<usize> {
        self.bindings.iter().position(|b| &b.video == video)
    }

    fn ensure_entry(&mut self, video: &HtmlVideoElement) -> usize {
        if let Some(index) = self.index_of(video) {
            return index;
        }
        self.bindings.push(VideoBinding::new(video.clone()));
        self.bindings.len() - 1
    }

    fn ensure_overlay_at(&mut self, index: usize, rate: f64) {
        if !self.styles_injected {
            overlay::inject_styles(&self.document);
            self.styles_injected = true;
        }
        let document = self.document.clone();
        self.bindings[index].ensure_overlay(&document, rate);
    }

    /// Applies a rate to one video: writes the native playback rate only
    /// when it actually differs (recording the expected rate first, so the
    /// resulting notification reconciles as self-inflicted), mirrors it into
    /// the native default rate, and refreshes the label.
    pub(crate) fn apply_rate(&mut self, video: &HtmlVideoElement, rate: f64) {
        let clamped = clamp(rate);
        let index = self.ensure_entry(video);

        if self.bindings[index]
            .reconciler
            .prepare_write(video.playback_rate(), clamped)
        {
            video.set_playback_rate(clamped);
        }
        if !nearly_equal(video.default_playback_rate(), clamped) {
            video.set_default_playback_rate(clamped);
        }

        self.ensure_overlay_at(index, clamped);
        self.bindings[index].set_label(clamped);
    }

    /// Refreshes the label without touching the native rate.
    pub(crate) fn refresh_label(&mut self, video: &HtmlVideoElement, rate: f64) {
        let index = self.ensure_entry(video);
        self.ensure_overlay_at(index, rate);
        self.bindings[index].set_label(rate);
    }

    /// Feeds a native rate-change notification to the video's reconciler.
    pub(crate) fn observe_change(
        &mut self,
        video: &HtmlVideoElement,
        observed: f64,
        global: f64,
    ) -> Outcome {
        let index = self.ensure_entry(video);
        self.bindings[index].reconciler.observe(observed, global)
    }

    /// Marks the overlay visible and returns the hide-timer token, or `None`
    /// when no overlay could be created (video without a parent).
    ///
    /// Any previously scheduled hide timeout is cancelled here, so repeated
    /// triggers extend the visible window instead of stacking timers.
    pub(crate) fn begin_show(&mut self, video: &HtmlVideoElement, rate: f64) -> Option<u64> {
        let index = self.ensure_entry(video);
        self.ensure_overlay_at(index, rate);
        let binding = &mut self.bindings[index];
        let element = binding.overlay.as_ref()?;
        if let Err(err) = element.class_list().add_1(overlay::VISIBLE_CLASS) {
            log::warn!("failed to show overlay: {err:?}");
        }
        binding.cancel_hide_timer();
        Some(binding.timer.trigger())
    }

    /// Stores the scheduled hide timeout for the video shown via
    /// [`begin_show`](Self::begin_show).
    pub(crate) fn store_hide_timer(
        &mut self,
        video: &HtmlVideoElement,
        timeout_id: i32,
        callback: Closure<dyn FnMut()>,
    ) {
        if let Some(index) = self.index_of(video) {
            let binding = &mut self.bindings[index];
            binding.hide_timeout = Some(timeout_id);
            binding.hide_closure = Some(callback);
        }
    }

    /// Handles a fired hide timeout. Stale tokens are ignored; see
    /// [`OverlayTimer`].
    pub(crate) fn finish_hide(&mut self, video: &HtmlVideoElement, token: u64) {
        let Some(index) = self.index_of(video) else {
            return;
        };
        let binding = &mut self.bindings[index];
        binding.hide_timeout = None;
        if binding.timer.on_timeout(token)
            && let Some(element) = &binding.overlay
        {
            let _ = element.class_list().remove_1(overlay::VISIBLE_CLASS);
        }
    }
}
