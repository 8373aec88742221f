// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page session wiring: discovery, event listeners, storage sync, and
//! keyboard dispatch.
//!
//! One [`Session`] exists per page, shared as `Rc<RefCell<Session>>` across
//! all registered closures. Every entry point here borrows the session in a
//! tight scope, extracts what it needs, and releases the borrow before
//! calling back into another entry point, so re-entrant DOM callbacks never
//! hit an already-held borrow.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function};
use ratewheel_core::controller::{RateController, RateUpdate, SetOptions};
use ratewheel_core::keys::{Action, seek_target};
use ratewheel_core::overlay::OVERLAY_TIMEOUT_MS;
use ratewheel_core::rate::sanitize;
use ratewheel_core::reconcile::Outcome;
use ratewheel_core::select;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{
    Document, Event, HtmlVideoElement, KeyboardEvent, MutationObserver, MutationObserverInit,
};

use crate::registry::{BOUND_ATTR, VideoRegistry};
use crate::{chrome, dom, overlay};

/// All per-page state: the rate controller, the video side table, and the
/// sticky active video used by the selection heuristic.
#[derive(Debug)]
pub(crate) struct Session {
    controller: RateController,
    registry: VideoRegistry,
    active: Option<HtmlVideoElement>,
}

impl Session {
    pub(crate) fn new(document: Document) -> Self {
        Self {
            controller: RateController::new(),
            registry: VideoRegistry::new(document),
            active: None,
        }
    }
}

/// Wires the whole session up: mutation observer, initial scan, storage
/// adoption, messaging, and the capture-phase keydown listener.
pub(crate) fn install(session: &Rc<RefCell<Session>>) -> Result<(), JsValue> {
    observe_mutations(session)?;
    scan(session);
    init_storage(session);
    init_messaging(session);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let shared = Rc::clone(session);
    let on_keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        handle_keydown(&shared, &event);
    }) as Box<dyn FnMut(KeyboardEvent)>);
    // Capture phase, so player chrome that stops propagation at the target
    // cannot swallow the shortcuts.
    window.add_event_listener_with_callback_and_bool(
        "keydown",
        on_keydown.as_ref().unchecked_ref(),
        true,
    )?;
    on_keydown.forget();
    Ok(())
}

/// Re-observes the document: drops state for removed videos and binds any
/// new ones. Runs at install time and on every observed subtree mutation.
fn scan(session: &Rc<RefCell<Session>>) {
    let document = {
        let mut guard = session.borrow_mut();
        if guard.active.as_ref().is_some_and(|v| !v.is_connected()) {
            guard.active = None;
        }
        guard.registry.prune_disconnected();
        guard.registry.document().clone()
    };
    for video in dom::collect_videos(&document) {
        bind(session, &video);
    }
}

/// Attaches listeners to one video and applies the current rate to it.
/// Idempotent via a marker attribute; a re-attached element keeps the
/// attribute and its listeners, so re-binding is skipped.
fn bind(session: &Rc<RefCell<Session>>, video: &HtmlVideoElement) {
    if video.has_attribute(BOUND_ATTR) {
        return;
    }
    let _ = video.set_attribute(BOUND_ATTR, "true");

    let rate = session.borrow().controller.rate();
    apply_to_video(session, video, rate, false);

    let shared = Rc::clone(session);
    let target = video.clone();
    let mark_active = Closure::wrap(Box::new(move |_: Event| {
        shared.borrow_mut().active = Some(target.clone());
    }) as Box<dyn FnMut(Event)>);
    for name in ["play", "click", "mouseover"] {
        if let Err(err) = video.add_event_listener_with_callback_and_bool(
            name,
            mark_active.as_ref().unchecked_ref(),
            true,
        ) {
            log::warn!("failed to attach {name} listener: {err:?}");
        }
    }
    mark_active.forget();

    let shared = Rc::clone(session);
    let target = video.clone();
    let on_ratechange = Closure::wrap(Box::new(move |_: Event| {
        handle_ratechange(&shared, &target);
    }) as Box<dyn FnMut(Event)>);
    if let Err(err) =
        video.add_event_listener_with_callback("ratechange", on_ratechange.as_ref().unchecked_ref())
    {
        log::warn!("failed to attach ratechange listener: {err:?}");
    }
    on_ratechange.forget();
}

/// Classifies a native `ratechange` notification and reacts: self-inflicted
/// changes only refresh the label, a foreign rate that matches the global is
/// surfaced via the overlay, and a diverging foreign rate is snapped back
/// silently.
fn handle_ratechange(session: &Rc<RefCell<Session>>, video: &HtmlVideoElement) {
    let observed = sanitize(video.playback_rate());
    let (outcome, global) = {
        let mut guard = session.borrow_mut();
        let global = guard.controller.rate();
        let outcome = guard.registry.observe_change(video, observed, global);
        if matches!(outcome, Outcome::Confirmed | Outcome::ExternalMatch) {
            // The label shows what the video actually does, so the observed
            // rate wins over the global target here.
            guard.registry.refresh_label(video, observed);
        }
        (outcome, global)
    };
    match outcome {
        Outcome::Confirmed => {}
        Outcome::ExternalMatch => show_overlay(session, video, observed),
        Outcome::Corrected => apply_to_video(session, video, global, false),
    }
}

/// Applies a rate to one video, optionally flashing its overlay.
fn apply_to_video(session: &Rc<RefCell<Session>>, video: &HtmlVideoElement, rate: f64, show: bool) {
    session.borrow_mut().registry.apply_rate(video, rate);
    if show {
        show_overlay(session, video, rate);
    }
}

/// Applies a rate to every video currently in the document, binding any
/// not yet seen on the way.
fn apply_to_all(session: &Rc<RefCell<Session>>, rate: f64, show: bool) {
    let document = session.borrow().registry.document().clone();
    for video in dom::collect_videos(&document) {
        bind(session, &video);
        apply_to_video(session, &video, rate, show);
    }
}

/// Executes one controller update: applies the rate everywhere and performs
/// the requested persistence write.
fn run_update(session: &Rc<RefCell<Session>>, update: &RateUpdate) {
    apply_to_all(session, update.rate, update.show);
    if let Some(persist) = update.persist {
        chrome::write_stored_rates(persist.rate, persist.last_non_default);
    }
}

/// Shows a video's overlay and schedules the hide timeout. The generation
/// token makes an earlier, already-scheduled timeout a no-op when the
/// overlay is re-triggered before it fires.
fn show_overlay(session: &Rc<RefCell<Session>>, video: &HtmlVideoElement, rate: f64) {
    let Some(token) = session.borrow_mut().registry.begin_show(video, rate) else {
        return;
    };
    let shared = Rc::clone(session);
    let target = video.clone();
    let hide = Closure::wrap(Box::new(move || {
        shared.borrow_mut().registry.finish_hide(&target, token);
    }) as Box<dyn FnMut()>);
    let id = overlay::set_timeout(hide.as_ref(), OVERLAY_TIMEOUT_MS);
    session.borrow_mut().registry.store_hide_timer(video, id, hide);
}

/// Capture-phase keydown handler.
fn handle_keydown(session: &Rc<RefCell<Session>>, event: &KeyboardEvent) {
    if event.default_prevented() || dom::is_editable_target(event.target()) {
        return;
    }
    let Some(action) = Action::from_key(&event.key()) else {
        return;
    };

    if action.needs_video() {
        // Seeks silently do nothing without a target; the key is left for
        // the page in that case.
        let Some(video) = choose_video(session) else {
            return;
        };
        if let Some(delta) = action.seek_delta() {
            let target = seek_target(video.current_time(), delta, Some(video.duration()));
            video.set_current_time(target);
        }
    } else {
        // Rate shortcuts act on the global rate even when no video resolves.
        let update = {
            let mut guard = session.borrow_mut();
            match action.rate_delta() {
                Some(delta) => Some(guard.controller.nudge(delta)),
                None => guard.controller.toggle_default(),
            }
        };
        if let Some(update) = &update {
            run_update(session, update);
        }
    }

    event.prevent_default();
    event.stop_propagation();
}

/// Resolves the video a keyboard action targets. The heuristic runs fresh
/// on every action; the sticky active pointer is only ever written by the
/// activation listeners, so a heuristic pick here is not remembered.
fn choose_video(session: &Rc<RefCell<Session>>) -> Option<HtmlVideoElement> {
    let (document, sticky) = {
        let guard = session.borrow();
        (guard.registry.document().clone(), guard.active.clone())
    };
    let videos = dom::collect_videos(&document);
    let window = web_sys::window()?;

    let sticky_index = sticky
        .filter(|active| active.is_connected())
        .and_then(|active| videos.iter().position(|v| *v == active));
    let candidates: Vec<_> = videos
        .iter()
        .map(|video| dom::candidate_for(&window, video))
        .collect();
    let index = select::choose(&candidates, sticky_index)?;
    videos.into_iter().nth(index)
}

/// Adopts the persisted rate at startup and follows cross-context changes.
fn init_storage(session: &Rc<RefCell<Session>>) {
    if !chrome::storage_available() {
        log::info!("extension storage unavailable; rate will not persist");
        return;
    }

    let shared = Rc::clone(session);
    wasm_bindgen_futures::spawn_local(async move {
        let Some((rate_entry, last_entry)) = chrome::read_stored_rates().await else {
            return;
        };
        let (rate, write_back) = {
            let mut guard = shared.borrow_mut();
            let write_back = guard.controller.adopt_stored(rate_entry, last_entry);
            (guard.controller.rate(), write_back)
        };
        if write_back {
            chrome::write_stored_rates(rate, None);
        }
        apply_to_all(&shared, rate, false);
    });

    let shared = Rc::clone(session);
    let on_changed = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() != Some("local") {
            return;
        }
        if let Some(value) = chrome::change_new_value(&changes, chrome::KEY_RATE) {
            let update = shared.borrow_mut().controller.external_rate_change(value);
            run_update(&shared, &update);
        }
        if let Some(value) = chrome::change_new_value(&changes, chrome::KEY_LAST) {
            shared.borrow_mut().controller.external_last_change(Some(value));
        }
    }) as Box<dyn FnMut(JsValue, JsValue)>);
    chrome::add_storage_change_listener(&on_changed);
    on_changed.forget();
}

/// Answers `getRate`/`setRate` requests from the extension popup.
fn init_messaging(session: &Rc<RefCell<Session>>) {
    if !chrome::messaging_available() {
        return;
    }

    let shared = Rc::clone(session);
    let on_message = Closure::wrap(Box::new(
        move |message: JsValue, _sender: JsValue, send_response: Function| {
            match chrome::string_prop(&message, "action").as_deref() {
                Some("getRate") => {
                    let rate = shared.borrow().controller.rate();
                    chrome::respond_rate(&send_response, rate);
                }
                Some("setRate") => {
                    match chrome::number_prop(&message, "rate").filter(|r| r.is_finite()) {
                        Some(rate) => {
                            let update = shared
                                .borrow_mut()
                                .controller
                                .set_rate(rate, SetOptions::default());
                            run_update(&shared, &update);
                            chrome::respond_rate(&send_response, update.rate);
                        }
                        None => chrome::respond_error(&send_response, "invalid rate"),
                    }
                }
                _ => {}
            }
        },
    )
        as Box<dyn FnMut(JsValue, JsValue, Function)>);
    chrome::add_message_listener(&on_message);
    on_message.forget();
}

/// Watches the document for added or removed subtrees and rescans. Single-
/// page apps swap players in and out without a navigation, so discovery has
/// to be continuous.
fn observe_mutations(session: &Rc<RefCell<Session>>) -> Result<(), JsValue> {
    let document = session.borrow().registry.document().clone();
    let Some(root) = document.document_element() else {
        return Ok(());
    };

    let shared = Rc::clone(session);
    let callback = Closure::wrap(Box::new(move |_: Array, _: MutationObserver| {
        scan(&shared);
    }) as Box<dyn FnMut(Array, MutationObserver)>);
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    callback.forget();

    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&root, &init)
}
