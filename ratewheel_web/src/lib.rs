// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser glue for Ratewheel.
//!
//! This crate is the content-script side of the extension: it discovers
//! `<video>` elements, keeps their playback rate pinned to the global target
//! rate held by [`ratewheel_core`], renders the per-video rate overlay,
//! captures the keyboard shortcuts, and syncs the rate through extension
//! storage and messaging.
//!
//! Everything stateful hangs off one [`session::Session`] behind
//! `Rc<RefCell<_>>`; the DOM closures registered at install time share it
//! for the lifetime of the page.
//!
//! Build with: `wasm-pack build --target web ratewheel_web`

#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

mod chrome;
mod dom;
mod overlay;
mod registry;
mod session;

/// Entry point, called once per page at `document_idle`.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Warn);

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let session = Rc::new(RefCell::new(session::Session::new(document)));
    session::install(&session)
}
