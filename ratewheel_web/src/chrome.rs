// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bindings to the `chrome.*` extension APIs.
//!
//! `web-sys` does not cover the extension namespace, so the storage and
//! messaging entry points are bound directly. Every public helper guards on
//! availability first: outside an extension context (tests, plain pages) the
//! whole persistence/messaging surface silently stays inert.
//!
//! Persistence is fire-and-forget — the promises returned by the storage
//! calls are dropped, and a rapid burst of writes resolves by last-write-wins.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::JsFuture;

/// Storage key holding the global rate.
pub(crate) const KEY_RATE: &str = "globalRate";

/// Storage key holding the last non-default rate, absent when never set.
pub(crate) const KEY_LAST: &str = "globalLastNonDefault";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = "get")]
    fn storage_local_get(keys: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = "set")]
    fn storage_local_set(items: &JsValue) -> Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "onChanged"], js_name = "addListener")]
    fn storage_on_changed_add_listener(listener: &JsValue);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = "addListener")]
    fn runtime_on_message_add_listener(listener: &JsValue);
}

/// Walks a dotted path from the JS global, `None` on any missing segment.
fn global_path(path: &[&str]) -> Option<JsValue> {
    let mut value = JsValue::from(js_sys::global());
    for segment in path {
        value = Reflect::get(&value, &JsValue::from_str(segment)).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
    }
    Some(value)
}

/// Returns `true` when `chrome.storage.local` exists.
pub(crate) fn storage_available() -> bool {
    global_path(&["chrome", "storage", "local"]).is_some()
}

/// Returns `true` when `chrome.runtime.onMessage` exists.
pub(crate) fn messaging_available() -> bool {
    global_path(&["chrome", "runtime", "onMessage"]).is_some()
}

/// Reads both rate keys. `None` entries mean the key was absent; a present
/// but non-numeric value arrives as NaN so callers can sanitize it.
///
/// Returns `None` when the read itself failed (state then stays at the
/// defaults, mirroring a store that was never written).
pub(crate) async fn read_stored_rates() -> Option<(Option<f64>, Option<f64>)> {
    let keys = Array::of2(&JsValue::from_str(KEY_RATE), &JsValue::from_str(KEY_LAST));
    match JsFuture::from(storage_local_get(keys.as_ref())).await {
        Ok(data) => Some((
            stored_number(&data, KEY_RATE),
            stored_number(&data, KEY_LAST),
        )),
        Err(err) => {
            log::warn!("storage read failed: {err:?}");
            None
        }
    }
}

fn stored_number(data: &JsValue, key: &str) -> Option<f64> {
    let value = Reflect::get(data, &JsValue::from_str(key)).ok()?;
    if value.is_undefined() {
        return None;
    }
    Some(value.as_f64().unwrap_or(f64::NAN))
}

/// Writes the rate key and, when given, the last-non-default key.
pub(crate) fn write_stored_rates(rate: f64, last_non_default: Option<f64>) {
    if !storage_available() {
        return;
    }
    let items = Object::new();
    let _ = Reflect::set(&items, &JsValue::from_str(KEY_RATE), &JsValue::from_f64(rate));
    if let Some(last) = last_non_default {
        let _ = Reflect::set(&items, &JsValue::from_str(KEY_LAST), &JsValue::from_f64(last));
    }
    let _ = storage_local_set(items.as_ref());
}

/// Extracts `changes[key].newValue` from an `onChanged` payload. `None` when
/// this key did not change; a changed-but-non-numeric value arrives as NaN.
pub(crate) fn change_new_value(changes: &JsValue, key: &str) -> Option<f64> {
    let change = Reflect::get(changes, &JsValue::from_str(key)).ok()?;
    if change.is_undefined() || change.is_null() {
        return None;
    }
    let value = Reflect::get(&change, &JsValue::from_str("newValue")).ok();
    Some(value.and_then(|v| v.as_f64()).unwrap_or(f64::NAN))
}

/// Subscribes to `chrome.storage.onChanged`. The caller leaks the closure
/// (page lifetime).
pub(crate) fn add_storage_change_listener(listener: &Closure<dyn FnMut(JsValue, JsValue)>) {
    storage_on_changed_add_listener(listener.as_ref());
}

/// Subscribes to `chrome.runtime.onMessage`. The caller leaks the closure
/// (page lifetime).
pub(crate) fn add_message_listener(listener: &Closure<dyn FnMut(JsValue, JsValue, Function)>) {
    runtime_on_message_add_listener(listener.as_ref());
}

/// Reads a string property off a message object.
pub(crate) fn string_prop(value: &JsValue, key: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(key)).ok()?.as_string()
}

/// Reads a numeric property off a message object.
pub(crate) fn number_prop(value: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(value, &JsValue::from_str(key)).ok()?.as_f64()
}

/// Replies `{rate}` through `sendResponse`.
pub(crate) fn respond_rate(send_response: &Function, rate: f64) {
    let reply = Object::new();
    let _ = Reflect::set(&reply, &JsValue::from_str("rate"), &JsValue::from_f64(rate));
    if let Err(err) = send_response.call1(&JsValue::NULL, reply.as_ref()) {
        log::warn!("sendResponse failed: {err:?}");
    }
}

/// Replies `{error}` through `sendResponse`.
pub(crate) fn respond_error(send_response: &Function, message: &str) {
    let reply = Object::new();
    let _ = Reflect::set(&reply, &JsValue::from_str("error"), &JsValue::from_str(message));
    if let Err(err) = send_response.call1(&JsValue::NULL, reply.as_ref()) {
        log::warn!("sendResponse failed: {err:?}");
    }
}
