// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core model for the Ratewheel page controller.
//!
//! `ratewheel_core` provides the platform-free logic behind a playback-rate
//! controller for pages with one or more video elements: a single global
//! target rate, a per-video write/reconcile state machine, an active-video
//! selection heuristic, and the debounce model for the transient on-video
//! overlay. It is `no_std` compatible (with `alloc`) and fully testable on
//! the host; all browser I/O lives in `ratewheel_web`.
//!
//! # Architecture
//!
//! The crate is organized around an event loop owned by the host: every
//! external stimulus is turned into a plain value the host executes against
//! its video elements.
//!
//! ```text
//!   keyboard / storage / messages
//!            │
//!            ▼
//!   RateController ──► RateUpdate ──► host applies rate to all videos,
//!            │                        shows overlays, persists
//!            ▼
//!   Reconciler::note_write()
//!            │
//!   native ratechange event
//!            │
//!            ▼
//!   Reconciler::observe() ──► Outcome ──► host confirms / corrects /
//!                                         surfaces the change
//! ```
//!
//! **[`rate`]** — Clamping, step rounding, float-tolerant comparison, and
//! display formatting for playback rates.
//!
//! **[`controller`]** — The single global target rate and the remembered
//! last non-default rate. Mutating entry points return a
//! [`RateUpdate`](controller::RateUpdate) describing what the host must do.
//!
//! **[`reconcile`]** — Two-state machine per bound video that classifies
//! native rate changes as self-inflicted, page-inflicted, or genuinely
//! external.
//!
//! **[`select`]** — Heuristic choosing which video keyboard actions target.
//!
//! **[`overlay`]** — Generation-token debounce for the overlay hide timer.
//!
//! **[`keys`]** — Keyboard action table and seek-target arithmetic.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod controller;
pub mod keys;
pub mod overlay;
pub mod rate;
pub mod reconcile;
pub mod select;
