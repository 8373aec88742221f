// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The global target rate and its controlled mutation entry points.
//!
//! [`RateController`] is the only owner of the global rate state. Every
//! mutating entry point returns a [`RateUpdate`] value describing what the
//! host has to do — apply the rate to all bound videos, optionally flash
//! their overlays, optionally persist — so the controller itself never
//! touches a video element or a storage key and stays testable without a
//! browser.

use crate::rate::{DEFAULT_RATE, clamp, nearly_equal, round_to_step, sanitize};

/// Options for [`RateController::set_rate`].
#[derive(Clone, Copy, Debug)]
pub struct SetOptions {
    /// Whether the change should be written to the persistence store.
    pub persist: bool,
    /// Whether overlays should be shown when the rate is applied.
    pub show: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self {
            persist: true,
            show: true,
        }
    }
}

/// Fire-and-forget persistence payload carried by a [`RateUpdate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersistRequest {
    /// The rate to store under the rate key.
    pub rate: f64,
    /// The value to store under the last-non-default key, when the new rate
    /// is itself non-default. `None` leaves the stored key untouched.
    pub last_non_default: Option<f64>,
}

/// What the host must do after a controller mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateUpdate {
    /// The (clamped) rate to apply to every bound video.
    pub rate: f64,
    /// Whether to flash each video's overlay while applying.
    pub show: bool,
    /// Persistence request, if the mutation should be stored.
    pub persist: Option<PersistRequest>,
}

/// The single global target rate plus the remembered last non-default rate.
///
/// One instance exists per page session. All other components treat the rate
/// as read-only; only the methods here mutate it.
#[derive(Clone, Copy, Debug)]
pub struct RateController {
    rate: f64,
    last_non_default: Option<f64>,
}

impl Default for RateController {
    fn default() -> Self {
        Self::new()
    }
}

impl RateController {
    /// Creates a controller at the default rate with no remembered rate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rate: DEFAULT_RATE,
            last_non_default: None,
        }
    }

    /// Returns the current global rate. Always within `[0.25, 5.0]`.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the remembered last non-default rate, if any.
    #[must_use]
    pub const fn last_non_default(&self) -> Option<f64> {
        self.last_non_default
    }

    /// Sets the global rate.
    ///
    /// The input is clamped. If the new rate is non-default it becomes the
    /// remembered last-non-default rate; otherwise, if the *previous* rate
    /// was non-default, that is remembered instead. This preserves the
    /// restore target across a default→default no-op and across restores.
    pub fn set_rate(&mut self, rate: f64, opts: SetOptions) -> RateUpdate {
        let clamped = clamp(rate);
        let prev = self.rate;
        self.rate = clamped;

        if !nearly_equal(clamped, DEFAULT_RATE) {
            self.last_non_default = Some(clamped);
        } else if !nearly_equal(prev, DEFAULT_RATE) {
            self.last_non_default = Some(prev);
        }

        let persist = opts.persist.then(|| PersistRequest {
            rate: clamped,
            last_non_default: (!nearly_equal(clamped, DEFAULT_RATE)).then_some(clamped),
        });

        RateUpdate {
            rate: clamped,
            show: opts.show,
            persist,
        }
    }

    /// Steps the rate by `delta`, snapped to the step grid.
    pub fn nudge(&mut self, delta: f64) -> RateUpdate {
        self.set_rate(round_to_step(self.rate + delta), SetOptions::default())
    }

    /// Toggles between the default rate and the last non-default rate.
    ///
    /// At a non-default rate this returns to default; at the default rate it
    /// restores the remembered rate if one exists and is itself non-default.
    /// Returns `None` when there is nothing to do.
    pub fn toggle_default(&mut self) -> Option<RateUpdate> {
        if !nearly_equal(self.rate, DEFAULT_RATE) {
            return Some(self.set_rate(DEFAULT_RATE, SetOptions::default()));
        }
        match self.last_non_default {
            Some(last) if !nearly_equal(last, DEFAULT_RATE) => {
                Some(self.set_rate(last, SetOptions::default()))
            }
            _ => None,
        }
    }

    /// Adopts values read from the persistence store at startup.
    ///
    /// `rate_entry`/`last_entry` are `None` when the key was absent; stored
    /// garbage arrives as NaN. Returns `true` when the sanitized rate should
    /// be written back (key absent, or sanitization changed the value).
    pub fn adopt_stored(&mut self, rate_entry: Option<f64>, last_entry: Option<f64>) -> bool {
        let stored = rate_entry.unwrap_or(DEFAULT_RATE);
        self.rate = sanitize(stored);
        self.last_non_default = last_entry.filter(|v| v.is_finite()).map(clamp);
        rate_entry.is_none() || stored != self.rate
    }

    /// Adopts a rate change that arrived from outside this page (another
    /// tab, the popup). The change is already persisted, so the returned
    /// update only reapplies and surfaces it via the overlay.
    pub fn external_rate_change(&mut self, value: f64) -> RateUpdate {
        self.rate = sanitize(value);
        RateUpdate {
            rate: self.rate,
            show: true,
            persist: None,
        }
    }

    /// Adopts an externally changed last-non-default value.
    pub fn external_last_change(&mut self, value: Option<f64>) {
        self.last_non_default = value.filter(|v| v.is_finite()).map(clamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::STEP;

    fn silent() -> SetOptions {
        SetOptions {
            persist: false,
            show: false,
        }
    }

    #[test]
    fn set_rate_clamps_input() {
        let mut ctl = RateController::new();
        for value in [-3.0, 0.1, 1.75, 8.0] {
            let update = ctl.set_rate(value, silent());
            assert_eq!(update.rate, clamp(value));
            assert_eq!(ctl.rate(), clamp(value));
        }
    }

    #[test]
    fn toggle_law_round_trip() {
        let mut ctl = RateController::new();
        for _ in 0..4 {
            ctl.nudge(STEP);
        }
        assert!(nearly_equal(ctl.rate(), 2.0));

        let back = ctl.toggle_default().expect("toggle to default");
        assert!(nearly_equal(back.rate, DEFAULT_RATE));

        let restored = ctl.toggle_default().expect("restore last rate");
        assert!(nearly_equal(restored.rate, 2.0));
    }

    #[test]
    fn toggle_is_noop_without_memory() {
        let mut ctl = RateController::new();
        assert!(ctl.toggle_default().is_none());
        assert!(nearly_equal(ctl.rate(), DEFAULT_RATE));
    }

    #[test]
    fn last_non_default_survives_default_set() {
        let mut ctl = RateController::new();
        ctl.set_rate(1.5, silent());
        // Setting default again records the previous non-default rate.
        ctl.set_rate(DEFAULT_RATE, silent());
        assert_eq!(ctl.last_non_default(), Some(1.5));
        // A second default→default write keeps it.
        ctl.set_rate(DEFAULT_RATE, silent());
        assert_eq!(ctl.last_non_default(), Some(1.5));
    }

    #[test]
    fn persist_payload_includes_last_only_when_non_default() {
        let mut ctl = RateController::new();
        let up = ctl.set_rate(1.75, SetOptions::default());
        assert_eq!(
            up.persist,
            Some(PersistRequest {
                rate: 1.75,
                last_non_default: Some(1.75),
            })
        );

        let up = ctl.set_rate(DEFAULT_RATE, SetOptions::default());
        let persist = up.persist.expect("persist requested");
        assert_eq!(persist.rate, DEFAULT_RATE);
        assert_eq!(persist.last_non_default, None);
    }

    #[test]
    fn nudge_snaps_to_grid() {
        let mut ctl = RateController::new();
        ctl.set_rate(1.3, silent());
        let up = ctl.nudge(STEP);
        // 1.3 + 0.25 = 1.55 → rounds to 1.5.
        assert!(nearly_equal(up.rate, 1.5));
    }

    #[test]
    fn nudge_stops_at_bounds() {
        let mut ctl = RateController::new();
        ctl.set_rate(5.0, silent());
        assert!(nearly_equal(ctl.nudge(STEP).rate, 5.0));
        ctl.set_rate(0.25, silent());
        assert!(nearly_equal(ctl.nudge(-STEP).rate, 0.25));
    }

    #[test]
    fn adopt_stored_defaults_when_absent() {
        let mut ctl = RateController::new();
        let write_back = ctl.adopt_stored(None, None);
        assert!(write_back, "absent key must be written back");
        assert_eq!(ctl.rate(), DEFAULT_RATE);
        assert_eq!(ctl.last_non_default(), None);
    }

    #[test]
    fn adopt_stored_sanitizes_and_reports_correction() {
        let mut ctl = RateController::new();
        assert!(ctl.adopt_stored(Some(f64::NAN), None));
        assert_eq!(ctl.rate(), DEFAULT_RATE);

        assert!(ctl.adopt_stored(Some(9.0), None));
        assert_eq!(ctl.rate(), 5.0);

        assert!(!ctl.adopt_stored(Some(1.5), Some(2.0)));
        assert_eq!(ctl.rate(), 1.5);
        assert_eq!(ctl.last_non_default(), Some(2.0));
    }

    #[test]
    fn adopt_stored_clamps_last_and_drops_garbage() {
        let mut ctl = RateController::new();
        ctl.adopt_stored(Some(1.0), Some(11.0));
        assert_eq!(ctl.last_non_default(), Some(5.0));
        ctl.adopt_stored(Some(1.0), Some(f64::NAN));
        assert_eq!(ctl.last_non_default(), None);
    }

    #[test]
    fn external_rate_change_shows_without_persisting() {
        let mut ctl = RateController::new();
        let up = ctl.external_rate_change(2.5);
        assert_eq!(up.rate, 2.5);
        assert!(up.show);
        assert!(up.persist.is_none());
    }
}
