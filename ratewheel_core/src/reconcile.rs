// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-video classification of native rate changes.
//!
//! Every programmatic `playbackRate` write is followed (asynchronously,
//! never reentrant-synchronously) by a native rate-change notification, and
//! pages and players mutate the rate on their own as well. The [`Reconciler`]
//! is a two-state machine — `Idle` ⇄ pending write — that classifies each
//! notification so the host can react without feedback loops:
//!
//! | observed rate                   | pending write | outcome           |
//! |---------------------------------|---------------|-------------------|
//! | matches the expected rate       | yes           | [`Confirmed`]     |
//! | differs from the global target  | —             | [`Corrected`]     |
//! | equals the global target        | no            | [`ExternalMatch`] |
//!
//! [`Confirmed`]: Outcome::Confirmed
//! [`Corrected`]: Outcome::Corrected
//! [`ExternalMatch`]: Outcome::ExternalMatch

use crate::rate::nearly_equal;

/// How the host must react to a native rate-change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Our own write confirmed: refresh the label only, no overlay.
    Confirmed,
    /// The page moved the rate off the global target: force the global rate
    /// back onto the video, overlay *not* shown (silent correction avoids a
    /// flicker loop).
    Corrected,
    /// An independent external change landed exactly on the target: refresh
    /// the label and show the overlay so the user notices.
    ExternalMatch,
}

/// Two-state write/reconcile machine for one bound video.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler {
    expected: Option<f64>,
}

impl Reconciler {
    /// Creates a reconciler in the idle state.
    #[must_use]
    pub const fn new() -> Self {
        Self { expected: None }
    }

    /// Records the rate about to be written programmatically. Must be called
    /// immediately before the native write so the resulting notification can
    /// be classified as self-inflicted.
    pub const fn note_write(&mut self, rate: f64) {
        self.expected = Some(rate);
    }

    /// Decides whether a programmatic write is needed to move `current` to
    /// `target`, recording the pending write only when one will happen.
    /// Writing an already-current rate would start a reconciliation cycle
    /// with no notification to close it.
    #[must_use]
    pub fn prepare_write(&mut self, current: f64, target: f64) -> bool {
        if nearly_equal(current, target) {
            return false;
        }
        self.note_write(target);
        true
    }

    /// Returns the pending expected rate, if a write is awaiting
    /// confirmation.
    #[must_use]
    pub const fn pending(&self) -> Option<f64> {
        self.expected
    }

    /// Classifies a native rate-change notification.
    ///
    /// `observed` must already be sanitized; `global` is the current global
    /// target rate. Either way the machine returns to idle — a correction
    /// records a fresh pending write when the host reapplies.
    pub fn observe(&mut self, observed: f64, global: f64) -> Outcome {
        if let Some(expected) = self.expected
            && nearly_equal(observed, expected)
        {
            self.expected = None;
            return Outcome::Confirmed;
        }
        self.expected = None;

        if !nearly_equal(observed, global) {
            Outcome::Corrected
        } else {
            Outcome::ExternalMatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_write_is_confirmed_silently() {
        let mut rec = Reconciler::new();
        rec.note_write(1.5);
        assert_eq!(rec.observe(1.5, 1.5), Outcome::Confirmed);
        assert_eq!(rec.pending(), None);
    }

    #[test]
    fn confirmation_tolerates_float_noise() {
        let mut rec = Reconciler::new();
        rec.note_write(1.5);
        assert_eq!(rec.observe(1.5 + 5e-5, 1.5), Outcome::Confirmed);
    }

    #[test]
    fn redundant_write_records_no_pending() {
        let mut rec = Reconciler::new();
        assert!(!rec.prepare_write(1.5, 1.5));
        assert!(!rec.prepare_write(1.5, 1.5 + 5e-5), "tolerance applies");
        assert_eq!(rec.pending(), None);
    }

    #[test]
    fn needed_write_records_the_target() {
        let mut rec = Reconciler::new();
        assert!(rec.prepare_write(1.0, 1.5));
        assert_eq!(rec.pending(), Some(1.5));
        assert_eq!(rec.observe(1.5, 1.5), Outcome::Confirmed);
    }

    #[test]
    fn off_target_change_is_corrected() {
        // Page reset its own rate to 1.0 while the target is 2.0.
        let mut rec = Reconciler::new();
        assert_eq!(rec.observe(1.0, 2.0), Outcome::Corrected);
        assert_eq!(rec.pending(), None);
    }

    #[test]
    fn mismatched_pending_write_is_corrected() {
        // A write was pending but the observed rate matches neither the
        // expected nor the global rate.
        let mut rec = Reconciler::new();
        rec.note_write(2.0);
        assert_eq!(rec.observe(1.25, 2.0), Outcome::Corrected);
        assert_eq!(rec.pending(), None, "correction returns to idle");
    }

    #[test]
    fn external_change_on_target_is_surfaced() {
        let mut rec = Reconciler::new();
        assert_eq!(rec.observe(2.0, 2.0), Outcome::ExternalMatch);
    }

    #[test]
    fn correction_cycle_settles() {
        // Corrected → host reapplies (note_write) → notification confirms.
        let mut rec = Reconciler::new();
        assert_eq!(rec.observe(1.0, 2.0), Outcome::Corrected);
        rec.note_write(2.0);
        assert_eq!(rec.observe(2.0, 2.0), Outcome::Confirmed);
    }
}
