// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounce model for the overlay hide timer.
//!
//! Each show trigger extends the visible window instead of stacking timers:
//! [`OverlayTimer::trigger`] hands out a generation token, and only the
//! timeout carrying the *current* token hides the overlay. The host
//! additionally cancels superseded platform timers, but correctness does not
//! depend on that — a stale timeout firing anyway is ignored here.

/// Milliseconds the overlay stays visible after the last trigger.
pub const OVERLAY_TIMEOUT_MS: u32 = 2000;

/// Visibility state plus the generation token guarding the hide timeout.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayTimer {
    visible: bool,
    generation: u64,
}

impl OverlayTimer {
    /// Creates a hidden overlay timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            visible: false,
            generation: 0,
        }
    }

    /// Marks the overlay visible and returns the token the host must pass
    /// back when the scheduled hide timeout fires.
    pub const fn trigger(&mut self) -> u64 {
        self.visible = true;
        self.generation += 1;
        self.generation
    }

    /// Handles a fired hide timeout. Returns `true` when the overlay should
    /// actually be hidden now; stale tokens (superseded by a later trigger)
    /// return `false`.
    pub const fn on_timeout(&mut self, token: u64) -> bool {
        if token == self.generation && self.visible {
            self.visible = false;
            true
        } else {
            false
        }
    }

    /// Returns `true` while the overlay is marked visible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_then_timeout_hides_once() {
        let mut timer = OverlayTimer::new();
        let token = timer.trigger();
        assert!(timer.is_visible());
        assert!(timer.on_timeout(token));
        assert!(!timer.is_visible());
        // The same timeout firing twice must not report a second hide.
        assert!(!timer.on_timeout(token));
    }

    #[test]
    fn second_trigger_supersedes_first_timeout() {
        let mut timer = OverlayTimer::new();
        let first = timer.trigger();
        let second = timer.trigger();

        // The first timeout fires late and is ignored.
        assert!(!timer.on_timeout(first));
        assert!(timer.is_visible(), "stale timeout must not hide");

        // Exactly one hide, keyed to the second trigger.
        assert!(timer.on_timeout(second));
        assert!(!timer.is_visible());
    }

    #[test]
    fn timeout_without_trigger_is_ignored() {
        let mut timer = OverlayTimer::new();
        assert!(!timer.on_timeout(0));
        assert!(!timer.is_visible());
    }
}
