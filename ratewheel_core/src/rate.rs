// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rate arithmetic and formatting.
//!
//! All rate values flowing through the system pass through [`clamp`] or
//! [`sanitize`] before use, so the controller's invariant (`rate` always in
//! `[MIN_RATE, MAX_RATE]`) holds regardless of what storage, messages, or
//! the page supply. Comparisons always go through [`nearly_equal`]: repeated
//! clamped/rounded values accumulate representation error, so exact `f64`
//! equality is never meaningful here.

use alloc::string::String;

/// The neutral playback rate videos start at.
pub const DEFAULT_RATE: f64 = 1.0;

/// Increment applied by the nudge operations.
pub const STEP: f64 = 0.25;

/// Lower bound for the global rate.
pub const MIN_RATE: f64 = 0.25;

/// Upper bound for the global rate.
pub const MAX_RATE: f64 = 5.0;

/// Tolerance for all rate comparisons.
pub const EPSILON: f64 = 1e-4;

/// Clamps a rate into `[MIN_RATE, MAX_RATE]`.
#[must_use]
pub fn clamp(rate: f64) -> f64 {
    MAX_RATE.min(MIN_RATE.max(rate))
}

/// Sanitizes an externally supplied rate: non-finite values become
/// [`DEFAULT_RATE`], everything else is clamped.
///
/// Values are clamped but deliberately *not* rounded to the step grid —
/// a persisted `1.3` stays `1.3`.
#[must_use]
pub fn sanitize(value: f64) -> f64 {
    if !value.is_finite() {
        return DEFAULT_RATE;
    }
    clamp(value)
}

/// Rounds a rate to the nearest multiple of [`STEP`].
#[must_use]
pub fn round_to_step(value: f64) -> f64 {
    libm::round(value / STEP) * STEP
}

/// Returns `true` if two rates are equal within [`EPSILON`].
#[must_use]
pub fn nearly_equal(a: f64, b: f64) -> bool {
    libm::fabs(a - b) <= EPSILON
}

/// Formats a rate for display: two decimals with trailing zeros and a
/// trailing point stripped, suffixed `x` (`1x`, `1.5x`, `1.25x`).
#[must_use]
pub fn format_rate(rate: f64) -> String {
    let mut text = alloc::format!("{rate:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text.push('x');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_stays_in_range() {
        for value in [-10.0, 0.0, 0.24, 0.25, 1.0, 4.99, 5.0, 100.0] {
            let clamped = clamp(value);
            assert!((MIN_RATE..=MAX_RATE).contains(&clamped), "clamp({value})");
        }
    }

    #[test]
    fn clamp_is_idempotent() {
        for value in [-1.0, 0.3, 1.0, 2.5, 7.0] {
            assert_eq!(clamp(clamp(value)), clamp(value));
        }
    }

    #[test]
    fn sanitize_non_finite_is_default() {
        assert_eq!(sanitize(f64::NAN), DEFAULT_RATE);
        assert_eq!(sanitize(f64::INFINITY), DEFAULT_RATE);
        assert_eq!(sanitize(f64::NEG_INFINITY), DEFAULT_RATE);
    }

    #[test]
    fn sanitize_clamps_but_does_not_round() {
        assert_eq!(sanitize(1.3), 1.3);
        assert_eq!(sanitize(9.0), MAX_RATE);
        assert_eq!(sanitize(0.0), MIN_RATE);
    }

    #[test]
    fn round_to_step_snaps_to_grid() {
        assert!(nearly_equal(round_to_step(1.13), 1.25));
        assert!(nearly_equal(round_to_step(1.12), 1.0));
        assert!(nearly_equal(round_to_step(1.25), 1.25));
        assert!(nearly_equal(round_to_step(-0.1), 0.0));
    }

    #[test]
    fn nearly_equal_uses_tolerance() {
        assert!(nearly_equal(1.0, 1.0 + 0.5 * EPSILON));
        assert!(!nearly_equal(1.0, 1.0 + 2.0 * EPSILON));
    }

    #[test]
    fn format_strips_trailing_zeros() {
        assert_eq!(format_rate(1.0), "1x");
        assert_eq!(format_rate(1.5), "1.5x");
        assert_eq!(format_rate(1.25), "1.25x");
        assert_eq!(format_rate(2.0), "2x");
        assert_eq!(format_rate(0.75), "0.75x");
    }
}
