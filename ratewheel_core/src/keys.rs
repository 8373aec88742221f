// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard action table and seek arithmetic.
//!
//! The host listens for `keydown` at the document level (capturing phase)
//! and maps each key through [`Action::from_key`]. The rate actions operate
//! on the global rate and work even when no video resolves; the seek actions
//! need a concrete target video.

use crate::rate::STEP;

/// Seconds moved by one seek action.
pub const SEEK_STEP_SECONDS: f64 = 5.0;

/// A recognized keyboard action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Increase the global rate by one step (`d`).
    Faster,
    /// Decrease the global rate by one step (`a`).
    Slower,
    /// Toggle between default and the last non-default rate (`s`).
    ToggleDefault,
    /// Seek the active video back five seconds (`z`).
    SeekBack,
    /// Seek the active video forward five seconds (`x`).
    SeekForward,
}

impl Action {
    /// Maps a key string (as reported by the platform, e.g. `"D"`) to an
    /// action. Case-insensitive; only single-character keys match, so
    /// `"Delete"` and friends fall through.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let first = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match first.to_ascii_lowercase() {
            'd' => Some(Self::Faster),
            'a' => Some(Self::Slower),
            's' => Some(Self::ToggleDefault),
            'z' => Some(Self::SeekBack),
            'x' => Some(Self::SeekForward),
            _ => None,
        }
    }

    /// Returns the signed rate delta for the rate actions.
    #[must_use]
    pub const fn rate_delta(self) -> Option<f64> {
        match self {
            Self::Faster => Some(STEP),
            Self::Slower => Some(-STEP),
            _ => None,
        }
    }

    /// Returns the signed seek delta in seconds for the seek actions.
    #[must_use]
    pub const fn seek_delta(self) -> Option<f64> {
        match self {
            Self::SeekBack => Some(-SEEK_STEP_SECONDS),
            Self::SeekForward => Some(SEEK_STEP_SECONDS),
            _ => None,
        }
    }

    /// Whether the action needs a resolved active video.
    #[must_use]
    pub const fn needs_video(self) -> bool {
        matches!(self, Self::SeekBack | Self::SeekForward)
    }
}

/// Computes a seek target from the current position.
///
/// Clamps to `[0, duration]` when the duration is known and finite,
/// otherwise only the lower bound applies (live streams report an infinite
/// or unknown duration).
#[must_use]
pub fn seek_target(current: f64, delta: f64, duration: Option<f64>) -> f64 {
    let next = (current + delta).max(0.0);
    match duration {
        Some(d) if d.is_finite() => next.min(d),
        _ => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_table_is_case_insensitive() {
        assert_eq!(Action::from_key("d"), Some(Action::Faster));
        assert_eq!(Action::from_key("D"), Some(Action::Faster));
        assert_eq!(Action::from_key("a"), Some(Action::Slower));
        assert_eq!(Action::from_key("S"), Some(Action::ToggleDefault));
        assert_eq!(Action::from_key("z"), Some(Action::SeekBack));
        assert_eq!(Action::from_key("X"), Some(Action::SeekForward));
    }

    #[test]
    fn unrecognized_keys_fall_through() {
        assert_eq!(Action::from_key("q"), None);
        assert_eq!(Action::from_key("Delete"), None);
        assert_eq!(Action::from_key(" "), None);
        assert_eq!(Action::from_key(""), None);
    }

    #[test]
    fn only_seeks_need_a_video() {
        assert!(!Action::Faster.needs_video());
        assert!(!Action::Slower.needs_video());
        assert!(!Action::ToggleDefault.needs_video());
        assert!(Action::SeekBack.needs_video());
        assert!(Action::SeekForward.needs_video());
    }

    #[test]
    fn seek_clamps_at_zero() {
        assert_eq!(seek_target(2.0, -SEEK_STEP_SECONDS, Some(60.0)), 0.0);
    }

    #[test]
    fn seek_clamps_at_duration() {
        assert_eq!(seek_target(58.0, SEEK_STEP_SECONDS, Some(60.0)), 60.0);
    }

    #[test]
    fn unknown_duration_clamps_only_the_lower_bound() {
        assert_eq!(seek_target(58.0, SEEK_STEP_SECONDS, None), 63.0);
        assert_eq!(
            seek_target(58.0, SEEK_STEP_SECONDS, Some(f64::INFINITY)),
            63.0
        );
        assert_eq!(seek_target(1.0, -SEEK_STEP_SECONDS, None), 0.0);
    }

    #[test]
    fn seek_in_range_is_untouched() {
        assert_eq!(seek_target(30.0, SEEK_STEP_SECONDS, Some(60.0)), 35.0);
    }
}
