// Copyright 2026 the Ratewheel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-video selection heuristic.
//!
//! Keyboard actions need one target among possibly many videos. The host
//! snapshots each video into a [`Candidate`] (visibility, playing state,
//! rendered area) and [`choose`] picks an index. Selection runs fresh on
//! every keyboard action; only the sticky most-recently-activated video is
//! carried across calls, and the host passes it in as `sticky` while that
//! element is still in the document.

/// Snapshot of one video element for selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Non-zero rendered size, not hidden, and intersecting the viewport.
    pub visible: bool,
    /// Neither paused nor ended.
    pub playing: bool,
    /// Rendered area (width × height) in square pixels.
    pub area: f64,
}

/// Chooses the keyboard target among `candidates`.
///
/// The sticky index (the most recently activated video, already validated
/// by the host as still present) wins outright — this avoids flicker while
/// the user is mid-interaction with one of several videos. Otherwise the
/// pool is narrowed to visible candidates (falling back to all when none
/// are visible), playing videos are preferred, and ties resolve to the
/// largest rendered area, later candidates winning exact ties. Returns
/// `None` when `candidates` is empty.
#[must_use]
pub fn choose(candidates: &[Candidate], sticky: Option<usize>) -> Option<usize> {
    if let Some(index) = sticky
        && index < candidates.len()
    {
        return Some(index);
    }
    if candidates.is_empty() {
        return None;
    }

    let any_visible = candidates.iter().any(|c| c.visible);
    let in_pool = |c: &Candidate| !any_visible || c.visible;

    largest(candidates, |c| in_pool(c) && c.playing).or_else(|| largest(candidates, in_pool))
}

/// Index of the largest-area candidate satisfying `filter`, later entries
/// winning ties.
fn largest(candidates: &[Candidate], filter: impl Fn(&Candidate) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if !filter(candidate) {
            continue;
        }
        match best {
            Some(current) if candidate.area < candidates[current].area => {}
            _ => best = Some(index),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(visible: bool, playing: bool, area: f64) -> Candidate {
        Candidate {
            visible,
            playing,
            area,
        }
    }

    #[test]
    fn empty_list_has_no_target() {
        assert_eq!(choose(&[], None), None);
    }

    #[test]
    fn sticky_wins_regardless_of_state() {
        let candidates = [
            video(true, true, 1000.0),
            video(false, false, 1.0),
            video(true, true, 2000.0),
        ];
        assert_eq!(choose(&candidates, Some(1)), Some(1));
    }

    #[test]
    fn stale_sticky_index_is_ignored() {
        let candidates = [video(true, false, 100.0)];
        assert_eq!(choose(&candidates, Some(5)), Some(0));
    }

    #[test]
    fn single_playing_video_wins_regardless_of_size() {
        let candidates = [
            video(true, false, 10_000.0),
            video(true, true, 1.0),
            video(true, false, 40_000.0),
        ];
        assert_eq!(choose(&candidates, None), Some(1));
    }

    #[test]
    fn largest_playing_video_wins_among_several() {
        let candidates = [
            video(true, true, 100.0),
            video(true, true, 400.0),
            video(true, true, 225.0),
        ];
        assert_eq!(choose(&candidates, None), Some(1));
    }

    #[test]
    fn largest_area_wins_when_none_playing() {
        let candidates = [
            video(true, false, 100.0),
            video(true, false, 400.0),
            video(true, false, 225.0),
        ];
        assert_eq!(choose(&candidates, None), Some(1));
    }

    #[test]
    fn hidden_videos_are_skipped_when_a_visible_one_exists() {
        let candidates = [
            video(false, true, 40_000.0),
            video(true, false, 100.0),
        ];
        assert_eq!(choose(&candidates, None), Some(1));
    }

    #[test]
    fn falls_back_to_hidden_pool_when_nothing_is_visible() {
        let candidates = [
            video(false, false, 100.0),
            video(false, false, 400.0),
        ];
        assert_eq!(choose(&candidates, None), Some(1));
    }

    #[test]
    fn heuristic_picks_are_not_sticky() {
        // Without an activation, each round re-runs the heuristic: a larger
        // video appearing later takes over from the previous round's pick.
        let before = [video(true, false, 400.0), video(true, false, 100.0)];
        assert_eq!(choose(&before, None), Some(0));

        let after = [
            video(true, false, 400.0),
            video(true, false, 100.0),
            video(true, false, 900.0),
        ];
        assert_eq!(choose(&after, None), Some(2));
    }

    #[test]
    fn later_candidate_wins_area_tie() {
        let candidates = [
            video(true, false, 400.0),
            video(true, false, 400.0),
        ];
        assert_eq!(choose(&candidates, None), Some(1));
    }
}
