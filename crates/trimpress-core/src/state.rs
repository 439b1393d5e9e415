// crates/trimpress-core/src/state.rs
// Pure session data — no egui, no ffmpeg, no runtime handles.
//
// A Session exists from the moment a file is loaded until the next file
// replaces it. Every mutation that can break `0 <= start < end <= duration`
// goes through a method here so the invariant lives in one place.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::helpers::time::{ms_to_secs, secs_to_ms};

/// Smallest gap the two range handles may be pushed apart by.
pub const MIN_RANGE_SECS: f64 = 0.1;

/// Which of the two range sliders an interaction belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeHandle {
    Start,
    End,
}

/// Coarse transport state, derived from the session fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Paused,
    Playing,
}

/// What the periodic tick should do with the current playback position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickAction {
    /// Position is inside the range (or the tick is suppressed).
    Idle,
    /// Position fell before the range start.
    SeekToStart,
    /// Position overran the range end: rewind to start and pause.
    RewindAndPause,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub source_path:   Option<PathBuf>,
    pub duration_secs: f64,
    pub start_secs:    f64,
    pub end_secs:      f64,
    pub is_playing:    bool,
    /// Handle currently held down by the user. Ticks are suppressed while set.
    pub dragging:      Option<RangeHandle>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            source_path:   None,
            duration_secs: 0.0,
            start_secs:    0.0,
            end_secs:      0.0,
            is_playing:    false,
            dragging:      None,
        }
    }
}

impl Session {
    /// Fresh session for a newly opened file: the range spans the whole clip.
    pub fn loaded(path: PathBuf, duration_secs: f64) -> Self {
        Self {
            source_path:   Some(path),
            duration_secs,
            start_secs:    0.0,
            end_secs:      duration_secs,
            is_playing:    false,
            dragging:      None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.source_path.is_some()
    }

    pub fn phase(&self) -> Phase {
        match (self.is_loaded(), self.is_playing) {
            (false, _)    => Phase::Empty,
            (true, false) => Phase::Paused,
            (true, true)  => Phase::Playing,
        }
    }

    pub fn duration_ms(&self) -> u64 { secs_to_ms(self.duration_secs) }
    pub fn start_ms(&self)    -> u64 { secs_to_ms(self.start_secs) }
    pub fn end_ms(&self)      -> u64 { secs_to_ms(self.end_secs) }

    pub fn handle_ms(&self, handle: RangeHandle) -> u64 {
        match handle {
            RangeHandle::Start => self.start_ms(),
            RangeHandle::End   => self.end_ms(),
        }
    }

    /// Clamp a slider position in milliseconds to `[0, duration]`, in seconds.
    pub fn clamp_position_ms(&self, position_ms: u64) -> f64 {
        ms_to_secs(position_ms.min(self.duration_ms())).min(self.duration_secs)
    }

    /// Move one handle to `secs` (clamped to the clip) and restore the range
    /// invariant.
    ///
    /// Crossing the other handle pushes it away by `MIN_RANGE_SECS`, bounded by
    /// the clip. When that bound leaves no room (e.g. start dragged onto the
    /// very end of the clip) the moved handle is pulled back instead.
    pub fn move_handle(&mut self, handle: RangeHandle, secs: f64) {
        let pos = secs.clamp(0.0, self.duration_secs);
        match handle {
            RangeHandle::Start => {
                self.start_secs = pos;
                if self.start_secs >= self.end_secs {
                    self.end_secs = (self.start_secs + MIN_RANGE_SECS).min(self.duration_secs);
                    if self.start_secs >= self.end_secs {
                        self.start_secs = (self.end_secs - MIN_RANGE_SECS).max(0.0);
                    }
                }
            }
            RangeHandle::End => {
                self.end_secs = pos;
                if self.end_secs <= self.start_secs {
                    self.start_secs = (self.end_secs - MIN_RANGE_SECS).max(0.0);
                    if self.end_secs <= self.start_secs {
                        self.end_secs = (self.start_secs + MIN_RANGE_SECS).min(self.duration_secs);
                    }
                }
            }
        }
    }

    /// Apply a duration reported late by the playback surface.
    ///
    /// Returns `false` when the new value matches the current one to the
    /// millisecond, in which case the user's range is left alone.
    pub fn reset_duration(&mut self, duration_secs: f64) -> bool {
        if !self.is_loaded() || duration_secs <= 0.0 {
            return false;
        }
        if (duration_secs - self.duration_secs).abs() < 0.001 {
            return false;
        }
        self.duration_secs = duration_secs;
        self.end_secs      = duration_secs;
        if self.start_secs >= self.end_secs {
            self.start_secs = (self.end_secs - MIN_RANGE_SECS).max(0.0);
        }
        true
    }

    /// Decide what the periodic tick does at `position_secs`.
    pub fn tick_action(&self, position_secs: f64) -> TickAction {
        if !self.is_loaded() || self.dragging.is_some() {
            return TickAction::Idle;
        }
        if position_secs < self.start_secs {
            TickAction::SeekToStart
        } else if position_secs > self.end_secs {
            TickAction::RewindAndPause
        } else {
            TickAction::Idle
        }
    }

    /// The range as it will be handed to the encoder, clamped against the clip.
    pub fn selection(&self) -> RangeSelection {
        RangeSelection::clamped(self.start_secs, self.end_secs, self.duration_secs)
    }
}

/// Start/end pair used only at trim time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeSelection {
    pub start_secs: f64,
    pub end_secs:   f64,
}

impl RangeSelection {
    /// Clamp a raw range against `duration_secs`.
    ///
    /// The start may not sit within the final `MIN_RANGE_SECS` of the clip and
    /// the end may not sit before `MIN_RANGE_SECS`. The result is not
    /// guaranteed valid; check `is_valid` before encoding.
    ///
    /// ```
    /// use trimpress_core::state::RangeSelection;
    /// let r = RangeSelection::clamped(-1.0, 12.0, 10.0);
    /// assert_eq!(r.start_secs, 0.0);
    /// assert_eq!(r.end_secs, 10.0);
    /// assert!(r.is_valid());
    /// ```
    pub fn clamped(start_secs: f64, end_secs: f64, duration_secs: f64) -> Self {
        let start = start_secs.min(duration_secs - MIN_RANGE_SECS).max(0.0);
        let end   = end_secs.min(duration_secs).max(MIN_RANGE_SECS);
        Self { start_secs: start, end_secs: end }
    }

    pub fn is_valid(&self) -> bool {
        self.start_secs < self.end_secs
    }

    pub fn len_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_second_clip() -> Session {
        Session::loaded(PathBuf::from("clip.mp4"), 10.0)
    }

    #[test]
    fn load_spans_whole_clip() {
        for d in [0.05, 0.1, 1.0, 10.0, 3600.5] {
            let s = Session::loaded(PathBuf::from("a.mkv"), d);
            assert_eq!(s.start_secs, 0.0);
            assert_eq!(s.end_secs, d);
            assert!(s.start_secs < s.end_secs);
            assert_eq!(s.phase(), Phase::Paused);
        }
    }

    #[test]
    fn empty_session_is_empty_phase() {
        assert_eq!(Session::default().phase(), Phase::Empty);
    }

    #[test]
    fn start_past_end_pushes_end() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::End, 3.0);
        s.move_handle(RangeHandle::Start, 5.0);
        assert_eq!(s.start_secs, 5.0);
        assert!((s.end_secs - 5.1).abs() < 1e-9);
    }

    #[test]
    fn start_onto_clip_end_pulls_start_back() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::Start, 10.0);
        assert_eq!(s.end_secs, 10.0);
        assert!((s.start_secs - 9.9).abs() < 1e-9);
        assert!(s.start_secs < s.end_secs);
    }

    #[test]
    fn end_before_start_pushes_start() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::Start, 4.0);
        s.move_handle(RangeHandle::End, 2.0);
        assert_eq!(s.end_secs, 2.0);
        assert!((s.start_secs - 1.9).abs() < 1e-9);
    }

    #[test]
    fn end_onto_zero_pulls_end_forward() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::End, 0.0);
        assert_eq!(s.start_secs, 0.0);
        assert!((s.end_secs - 0.1).abs() < 1e-9);
    }

    #[test]
    fn handle_positions_clamp_to_clip() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::End, 42.0);
        assert_eq!(s.end_secs, 10.0);
        s.move_handle(RangeHandle::Start, -3.0);
        assert_eq!(s.start_secs, 0.0);
    }

    #[test]
    fn tiny_clip_keeps_invariant() {
        let mut s = Session::loaded(PathBuf::from("blip.mp4"), 0.05);
        s.move_handle(RangeHandle::Start, 0.05);
        assert!(s.start_secs < s.end_secs);
        s.move_handle(RangeHandle::End, 0.0);
        assert!(s.start_secs < s.end_secs);
    }

    #[test]
    fn tick_action_follows_range() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::Start, 2.0);
        s.move_handle(RangeHandle::End, 3.0);
        assert_eq!(s.tick_action(1.0), TickAction::SeekToStart);
        assert_eq!(s.tick_action(2.5), TickAction::Idle);
        assert_eq!(s.tick_action(3.0), TickAction::Idle);
        assert_eq!(s.tick_action(3.5), TickAction::RewindAndPause);
    }

    #[test]
    fn tick_suppressed_while_dragging() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::End, 3.0);
        s.dragging = Some(RangeHandle::End);
        assert_eq!(s.tick_action(9.0), TickAction::Idle);
    }

    #[test]
    fn late_duration_resets_end() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::Start, 7.0);
        assert!(s.reset_duration(5.0));
        assert_eq!(s.end_secs, 5.0);
        assert!((s.start_secs - 4.9).abs() < 1e-9);
    }

    #[test]
    fn identical_duration_keeps_range() {
        let mut s = ten_second_clip();
        s.move_handle(RangeHandle::End, 4.0);
        assert!(!s.reset_duration(10.0004));
        assert_eq!(s.end_secs, 4.0);
    }

    #[test]
    fn clamped_selection_can_be_invalid() {
        let r = RangeSelection::clamped(5.0, 5.0, 10.0);
        assert!(!r.is_valid());
        assert_eq!(r.len_secs(), 0.0);
    }

    #[test]
    fn clamp_position_respects_duration() {
        let s = ten_second_clip();
        assert_eq!(s.clamp_position_ms(25_000), 10.0);
        assert_eq!(s.clamp_position_ms(3_000), 3.0);
    }
}
