// crates/trimpress-core/src/commands.rs
//
// Every user action in TrimPress is expressed as a SessionCommand.
// Panels emit these; app.rs processes them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use crate::state::RangeHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    // ── Source ───────────────────────────────────────────────────────────────
    /// Show the open dialog.
    PickFile,
    /// Load a file directly (drag-and-drop, or the open dialog's answer).
    OpenFile(PathBuf),

    // ── Transport ────────────────────────────────────────────────────────────
    TogglePlay,

    // ── Range sliders ────────────────────────────────────────────────────────
    SliderPressed(RangeHandle),
    /// Emitted once per interaction, with the slider's final value.
    SliderReleased { handle: RangeHandle, position_ms: u64 },

    // ── Export ───────────────────────────────────────────────────────────────
    /// Validate the range, then ask for an output path and start a trim.
    Trim,
    /// Validate bitrate/resolution, then ask for an output path and start a compress.
    Compress { bitrate: String, resolution: String },
    CancelJob,

    // ── UI ───────────────────────────────────────────────────────────────────
    DismissNotice,
}
