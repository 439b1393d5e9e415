// crates/trimpress-core/src/media_types.rs
//
// Types that flow across the channels between trimpress-media and
// trimpress-ui. No egui, no ffmpeg — just plain data.

use std::path::PathBuf;
use uuid::Uuid;

use crate::error::MediaError;

pub type JobId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Trim,
    Compress,
}

impl JobKind {
    pub fn verb(self) -> &'static str {
        match self {
            JobKind::Trim     => "trimmed",
            JobKind::Compress => "compressed",
        }
    }
}

/// Results sent from the MediaWorker job threads to the UI.
#[derive(Debug)]
pub enum MediaResult {
    /// Fraction of the job done, 0.0..=1.0.
    JobProgress  { job_id: JobId, fraction: f32 },
    JobDone      { job_id: JobId, output: PathBuf },
    JobFailed    { job_id: JobId, error: MediaError },
    JobCancelled { job_id: JobId },
}

impl MediaResult {
    pub fn job_id(&self) -> JobId {
        match self {
            MediaResult::JobProgress { job_id, .. }
            | MediaResult::JobDone { job_id, .. }
            | MediaResult::JobFailed { job_id, .. }
            | MediaResult::JobCancelled { job_id } => *job_id,
        }
    }
}

/// Notifications raised by a playback surface, drained on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    DurationKnown { ms: u64 },
    Error(String),
    /// Playback reached the end of the media.
    Finished,
}

/// A decoded RGBA frame from the preview pipeline.
pub struct PlaybackFrame {
    /// Bumped on every seek/play so frames from an abandoned run are dropped.
    pub generation: u64,
    pub timestamp:  f64,
    pub width:      u32,
    pub height:     u32,
    pub data:       Vec<u8>,
}
