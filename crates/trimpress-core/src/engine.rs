// crates/trimpress-core/src/engine.rs
//
// The two collaborators the controller drives, as traits so the state machine
// can be exercised without FFmpeg or a window:
//
//   MediaEngine      — probe, trim and transcode. Long-running work is
//                      submitted here and answered later with a MediaResult
//                      carrying the same job id.
//   PlaybackSurface  — renders the preview and owns the transport clock.

use std::path::{Path, PathBuf};

use crate::error::MediaError;
use crate::helpers::encode_params::{Bitrate, Resolution};
use crate::media_types::{JobId, SurfaceEvent};
use crate::settings::EncodeSettings;

/// Extract `[start_secs, end_secs)` of `source` into `output`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeJob {
    pub job_id:     JobId,
    pub source:     PathBuf,
    pub start_secs: f64,
    pub end_secs:   f64,
    pub output:     PathBuf,
    pub encode:     EncodeSettings,
}

impl RangeJob {
    pub fn duration_secs(&self) -> f64 {
        (self.end_secs - self.start_secs).max(0.0)
    }
}

/// Re-encode the whole of `source` at `bitrate` and `resolution`.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscodeJob {
    pub job_id:        JobId,
    pub source:        PathBuf,
    pub output:        PathBuf,
    pub bitrate:       Bitrate,
    pub resolution:    Resolution,
    /// Source duration, used only to turn encoder time into progress.
    pub duration_secs: f64,
    pub encode:        EncodeSettings,
}

pub trait MediaEngine {
    /// Open `path` and return its duration in seconds. Blocking but short.
    fn open(&self, path: &Path) -> Result<f64, MediaError>;

    /// Start a trim job. Completion arrives as a `MediaResult` for `job.job_id`.
    fn extract_range(&self, job: RangeJob);

    /// Start a transcode job. Completion arrives as a `MediaResult` for `job.job_id`.
    fn transcode(&self, job: TranscodeJob);

    /// Abandon a running job. A `JobCancelled` result follows.
    fn cancel(&self, job_id: JobId);
}

pub trait PlaybackSurface {
    fn set_source(&mut self, path: &Path);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position_ms: u64);
    /// Current transport position, polled by the tick.
    fn position_ms(&self) -> u64;
    /// Next pending notification, if any.
    fn poll_event(&mut self) -> Option<SurfaceEvent>;
}
