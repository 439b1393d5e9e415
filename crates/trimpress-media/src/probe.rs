// crates/trimpress-media/src/probe.rs
//
// In-process FFmpeg probing: duration and the presence of a video stream.

use std::path::Path;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{context::Input, input};
use ffmpeg::media::Type;
use tracing::{debug, warn};

use trimpress_core::error::MediaError;

/// Duration in seconds of a file that has a video stream.
pub fn probe_duration(path: &Path) -> Result<f64, MediaError> {
    let ctx = input(path).map_err(|e| {
        warn!(target: "media", "probe open failed for {}: {e}", path.display());
        MediaError::Open(e.to_string())
    })?;
    if ctx.streams().best(Type::Video).is_none() {
        return Err(MediaError::NoVideoStream);
    }
    let secs = container_duration(&ctx).ok_or(MediaError::DurationUnknown)?;
    debug!(target: "media", "duration {secs:.3}s <- {}", path.display());
    Ok(secs)
}

/// Container duration, falling back to the best video then audio stream.
pub(crate) fn container_duration(ctx: &Input) -> Option<f64> {
    let dur = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    if dur > 0.0 {
        return Some(dur);
    }
    let stream = ctx.streams().best(Type::Video)
        .or_else(|| ctx.streams().best(Type::Audio))?;
    let tb = stream.time_base();
    if tb.denominator() == 0 {
        return None;
    }
    let d = stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64;
    (d > 0.0).then_some(d)
}
