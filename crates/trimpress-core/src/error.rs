// crates/trimpress-core/src/error.rs
//
// Two error layers:
//   MediaError   — what the FFmpeg side can report (probe, spawn, exit status).
//   SessionError — what the controller hands to the UI boundary. Every
//                  variant ends up in a blocking notice; none is fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not open media: {0}")]
    Open(String),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("duration unknown")]
    DurationUnknown,

    #[error("ffmpeg executable not found (set TRIMPRESS_FFMPEG or add ffmpeg to PATH)")]
    FfmpegNotFound,

    #[error("failed to run ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {}: {stderr}", .code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    Failed { code: Option<i32>, stderr: String },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not load {}: {source}", path.display())]
    FileLoad {
        path:   PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("no file loaded")]
    NoSource,

    #[error("invalid trim range {start:.3}s..{end:.3}s (start must be before end)")]
    InvalidRange { start: f64, end: f64 },

    #[error("invalid resolution \"{0}\" (use WIDTHxHEIGHT, e.g. 640x360)")]
    InvalidResolution(String),

    #[error("invalid bitrate \"{0}\" (use e.g. 500k or 2M)")]
    InvalidBitrate(String),

    #[error("encoding failed: {0}")]
    Encode(#[source] MediaError),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("another export is still running")]
    Busy,

    #[error("the output {} is the file being edited; choose another name", .0.display())]
    OutputIsSource(PathBuf),
}

impl SessionError {
    /// Title line for the notice dialog.
    pub fn title(&self) -> &'static str {
        match self {
            SessionError::FileLoad { .. }       => "Could not load video",
            SessionError::NoSource              => "No file loaded",
            SessionError::InvalidRange { .. }   => "Invalid range",
            SessionError::InvalidResolution(_)  => "Invalid resolution",
            SessionError::InvalidBitrate(_)     => "Invalid bitrate",
            SessionError::Encode(_)             => "Export failed",
            SessionError::Playback(_)           => "Playback error",
            SessionError::Busy                  => "Export in progress",
            SessionError::OutputIsSource(_)     => "Invalid output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_message_mentions_exit_code() {
        let e = MediaError::Failed { code: Some(1), stderr: "Invalid argument".into() };
        assert_eq!(e.to_string(), "ffmpeg exited with code 1: Invalid argument");
        let e = MediaError::Failed { code: None, stderr: String::new() };
        assert!(e.to_string().starts_with("ffmpeg exited with a signal"));
    }

    #[test]
    fn file_load_keeps_source() {
        let e = SessionError::FileLoad {
            path:   PathBuf::from("broken.avi"),
            source: MediaError::NoVideoStream,
        };
        assert_eq!(e.to_string(), "could not load broken.avi: no video stream found");
        assert!(std::error::Error::source(&e).is_some());
    }
}
