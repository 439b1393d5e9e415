// crates/trimpress-core/src/settings.rs
//
// User-facing configuration. Persisted by the UI through eframe storage and
// restored on the next launch; every field has a serde default so older saved
// blobs keep loading after new fields are added.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the ffmpeg executable path.
pub const FFMPEG_ENV: &str = "TRIMPRESS_FFMPEG";

/// Codec parameters shared by trim and compress jobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    /// x264 speed preset.
    pub preset:      String,
    /// Constant rate factor for trims. Compress jobs are bitrate-driven.
    pub crf:         u8,
    pub threads:     u16,
    /// Explicit ffmpeg executable. `None` = env override, app dir, then PATH.
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".into(),
            audio_codec: "aac".into(),
            preset:      "fast".into(),
            crf:         23,
            threads:     4,
            ffmpeg_path: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Raw text of the bitrate field.
    pub bitrate:    String,
    /// Raw text of the resolution field.
    pub resolution: String,
    /// Directory of the last opened or saved file; seeds the file dialogs.
    pub last_dir:   Option<PathBuf>,
    pub encode:     EncodeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bitrate:    "500k".into(),
            resolution: "640x360".into(),
            last_dir:   None,
            encode:     EncodeSettings::default(),
        }
    }
}

impl Settings {
    pub fn remember_dir(&mut self, file: &std::path::Path) {
        if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.last_dir = Some(dir.to_path_buf());
        }
    }
}
