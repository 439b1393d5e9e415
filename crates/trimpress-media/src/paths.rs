// crates/trimpress-media/src/paths.rs
// Where TrimPress looks for the ffmpeg executable used by trim/compress jobs.

use std::path::{Path, PathBuf};

use tracing::debug;
use trimpress_core::error::MediaError;
use trimpress_core::settings::FFMPEG_ENV;

#[cfg(target_os = "windows")]
const FFMPEG_EXE: &str = "ffmpeg.exe";
#[cfg(not(target_os = "windows"))]
const FFMPEG_EXE: &str = "ffmpeg";

/// `%APPDATA%\TrimPress\ffmpeg` on Windows, `~/.local/share/TrimPress/ffmpeg` elsewhere.
pub fn app_ffmpeg_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    #[cfg(not(target_os = "windows"))]
    let base = std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share"))
        .unwrap_or_else(|_| std::env::temp_dir());
    base.join("TrimPress").join("ffmpeg")
}

/// Resolve the ffmpeg executable.
///
/// Order: the explicit setting, `TRIMPRESS_FFMPEG`, the app data dir, then
/// `PATH`. Candidates that do not exist on disk are skipped.
pub fn locate_ffmpeg(explicit: Option<&Path>) -> Result<PathBuf, MediaError> {
    let candidates = [
        explicit.map(Path::to_path_buf),
        std::env::var_os(FFMPEG_ENV).map(PathBuf::from),
        Some(app_ffmpeg_dir().join(FFMPEG_EXE)),
    ];
    if let Some(found) = first_existing(candidates.into_iter().flatten()) {
        debug!(target: "media", "ffmpeg at {}", found.display());
        return Ok(found);
    }
    which::which(FFMPEG_EXE).map_err(|_| MediaError::FfmpegNotFound)
}

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_dir_is_namespaced() {
        let dir = app_ffmpeg_dir();
        assert!(dir.ends_with(Path::new("TrimPress").join("ffmpeg")));
    }

    #[test]
    fn skips_missing_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("ffmpeg-custom");
        std::fs::write(&real, b"").unwrap();

        let found = first_existing([tmp.path().join("missing"), real.clone()]);
        assert_eq!(found, Some(real));
    }

    #[test]
    fn directories_are_not_executables() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(first_existing([tmp.path().to_path_buf()]), None);
    }

    #[test]
    fn explicit_path_wins() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(locate_ffmpeg(Some(tmp.path())).unwrap(), tmp.path());
    }
}
