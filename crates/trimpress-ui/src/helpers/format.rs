// crates/trimpress-ui/src/helpers/format.rs
//
// Display-name and output-path helpers for the panels and file dialogs.

use std::path::{Path, PathBuf};

/// File name for labels, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Suggested save-dialog name: `clip.mov` + `trimmed` → `clip_trimmed.mp4`.
pub fn default_output_name(source: &Path, suffix: &str) -> String {
    let stem = source.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".into());
    format!("{stem}_{suffix}.mp4")
}

/// Every export is an MP4. Adds the extension when the user typed none.
pub fn ensure_mp4(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("mp4")
    }
}

/// Truncate `s` to at most `max` chars with a trailing ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_replaces_extension() {
        assert_eq!(default_output_name(Path::new("/v/clip.mov"), "trimmed"), "clip_trimmed.mp4");
        assert_eq!(default_output_name(Path::new("holiday.mp4"), "compressed"), "holiday_compressed.mp4");
    }

    #[test]
    fn output_name_without_stem() {
        assert_eq!(default_output_name(Path::new("/"), "trimmed"), "output_trimmed.mp4");
    }

    #[test]
    fn ensure_mp4_only_fills_missing_extension() {
        assert_eq!(ensure_mp4(PathBuf::from("/tmp/out")), PathBuf::from("/tmp/out.mp4"));
        assert_eq!(ensure_mp4(PathBuf::from("/tmp/out.mkv")), PathBuf::from("/tmp/out.mkv"));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/a/b/clip.mp4")), "clip.mp4");
    }
}
