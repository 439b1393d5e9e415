// crates/trimpress-core/src/helpers/paths.rs
//
// Path identity checks for export targets.

use std::path::{Path, PathBuf};

/// Resolve `path` for comparison. An existing file is canonicalized; a file
/// that does not exist yet resolves through its parent directory.
pub fn resolve(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => dir
            .canonicalize()
            .map(|d| d.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// Whether two paths name the same file, after resolving `.`/`..` and links.
pub fn same_file(a: &Path, b: &Path) -> bool {
    let (a, b) = (resolve(a), resolve(b));
    if cfg!(windows) {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    } else {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_paths_match_without_touching_disk() {
        assert!(same_file(Path::new("/v/a.mp4"), Path::new("/v/a.mp4")));
        assert!(!same_file(Path::new("/v/a.mp4"), Path::new("/v/b.mp4")));
    }

    #[test]
    fn dot_dot_segments_resolve_to_the_same_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let src = tmp.path().join("clip.mp4");
        std::fs::write(&src, b"x").unwrap();

        let roundabout = tmp.path().join("sub").join("..").join("clip.mp4");
        assert!(same_file(&src, &roundabout));
    }

    #[test]
    fn new_file_resolves_through_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("out.mp4");
        let b = tmp.path().join(".").join("out.mp4");
        assert!(same_file(&a, &b));
        assert!(!same_file(&a, &tmp.path().join("other.mp4")));
    }
}
