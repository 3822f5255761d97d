//! Filesystem browser for the music root
//!
//! All paths arriving from clients are relative to the configured music root
//! and are validated lexically before touching the filesystem: absolute paths
//! and `..` components are rejected outright, so no request can name a
//! location outside the root.

use crate::{Error, Result};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Audio file extensions the browser recognizes.
const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "flac", "m4a"];

/// One directory entry as reported to clients
#[derive(Debug, Clone, Serialize)]
pub struct LibraryEntry {
    pub name: String,
    pub rel_path: String,
    pub is_directory: bool,
    pub is_audio: bool,
}

/// Resolve a client-supplied relative path against the music root.
///
/// Rejects absolute paths and any `..` component; does not require the
/// target to exist.
pub fn resolve_in_root(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return Err(Error::InvalidReference(rel.to_string()));
    }
    for component in rel_path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(Error::InvalidReference(rel.to_string())),
        }
    }
    Ok(root.join(rel_path))
}

/// Validate a track reference for enqueueing: inside the root and an existing
/// regular file.
pub fn validate_track(root: &Path, rel: &str) -> Result<PathBuf> {
    let path = resolve_in_root(root, rel)?;
    if !path.is_file() {
        return Err(Error::InvalidReference(rel.to_string()));
    }
    Ok(path)
}

/// Whether a file name looks like a playable audio file.
pub fn is_audio_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

/// List the entries of a directory under the music root.
///
/// Entries are sorted by name, directories first, so listings are stable
/// across platforms.
pub fn browse(root: &Path, rel_dir: &str) -> Result<Vec<LibraryEntry>> {
    let dir = resolve_in_root(root, rel_dir)?;
    let mut entries = Vec::new();

    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_directory = entry.file_type()?.is_dir();
        let rel_path = if rel_dir.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", rel_dir.trim_end_matches('/'), name)
        };
        entries.push(LibraryEntry {
            is_audio: !is_directory && is_audio_file(&name),
            name,
            rel_path,
            is_directory,
        });
    }

    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn music_root() -> TempDir {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("rock")).unwrap();
        std::fs::write(root.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(root.path().join("b.FLAC"), b"x").unwrap();
        std::fs::write(root.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(root.path().join("rock/c.m4a"), b"x").unwrap();
        root
    }

    #[test]
    fn traversal_is_rejected() {
        let root = music_root();
        assert!(resolve_in_root(root.path(), "../etc/passwd").is_err());
        assert!(resolve_in_root(root.path(), "rock/../../x").is_err());
        assert!(resolve_in_root(root.path(), "/etc/passwd").is_err());
        assert!(resolve_in_root(root.path(), "rock/c.m4a").is_ok());
    }

    #[test]
    fn validate_track_requires_existing_file() {
        let root = music_root();
        assert!(validate_track(root.path(), "a.mp3").is_ok());
        assert!(validate_track(root.path(), "missing.mp3").is_err());
        // a directory is not a track
        assert!(validate_track(root.path(), "rock").is_err());
    }

    #[test]
    fn audio_extension_matching() {
        assert!(is_audio_file("x.mp3"));
        assert!(is_audio_file("x.FLAC"));
        assert!(is_audio_file("x.m4a"));
        assert!(!is_audio_file("x.ogg"));
        assert!(!is_audio_file("mp3"));
    }

    #[test]
    fn browse_tags_entries() {
        let root = music_root();
        let entries = browse(root.path(), "").unwrap();
        // directories sort first
        assert_eq!(entries[0].name, "rock");
        assert!(entries[0].is_directory);
        assert!(!entries[0].is_audio);

        let a = entries.iter().find(|e| e.name == "a.mp3").unwrap();
        assert!(a.is_audio);
        let txt = entries.iter().find(|e| e.name == "notes.txt").unwrap();
        assert!(!txt.is_audio);

        let sub = browse(root.path(), "rock").unwrap();
        assert_eq!(sub.len(), 1);
        assert_eq!(sub[0].rel_path, "rock/c.m4a");
    }

    #[test]
    fn browse_outside_root_is_rejected() {
        let root = music_root();
        assert!(browse(root.path(), "..").is_err());
    }
}
