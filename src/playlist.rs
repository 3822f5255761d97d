//! Named playlist persistence
//!
//! Playlists are JSON arrays of track references, one file per playlist under
//! the configured playlist directory. Names are restricted to a filesystem-
//! safe alphabet before they ever reach the filesystem.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed playlist store
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save (or overwrite) a named playlist.
    pub fn save(&self, name: &str, tracks: &[String]) -> Result<()> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(tracks)
            .map_err(|e| Error::Internal(e.to_string()))?;
        std::fs::write(&path, json)?;
        debug!(playlist = name, tracks = tracks.len(), "saved playlist");
        Ok(())
    }

    /// Load a named playlist.
    pub fn load(&self, name: &str) -> Result<Vec<String>> {
        let path = self.path_for(name)?;
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("playlist {name}"))
            } else {
                Error::Io(e)
            }
        })?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Parse(format!("playlist {name}: {e}")))
    }

    /// Names of all saved playlists.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // no directory yet means no playlists yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(Error::Io(e)),
        };
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(name) = file_name.strip_suffix(".json") {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !valid_name(name) {
            return Err(Error::BadRequest(format!("invalid playlist name: {name:?}")));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Playlist names stay within a filesystem-safe alphabet.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
}
