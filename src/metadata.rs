//! Track metadata derived from filenames
//!
//! No tag reading happens here: the decoder owns the audio file while it
//! plays, so metadata comes from the `Artist - Title.ext` filename convention
//! alone and is recomputed on demand.

use serde::Serialize;
use std::path::Path;

/// Artist/title pair for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
}

impl TrackMetadata {
    /// Placeholder shown when nothing is playing.
    pub fn none_playing() -> Self {
        Self {
            artist: String::new(),
            title: "No track playing".to_string(),
        }
    }
}

/// Derive metadata from a track reference.
///
/// Strips the extension, then splits the base name on a literal `" - "`:
/// two or more parts give (artist, title), a single part gives an empty
/// artist with the whole base name as title. Total: never fails.
pub fn parse(track: &str) -> TrackMetadata {
    let base = Path::new(track)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| track.to_string());

    let parts: Vec<&str> = base.split(" - ").collect();
    if parts.len() > 1 {
        TrackMetadata {
            artist: parts[0].trim().to_string(),
            title: parts[1].trim().to_string(),
        }
    } else {
        TrackMetadata {
            artist: String::new(),
            title: base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_and_title() {
        let meta = parse("Artist - Song Title.mp3");
        assert_eq!(meta.artist, "Artist");
        assert_eq!(meta.title, "Song Title");
    }

    #[test]
    fn bare_filename_is_title_only() {
        let meta = parse("Track1.mp3");
        assert_eq!(meta.artist, "");
        assert_eq!(meta.title, "Track1");
    }

    #[test]
    fn directory_prefix_is_ignored() {
        let meta = parse("rock/classics/Artist - Song.flac");
        assert_eq!(meta.artist, "Artist");
        assert_eq!(meta.title, "Song");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let meta = parse("Artist  -  Song.mp3");
        assert_eq!(meta.artist, "Artist");
        assert_eq!(meta.title, "Song");
    }

    #[test]
    fn extra_separators_keep_second_part() {
        let meta = parse("Artist - Song - Live.mp3");
        assert_eq!(meta.artist, "Artist");
        assert_eq!(meta.title, "Song");
    }

    #[test]
    fn no_extension() {
        let meta = parse("Track1");
        assert_eq!(meta.title, "Track1");
    }
}
