//! Radio station list
//!
//! Stations live in a JSON file edited by hand; the daemon only reads it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named internet radio stream source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
}

/// Load the station list from disk.
pub fn load_stations(path: &Path) -> Result<Vec<Station>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(format!("stations file {}", path.display()))
        } else {
            Error::Io(e)
        }
    })?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Parse(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_station_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(
            &path,
            r#"[{"name": "FIP", "url": "http://icecast.radiofrance.fr/fip-midfi.mp3"}]"#,
        )
        .unwrap();

        let stations = load_stations(&path).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "FIP");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = load_stations(&dir.path().join("stations.json"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(&path, "oops").unwrap();
        assert!(matches!(load_stations(&path), Err(Error::Parse(_))));
    }
}
