//! # Session Pointer
//!
//! Remembers which session was open so the next start can restore it.
//! Stored as `~/.grip/state.json`:
//!
//! ```json
//! { "current_session_id": "3f2a..." }
//! ```
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`). A missing or
//! unreadable file just means "no session".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
struct PointerFile {
    #[serde(default)]
    current_session_id: Option<String>,
}

/// Returns `~/.grip/state.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".grip").join("state.json"))
}

#[derive(Debug, Clone)]
pub struct PointerStore {
    path: PathBuf,
}

impl PointerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The session id saved by the previous run, if any.
    pub fn load(&self) -> Option<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<PointerFile>(&contents) {
            Ok(file) => file.current_session_id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Records `session_id` as current, or forgets it with `None`.
    pub fn save(&self, session_id: Option<&str>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = PointerFile {
            current_session_id: session_id.map(str::to_string),
        };
        atomic_write_json(&self.path, &file)?;
        debug!("Saved session pointer: {:?}", session_id);
        Ok(())
    }
}

fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> PointerStore {
        PointerStore::new(dir.path().join("grip").join("state.json"))
    }

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(Some("abc-123")).unwrap();
        assert_eq!(store.load().as_deref(), Some("abc-123"));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn clearing_forgets_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(Some("abc")).unwrap();
        store.save(None).unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = PointerStore::new(dir.path().join("state.json"));
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn empty_id_is_treated_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PointerStore::new(dir.path().join("state.json"));
        fs::write(store.path(), r#"{"current_session_id": ""}"#).unwrap();
        assert_eq!(store.load(), None);
    }
}
