//! Durable session persistence.
//!
//! One serialized record under one well-known key. `load` distinguishes
//! three cases: no record (`Ok(None)`), a readable record (`Ok(Some(_))`),
//! and a record that exists but cannot be deserialized (`Err`). The manager
//! treats the last case as corruption to be cleaned up, not an error to
//! surface.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::session::Session;

/// Session file name in the store directory
const SESSION_FILE: &str = "session.json";

/// Where a serialized session record is kept between process lifetimes.
///
/// Synchronous by contract: `logout` and `restore_session` must not suspend.
pub trait SessionStore: Send + Sync {
    fn save(&self, session: &Session) -> Result<()>;
    fn load(&self) -> Result<Option<Session>>;
    fn clear(&self) -> Result<()>;
}

/// File-backed store: one JSON file in a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store under the platform data directory (`<data_dir>/<app_name>/`).
    pub fn in_data_dir(app_name: &str) -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(Self::new(data_dir.join(app_name)))
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileStore {
    fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        let session: Session =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(session))
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// In-process store holding the serialized record in a mutex-guarded slot.
///
/// Keeps the serialization round trip on the save/load path so tests exercise
/// the same representation the file store writes, and so corrupt records can
/// be injected.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored record with raw bytes, bypassing serialization.
    pub fn inject_raw(&self, raw: impl Into<String>) {
        *self.slot.lock().expect("session slot lock poisoned") = Some(raw.into());
    }

    pub fn has_record(&self) -> bool {
        self.slot.lock().expect("session slot lock poisoned").is_some()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, session: &Session) -> Result<()> {
        let contents = serde_json::to_string(session)?;
        *self.slot.lock().expect("session slot lock poisoned") = Some(contents);
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        let slot = self.slot.lock().expect("session slot lock poisoned");
        match slot.as_deref() {
            Some(contents) => {
                let session = serde_json::from_str(contents)
                    .context("Failed to parse session record")?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().expect("session slot lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::session::Principal;

    fn sample_session() -> Session {
        Session {
            principal: Principal::new("u-1", "testuser", None),
            access_token: "access-token".into(),
            refresh_token: "refresh-token".into(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_file_store_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap().expect("record should exist");

        assert_eq!(loaded.access_token, "access-token");
        assert_eq!(loaded.principal.username, "testuser");
    }

    #[test]
    fn test_file_store_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_corrupt_file_is_error_not_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").unwrap();

        assert!(store.load().is_err());
    }

    #[test]
    fn test_file_store_clear_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.save(&sample_session()).unwrap();

        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        // Clearing an already-empty store is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_distinguishes_absent_from_corrupt() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.inject_raw("definitely not json");
        assert!(store.load().is_err());

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
