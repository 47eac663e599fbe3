//! Local persistence helpers for sessions and settings.
//!
//! Values are stored as JSON documents under short keys. Native builds keep
//! one `<key>.json` file per key in the platform data directory; web builds
//! use `localStorage`.

#[cfg(not(target_arch = "wasm32"))]
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::analytics::GameSession;

pub const SESSIONS_KEY: &str = "sessions";
pub const SETTINGS_KEY: &str = "settings";

#[cfg(target_arch = "wasm32")]
const WEB_KEY_PREFIX: &str = "brainplay.";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Store {
    #[cfg(not(target_arch = "wasm32"))]
    root: PathBuf,
}

impl Store {
    /// Store rooted at an explicit directory (tests, portable installs).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn at(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn local() -> Result<Self, StorageError> {
        let dirs = directories::ProjectDirs::from("org", "Brainplay", "Brainplay")
            .ok_or_else(|| StorageError::Unavailable("no home directory".into()))?;
        Ok(Self::at(dirs.data_dir()))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn local() -> Result<Self, StorageError> {
        local_storage()?;
        Ok(Self {})
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(&format!("{WEB_KEY_PREFIX}{key}"))
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn write_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(&format!("{WEB_KEY_PREFIX}{key}"), value)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.read_raw(key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(value)?;
        self.write_raw(key, &raw)
    }

    pub fn load_sessions(&self) -> Result<Vec<GameSession>, StorageError> {
        Ok(self.load(SESSIONS_KEY)?.unwrap_or_default())
    }

    pub fn append_session(&self, session: &GameSession) -> Result<(), StorageError> {
        let mut sessions = match self.load_sessions() {
            Ok(sessions) => sessions,
            Err(StorageError::Serde(err)) => {
                let backup = self.set_aside(SESSIONS_KEY)?;
                warn!(%backup, "session log unreadable ({err}); moved aside, starting a new one");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        sessions.push(session.clone());
        self.save(SESSIONS_KEY, &sessions)?;
        debug!(game = session.game.id(), total = sessions.len(), "session stored");
        Ok(())
    }

    pub fn clear_sessions(&self) -> Result<(), StorageError> {
        self.save(SESSIONS_KEY, &Vec::<GameSession>::new())
    }

    /// Copy the raw value of `key` to `<key>.corrupt-<unix seconds>` and
    /// return the backup key. The original is left for the caller to replace.
    fn set_aside(&self, key: &str) -> Result<String, StorageError> {
        let raw = self.read_raw(key)?.unwrap_or_default();
        let stamp = time::OffsetDateTime::now_utc().unix_timestamp();
        let backup = format!("{key}.corrupt-{stamp}");
        self.write_raw(&backup, &raw)?;
        Ok(backup)
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".into()))?
        .local_storage()
        .map_err(|err| StorageError::Unavailable(format!("{err:?}")))?
        .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
}

/// Sessions from the default local store.
pub fn load_sessions() -> Result<Vec<GameSession>, StorageError> {
    Store::local()?.load_sessions()
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_store;
    use super::*;
    use crate::core::analytics::GameKind;
    use serde_json::json;

    #[test]
    fn missing_keys_load_as_none() {
        let store = temp_store();
        assert!(store.load::<Vec<u32>>("nothing").unwrap().is_none());
        assert!(store.load_sessions().unwrap().is_empty());
    }

    #[test]
    fn sessions_append_in_order() {
        let store = temp_store();
        let first = GameSession::new(GameKind::Stroop, 120, &json!({ "accuracy": 90 })).unwrap();
        let second = GameSession::new(GameKind::SpeedMatch, -20, &json!({ "matches": 0 })).unwrap();

        store.append_session(&first).unwrap();
        store.append_session(&second).unwrap();

        let loaded = store.load_sessions().unwrap();
        assert_eq!(loaded, vec![first, second]);

        store.clear_sessions().unwrap();
        assert!(store.load_sessions().unwrap().is_empty());
    }

    #[test]
    fn corrupt_session_log_is_kept_aside_on_append() {
        let store = temp_store();
        store.write_raw(SESSIONS_KEY, "{ not json").unwrap();
        assert!(matches!(store.load_sessions(), Err(StorageError::Serde(_))));

        let session = GameSession::new(GameKind::DualNBack, 10, &json!({})).unwrap();
        store.append_session(&session).unwrap();
        assert_eq!(store.load_sessions().unwrap(), vec![session]);

        let backups: Vec<PathBuf> = fs::read_dir(&store.root)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("sessions.corrupt-"))
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "{ not json");
    }

    #[test]
    fn temp_store_cleans_up_after_itself() {
        let store = temp_store();
        store.write_raw("marker", "1").unwrap();
        let root = store.root.clone();
        assert!(root.exists());

        drop(store);
        assert!(!root.exists());
    }
}
