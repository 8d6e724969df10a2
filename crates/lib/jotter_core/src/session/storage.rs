//! Durable session storage.
//!
//! The session is persisted under three independent keys (`token`, `user`,
//! `role`) behind a small key-value port, so the session logic can run
//! against memory in tests and a JSON file on disk in the CLI.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

use crate::models::session::{Identity, Role};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the serialized identity.
pub const USER_KEY: &str = "user";
/// Storage key for the active role.
pub const ROLE_KEY: &str = "role";

/// Default session file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal string key-value port (get / set / remove).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Volatile store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// File store
// =============================================================================

/// JSON object on disk, rewritten on every change (mode 0o600 on unix).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/session.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE_NAME))
    }

    /// Store under the platform data directory (`<data>/jotter/session.json`).
    pub fn default_location() -> Self {
        Self::in_dir(&default_data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&data) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if map.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&self.path, perms) {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not restrict session file permissions; token may be readable by other users"
                );
            }
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Platform data directory for Jotter.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jotter")
}

// =============================================================================
// Session layout
// =============================================================================

/// The three persisted session fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSession {
    pub token: String,
    pub identity: Identity,
    pub role: Role,
}

/// Read the persisted session.
///
/// Returns `None` unless all three keys are present and the identity parses.
pub fn load_session(store: &dyn KeyValueStore) -> Result<Option<PersistedSession>, StorageError> {
    let token = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
    let user = store.get(USER_KEY)?;
    let role = store.get(ROLE_KEY)?.filter(|r| !r.is_empty());

    let (Some(token), Some(user), Some(role)) = (token, user, role) else {
        return Ok(None);
    };

    match serde_json::from_str::<Identity>(&user) {
        Ok(identity) => Ok(Some(PersistedSession {
            token,
            identity,
            role: Role::new(role),
        })),
        Err(e) => {
            warn!(error = %e, "stored identity is unreadable");
            Ok(None)
        }
    }
}

/// Write all three keys.
///
/// On failure the keys already written are put back to their previous
/// values, so a failed save leaves the earlier session in place.
pub fn save_session(store: &dyn KeyValueStore, session: &PersistedSession) -> Result<(), StorageError> {
    let user = serde_json::to_string(&session.identity)?;
    let entries = [
        (USER_KEY, user.as_str()),
        (TOKEN_KEY, session.token.as_str()),
        (ROLE_KEY, session.role.as_str()),
    ];

    let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let result = store.get(key).and_then(|previous| {
            store.set(key, value)?;
            written.push((key, previous));
            Ok(())
        });
        if let Err(e) = result {
            roll_back(store, &written);
            return Err(e);
        }
    }
    Ok(())
}

fn roll_back(store: &dyn KeyValueStore, written: &[(&str, Option<String>)]) {
    for (key, previous) in written.iter().rev() {
        let restored = match previous {
            Some(value) => store.set(key, value),
            None => store.remove(key),
        };
        if let Err(e) = restored {
            warn!(key = *key, error = %e, "failed to roll back session key");
        }
    }
}

/// Remove all three keys. Attempts every key even if one fails.
pub fn clear_session(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    let mut first_error = None;
    for key in [USER_KEY, TOKEN_KEY, ROLE_KEY] {
        if let Err(e) = store.remove(key) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
