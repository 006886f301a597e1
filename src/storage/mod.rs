//! Local durable key-value storage.
//!
//! Stored values are JSON documents addressed by short keys. Reads tolerate
//! a missing or corrupt value by reporting it as absent; callers fall back to
//! their defaults.
//!
//! ```text
//! <data dir>/
//! ├── tasks.json     ← serialized task collection
//! ├── volume.json    ← alarm volume (0.0 - 1.0)
//! └── sound.json     ← selected alarm sound id
//! ```

mod error;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub use error::{Result, StorageError};

/// Key of the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

/// Key of the alarm volume preference.
pub const VOLUME_KEY: &str = "volume";

/// Key of the selected alarm sound preference.
pub const SOUND_KEY: &str = "sound";

/// Name of the directory created under the platform data directory.
pub const APP_DIR_NAME: &str = "pomodoro-tasks";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "POMODORO_TASKS_DIR";

/// A durable string-to-string store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::DirectoryCreation {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| StorageError::Write { path, source })?;
        debug!("Stored '{}' in {:?}", key, self.dir);
        Ok(())
    }
}

/// Resolves the data directory.
///
/// Priority: explicit override, then `$POMODORO_TASKS_DIR`, then the platform
/// data directory. Falls back to the current directory if none is known.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store, used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail with a write error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Returns the raw stored value for `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    /// Every update is a single insert, so a poisoned map is still consistent.
    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: PathBuf::from(key),
                source: io::Error::new(io::ErrorKind::Other, "writes disabled"),
            });
        }
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// JSON helpers
// ============================================================================

/// Loads and deserializes the value stored under `key`.
///
/// Returns `None` if the value is absent, unreadable or not valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored value for '{}'", key);
            return None;
        }
        Err(e) => {
            warn!("Failed to read '{}', using default: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Stored value for '{}' is corrupt, using default: {}", key, e);
            None
        }
    }
}

/// Serializes `value` and stores it under `key`.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod key_tests {
        use super::*;

        #[test]
        fn test_valid_keys() {
            assert!(validate_key(TASKS_KEY).is_ok());
            assert!(validate_key(VOLUME_KEY).is_ok());
            assert!(validate_key("sound_2").is_ok());
        }

        #[test]
        fn test_rejects_path_like_keys() {
            assert!(validate_key("").is_err());
            assert!(validate_key("../tasks").is_err());
            assert!(validate_key("a/b").is_err());
            assert!(validate_key("Tasks").is_err());
        }
    }

    mod file_store_tests {
        use super::*;

        #[test]
        fn test_missing_key_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::new(dir.path());
            assert!(store.get(TASKS_KEY).unwrap().is_none());
        }

        #[test]
        fn test_set_creates_directory() {
            let dir = tempfile::tempdir().unwrap();
            let nested = dir.path().join("nested").join("data");
            let store = JsonFileStore::new(&nested);

            store.set(VOLUME_KEY, "0.5").unwrap();

            assert!(nested.join("volume.json").exists());
            assert_eq!(store.get(VOLUME_KEY).unwrap().as_deref(), Some("0.5"));
        }

        #[test]
        fn test_set_overwrites() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::new(dir.path());

            store.set(SOUND_KEY, "\"chime\"").unwrap();
            store.set(SOUND_KEY, "\"bell_timer\"").unwrap();

            assert_eq!(
                store.get(SOUND_KEY).unwrap().as_deref(),
                Some("\"bell_timer\"")
            );
        }

        #[test]
        fn test_invalid_key_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::new(dir.path());
            assert!(matches!(
                store.set("../escape", "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }

        #[test]
        fn test_resolve_data_dir_override_wins() {
            let dir = PathBuf::from("/tmp/explicit");
            assert_eq!(resolve_data_dir(Some(&dir)), dir);
        }
    }

    mod json_helper_tests {
        use super::*;

        #[test]
        fn test_round_trip() {
            let store = MemoryStore::new();
            save_json(&store, VOLUME_KEY, &0.75_f32).unwrap();
            assert_eq!(load_json::<f32>(&store, VOLUME_KEY), Some(0.75));
        }

        #[test]
        fn test_absent_is_none() {
            let store = MemoryStore::new();
            assert_eq!(load_json::<f32>(&store, VOLUME_KEY), None);
        }

        #[test]
        fn test_corrupt_is_none() {
            let store = MemoryStore::new();
            store.set(VOLUME_KEY, "not json").unwrap();
            assert_eq!(load_json::<f32>(&store, VOLUME_KEY), None);
        }

        #[test]
        fn test_wrong_shape_is_none() {
            let store = MemoryStore::new();
            store.set(TASKS_KEY, "{\"tasks\": 1}").unwrap();
            assert_eq!(load_json::<Vec<String>>(&store, TASKS_KEY), None);
        }

        #[test]
        fn test_failed_write_is_reported() {
            let store = MemoryStore::new();
            store.set_fail_writes(true);
            assert!(save_json(&store, VOLUME_KEY, &0.5_f32).is_err());
            assert!(store.raw(VOLUME_KEY).is_none());
        }
    }

    mod memory_store_tests {
        use super::*;
        use std::sync::Arc;

        #[test]
        fn test_usable_after_panic_while_locked() {
            let store = Arc::new(MemoryStore::new());
            store.set(SOUND_KEY, "\"chime\"").unwrap();

            let poisoner = store.clone();
            let result = std::thread::spawn(move || {
                let _guard = poisoner.values.lock().unwrap();
                panic!("panic while holding the store lock");
            })
            .join();
            assert!(result.is_err());
            assert!(store.values.is_poisoned());

            assert_eq!(store.get(SOUND_KEY).unwrap().as_deref(), Some("\"chime\""));
            store.set(VOLUME_KEY, "0.3").unwrap();
            assert_eq!(store.raw(VOLUME_KEY).as_deref(), Some("0.3"));
        }
    }
}
