//! Idempotency flag storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

use super::config::StateConfig;
use super::error::StateError;

/// Name of the flag file inside the state directory.
pub const FLAG_FILE_NAME: &str = "videoconvert.json";

/// Stores whether the previous conversion completed cleanly.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Returns the stored flag, `false` when nothing was stored yet.
    async fn previous_ok(&self) -> Result<bool, StateError>;

    /// Stores the flag.
    async fn set_previous_ok(&self, ok: bool) -> Result<(), StateError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FlagFile {
    #[serde(rename = "isPreviousOk", default)]
    is_previous_ok: bool,
}

/// Flag store backed by a small JSON file.
///
/// Writes go to a temporary file that is renamed over the flag file, so a
/// crash mid-write leaves the previous value in place.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    /// Creates a store keeping its file in `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(FLAG_FILE_NAME),
        }
    }

    pub fn from_config(config: &StateConfig) -> Self {
        Self::new(&config.dir)
    }

    /// Path of the flag file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl FlagStore for FileFlagStore {
    async fn previous_ok(&self) -> Result<bool, StateError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StateError::io(&self.path, e)),
        };

        let file: FlagFile =
            serde_json::from_str(&contents).map_err(|e| StateError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(file.is_previous_ok)
    }

    async fn set_previous_ok(&self, ok: bool) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StateError::io(parent, e))?;
        }

        let contents = serde_json::to_string(&FlagFile { is_previous_ok: ok }).map_err(|e| {
            StateError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| StateError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StateError::io(&self.path, e))?;

        debug!("Stored isPreviousOk={} in {:?}", ok, self.path);
        Ok(())
    }
}

/// In-memory flag store.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    value: AtomicBool,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    /// Current value without going through the trait.
    pub fn get(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn previous_ok(&self) -> Result<bool, StateError> {
        Ok(self.get())
    }

    async fn set_previous_ok(&self, ok: bool) -> Result<(), StateError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StateError::io(
                "memory",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "writes disabled"),
            ));
        }
        self.value.store(ok, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_false() {
        let dir = TempDir::new().unwrap();
        let store = FileFlagStore::new(dir.path());
        assert!(!store.previous_ok().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_and_read_back() {
        let dir = TempDir::new().unwrap();
        let store = FileFlagStore::new(dir.path());

        tokio_test::assert_ok!(store.set_previous_ok(true).await);
        assert!(store.previous_ok().await.unwrap());

        let raw = std::fs::read_to_string(dir.path().join(FLAG_FILE_NAME)).unwrap();
        assert_eq!(raw, r#"{"isPreviousOk":true}"#);
        assert!(!store.temp_path().exists());

        store.set_previous_ok(false).await.unwrap();
        assert!(!store.previous_ok().await.unwrap());
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileFlagStore::new(dir.path().join("nested/state"));
        store.set_previous_ok(true).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(FLAG_FILE_NAME), "not json").unwrap();
        let store = FileFlagStore::new(dir.path());
        assert!(matches!(
            store.previous_ok().await,
            Err(StateError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_key_reads_false() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(FLAG_FILE_NAME), "{}").unwrap();
        let store = FileFlagStore::new(dir.path());
        assert!(!store.previous_ok().await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryFlagStore::new();
        assert!(!store.previous_ok().await.unwrap());
        store.set_previous_ok(true).await.unwrap();
        assert!(store.get());
        assert_eq!(store.write_count(), 1);

        let failing = MemoryFlagStore::failing();
        tokio_test::assert_err!(failing.set_previous_ok(true).await);
        assert!(!failing.get());
        assert_eq!(failing.write_count(), 0);
    }
}
