//! Storage backends for the session record.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

use webchat_core::{Storage, StorageError};

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a base directory.
///
/// The directory is created lazily on first write so that a read-only or
/// missing home directory only costs persistence, not startup. Writes go to a
/// uniquely named sibling and are renamed over the entry, so a reader sees
/// either the previous value or the new one, never a partial file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!(
            ".{}.{}.tmp",
            sanitize_key(key),
            Uuid::new_v4().simple()
        ))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| write_error(key, e))?;

        let tmp = self.temp_path(key);
        let written = match tokio::fs::write(&tmp, value.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&tmp, self.entry_path(key)).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                debug!(path = %tmp.display(), error = %cleanup, "Temp file not removed");
            }
            return Err(write_error(key, e));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Storage that refuses every access, as when persistence is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStorage;

#[async_trait]
impl Storage for DisabledStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("persistent storage is disabled".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("persistent storage is disabled".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("persistent storage is disabled".to_string()))
    }
}

/// A full disk surfaces as a quota error; everything else stays an IO error.
fn write_error(key: &str, e: io::Error) -> StorageError {
    if e.kind() == io::ErrorKind::StorageFull {
        StorageError::QuotaExceeded {
            key: key.to_string(),
        }
    } else {
        StorageError::Io(e)
    }
}

/// Replaces anything but ASCII alphanumerics, `_` and `-` with `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_creates_directory_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.base_dir(), dir.path().join("nested"));

        assert_eq!(storage.get("webchat_session").await.unwrap(), None);
        storage.set("webchat_session", "{}").await.unwrap();

        assert!(dir.path().join("nested/webchat_session.json").exists());
        assert_eq!(
            storage.get("webchat_session").await.unwrap().as_deref(),
            Some("{}")
        );
    }

    #[tokio::test]
    async fn file_storage_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("webchat_session", "{\"v\":1}").await.unwrap();
        storage.set("webchat_session", "{\"v\":2}").await.unwrap();

        assert_eq!(
            storage.get("webchat_session").await.unwrap().as_deref(),
            Some("{\"v\":2}")
        );
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["webchat_session.json"]);
    }

    #[test]
    fn full_disk_maps_to_quota_exceeded() {
        let err = write_error("webchat_session", io::Error::from(io::ErrorKind::StorageFull));
        assert!(matches!(
            err,
            StorageError::QuotaExceeded { ref key } if key == "webchat_session"
        ));

        let err = write_error("webchat_session", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[tokio::test]
    async fn file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn disabled_storage_rejects_everything() {
        let storage = DisabledStorage;
        assert!(matches!(
            storage.get("k").await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.set("k", "v").await.is_err());
        assert!(storage.remove("k").await.is_err());
    }

    #[test]
    fn sanitize_replaces_path_characters() {
        assert_eq!(sanitize_key("../chat:session"), "___chat_session");
        assert_eq!(sanitize_key("webchat_session-1"), "webchat_session-1");
    }
}
