use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreResult};
use crate::error::StoreError;

/// Extension for stored values
const FILE_EXTENSION: &str = "json";

/// Directory-backed store: each key is one file under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a storage key onto a file name.
    /// `@user_data` becomes `user_data.json`; anything outside `[A-Za-z0-9_-]`
    /// is replaced so keys can never escape the directory.
    fn file_name(key: &str) -> StoreResult<String> {
        let stem: String = key
            .trim_start_matches('@')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if stem.is_empty() {
            return Err(StoreError::Backend(format!("unusable storage key '{}'", key)));
        }
        Ok(format!("{}.{}", stem, FILE_EXTENSION))
    }

    fn item_path(&self, key: &str) -> StoreResult<PathBuf> {
        Ok(self.dir.join(Self::file_name(key)?))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.item_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.item_path(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write-then-rename so readers never see a half-written record
        let tmp = path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(?tmp, error = %cleanup, "Failed to remove temporary file");
            }
            return Err(e.into());
        }
        debug!(?path, bytes = value.len(), "Stored item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        let path = self.item_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(?path, "Removed item");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_sanitizes_keys() {
        assert_eq!(FileStore::file_name("@user_data").unwrap(), "user_data.json");
        assert_eq!(FileStore::file_name("prefs-v2").unwrap(), "prefs-v2.json");
        assert_eq!(FileStore::file_name("../etc/passwd").unwrap(), "___etc_passwd.json");
        assert!(FileStore::file_name("@").is_err());
        assert!(FileStore::file_name("").is_err());
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get_item("@user_data").await.unwrap(), None);

        // Parent directory is created on first write
        store.set_item("@user_data", r#"{"id":"u1","isAdmin":false}"#).await.unwrap();
        assert!(dir.path().join("nested").join("user_data.json").exists());
        assert_eq!(
            store.get_item("@user_data").await.unwrap().as_deref(),
            Some(r#"{"id":"u1","isAdmin":false}"#)
        );

        store.remove_item("@user_data").await.unwrap();
        assert_eq!(store.get_item("@user_data").await.unwrap(), None);
        store.remove_item("@user_data").await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set_item("@user_data", "first").await.unwrap();
        store.set_item("@user_data", "second").await.unwrap();

        assert_eq!(store.get_item("@user_data").await.unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join("user_data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // A non-empty directory where the record belongs makes the rename fail
        let blocked = dir.path().join("user_data.json");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("occupied"), "x").unwrap();

        assert!(store.set_item("@user_data", "value").await.is_err());
        assert!(!dir.path().join("user_data.json.tmp").exists());
        assert!(blocked.is_dir());
    }

    #[tokio::test]
    async fn test_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path()).set_item("@user_data", "kept").await.unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get_item("@user_data").await.unwrap().as_deref(), Some("kept"));
    }
}
