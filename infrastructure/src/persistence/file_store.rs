//! JSON file session store

use super::validate_session_id;
use async_trait::async_trait;
use boardroom_application::{SessionStore, StoreError};
use boardroom_domain::SessionResult;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each result as `<dir>/<session_id>.json`.
///
/// The directory is created on first save.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, StoreError> {
        validate_session_id(session_id)?;
        Ok(self.dir.join(format!("{session_id}.json")))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, result: &SessionResult) -> Result<(), StoreError> {
        let path = self.path_for(&result.session_id)?;
        let json = serde_json::to_vec_pretty(result)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        // Write-then-rename so readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Saved session {} to {}", result.session_id, path.display());
        Ok(())
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<SessionResult>, StoreError> {
        let path = self.path_for(session_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sample_result;

    #[tokio::test]
    async fn test_save_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"));
        let result = sample_result("house-1");

        store.save(&result).await.unwrap();

        let loaded = store.fetch("house-1").await.unwrap().unwrap();
        assert_eq!(loaded, result);
        assert!(dir.path().join("sessions/house-1.json").exists());
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.fetch("nothing-here").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&sample_result("house-2")).await.unwrap();
        store.save(&sample_result("house-1")).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["house-1", "house-2"]);
    }

    #[tokio::test]
    async fn test_list_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        let err = store.fetch("../secrets").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
