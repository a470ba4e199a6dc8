//! Curated Repository Store
//!
//! Persists the curated list as a pretty-printed JSON array on disk. Every
//! mutation is a read-modify-write of the whole file, serialised by an
//! in-process lock so concurrent admin requests cannot interleave.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::RepositoryEntry;

/// Errors that can occur while reading or writing the list
#[derive(Debug, Error)]
pub enum StoreError {
    /// An entry with the same `owner/name` is already stored
    #[error("Repository already added: {0}")]
    Duplicate(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt repository list: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// File-backed list of curated repositories
#[derive(Debug)]
pub struct RepoStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RepoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, in insertion order
    pub async fn list(&self) -> Result<Vec<RepositoryEntry>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Append an entry. Fails with `Duplicate` if its full name is taken,
    /// leaving the stored list unchanged.
    pub async fn add(&self, entry: RepositoryEntry) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;

        if entries.iter().any(|r| r.full_name == entry.full_name) {
            return Err(StoreError::Duplicate(entry.full_name));
        }

        info!("Adding repository {} ({})", entry.full_name, entry.id);
        entries.push(entry);
        self.write(&entries).await
    }

    /// Remove the entry with `id`. Returns whether anything was removed;
    /// an unknown id leaves the list as it was.
    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;

        let before = entries.len();
        entries.retain(|r| r.id != id);
        if entries.len() == before {
            debug!("Remove of unknown repository id {id} ignored");
            return Ok(false);
        }

        info!("Removed repository {id}");
        self.write(&entries).await?;
        Ok(true)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Create the file (and its directory) holding `[]` if missing
    async fn ensure_file(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?
        {
            return Ok(());
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        info!("Creating empty repository list at {}", self.path.display());
        self.write(&[]).await
    }

    async fn read(&self) -> Result<Vec<RepositoryEntry>, StoreError> {
        self.ensure_file().await?;
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write(&self, entries: &[RepositoryEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn entry(full_name: &str) -> RepositoryEntry {
        let (owner, name) = full_name.split_once('/').unwrap();
        RepositoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            owner: owner.into(),
            name: name.into(),
            full_name: full_name.into(),
            description: String::new(),
            language: "Rust".into(),
            stars: 0,
            forks: 0,
            url: format!("https://github.com/{full_name}"),
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_bootstraps_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("repos.json");
        let store = RepoStore::new(&path);

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_add_and_list_preserve_order() {
        let dir = TempDir::new().unwrap();
        let store = RepoStore::new(dir.path().join("repos.json"));

        store.add(entry("a/one")).await.unwrap();
        store.add(entry("b/two")).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.full_name)
            .collect();
        assert_eq!(names, vec!["a/one", "b/two"]);
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected_without_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repos.json");
        let store = RepoStore::new(&path);

        store.add(entry("octocat/Hello-World")).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = store.add(entry("octocat/Hello-World")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref n) if n == "octocat/Hello-World"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repos.json");
        let store = RepoStore::new(&path);

        let keep = entry("a/keep");
        let drop = entry("a/drop");
        let drop_id = drop.id.clone();
        store.add(keep.clone()).await.unwrap();
        store.add(drop).await.unwrap();

        let before_unknown = std::fs::read_to_string(&path).unwrap();
        assert!(!store.remove("no-such-id").await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before_unknown);

        assert!(store.remove(&drop_id).await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repos.json");
        std::fs::write(&path, "{ nope").unwrap();

        let store = RepoStore::new(&path);
        assert!(matches!(store.list().await, Err(StoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_entries() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(RepoStore::new(dir.path().join("repos.json")));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(entry(&format!("owner/repo-{i}"))).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 8);
    }
}
