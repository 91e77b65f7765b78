//! Local key-value persistence: a date-keyed string-to-JSON mapping with one
//! document per key, stored as one file per key inside a data directory.
//!
//! Failure policy: a key that is missing, unreadable or corrupt reads as
//! empty state, and write problems are logged and swallowed. Nothing past
//! this boundary ever sees a local I/O error, so losing one day's data never
//! blocks the rest of the app.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JsonKvStore {
    dir: PathBuf,
}

impl JsonKvStore {
    /// Open (creating if needed) a store rooted at `dir`. This is the only
    /// storage operation that reports failure: without the directory there
    /// is nothing to degrade to.
    pub async fn open(dir: impl AsRef<Path>) -> CoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CoreError::Storage(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys carry ':' separators; keep file names portable.
        let file = key.replace([':', '/'], "-");
        self.dir.join(format!("{file}.json"))
    }

    /// Read and parse the document under `key`. Missing and corrupt
    /// documents both read as `None`; corruption is logged once per read.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed reading local document; treating as empty");
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                metrics::counter!("nutrilog_storage_corrupt_total").increment(1);
                tracing::warn!(%key, error = %err, "corrupt local document; treating as empty");
                None
            }
        }
    }

    /// Serialize and write the document under `key`, overwriting.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let path = self.path_for(key);
        let raw = match serde_json::to_vec(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed serializing local document; skipping write");
                return;
            }
        };
        if let Err(err) = tokio::fs::write(&path, raw).await {
            tracing::warn!(%key, error = %err, "failed writing local document");
        }
    }

    /// Delete the document under `key`, if present.
    pub async fn remove(&self, key: &str) {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(%key, error = %err, "failed removing local document"),
        }
    }

    /// Read and parse every document whose key starts with `prefix`.
    /// Unparseable documents are skipped with a warning, like `get`.
    pub async fn load_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Vec<T> {
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "failed listing local store; treating as empty");
                return out;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(prefix) || !name.ends_with(".json") {
                continue;
            }
            let key = name.trim_end_matches(".json");
            if let Some(value) = self.get(key).await {
                out.push(value);
            }
        }
        out
    }
}
