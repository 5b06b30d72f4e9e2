use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::write_atomic;

/// Stable fingerprint of a document's normalized text (lowercase SHA-256 hex).
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// One fingerprint-to-document mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub doc_id: String,
}

/// Persistent content-addressed index of previously parsed documents.
///
/// Entries are only ever added; an existing fingerprint keeps its first
/// document id. Writes re-read the index file under the lock so entries
/// added by another process since `open` are preserved.
#[derive(Debug)]
pub struct ContentCache {
    path: PathBuf,
    index: Mutex<BTreeMap<String, String>>,
}

impl ContentCache {
    /// Open the index at `path`. A missing file starts empty; an unreadable
    /// or corrupt one is treated as empty and overwritten on the next store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let index = read_index(&path);
        debug!(path = %path.display(), entries = index.len(), "content cache opened");
        Self {
            path,
            index: Mutex::new(index),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn lookup(&self, fingerprint: &str) -> Option<String> {
        self.index.lock().await.get(fingerprint).cloned()
    }

    /// Record `fingerprint -> doc_id` and return the id now associated with
    /// the fingerprint (the earlier one if it was already present).
    pub async fn store(&self, fingerprint: &str, doc_id: &str) -> Result<String, StoreError> {
        let mut index = self.index.lock().await;
        let mut merged = read_index(&self.path);
        for (key, value) in index.iter() {
            merged.entry(key.clone()).or_insert_with(|| value.clone());
        }
        let effective = merged
            .entry(fingerprint.to_string())
            .or_insert_with(|| doc_id.to_string())
            .clone();
        persist(&self.path, &merged)?;
        *index = merged;
        Ok(effective)
    }

    /// Drop every entry. Stored trees and verdicts are left in place.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let mut index = self.index.lock().await;
        let removed = index.len();
        index.clear();
        persist(&self.path, &index)?;
        Ok(removed)
    }

    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.lock().await.is_empty()
    }

    pub async fn entries(&self) -> Vec<CacheEntry> {
        self.index
            .lock()
            .await
            .iter()
            .map(|(fingerprint, doc_id)| CacheEntry {
                fingerprint: fingerprint.clone(),
                doc_id: doc_id.clone(),
            })
            .collect()
    }
}

fn read_index(path: &Path) -> BTreeMap<String, String> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "content cache unreadable; starting empty");
            return BTreeMap::new();
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(index) => index,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "content cache index corrupt; starting empty");
            BTreeMap::new()
        }
    }
}

fn persist(path: &Path, index: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(index).map_err(|source| StoreError::Corrupt {
        kind: "cache index",
        doc_id: String::new(),
        source,
    })?;
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(fingerprint("1 Scope"), fingerprint("1 Scope "));
    }

    #[tokio::test]
    async fn store_then_lookup_survives_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("cache_index.json");
        let cache = ContentCache::open(&path);
        assert!(cache.is_empty().await);
        let fp = fingerprint("doc");
        assert_eq!(cache.store(&fp, "doc-1").await.unwrap(), "doc-1");
        assert_eq!(cache.lookup(&fp).await.as_deref(), Some("doc-1"));

        let reopened = ContentCache::open(&path);
        assert_eq!(reopened.lookup(&fp).await.as_deref(), Some("doc-1"));
        assert_eq!(reopened.len().await, 1);
    }

    #[tokio::test]
    async fn existing_mapping_is_never_replaced() {
        let temp = tempfile::tempdir().unwrap();
        let cache = ContentCache::open(temp.path().join("index.json"));
        cache.store("fp", "first").await.unwrap();
        assert_eq!(cache.store("fp", "second").await.unwrap(), "first");
        assert_eq!(cache.lookup("fp").await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn corrupt_index_starts_empty_and_is_rewritten() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("index.json");
        fs::write(&path, "[not an object").unwrap();
        let cache = ContentCache::open(&path);
        assert_eq!(cache.len().await, 0);
        cache.store("fp", "doc").await.unwrap();
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("fp").map(String::as_str), Some("doc"));
    }

    #[tokio::test]
    async fn writes_from_other_handles_are_merged() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("index.json");
        let first = ContentCache::open(&path);
        let second = ContentCache::open(&path);
        first.store("a", "doc-a").await.unwrap();
        second.store("b", "doc-b").await.unwrap();

        let reopened = ContentCache::open(&path);
        let entries = reopened.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].fingerprint, "a");
        assert_eq!(entries[1].doc_id, "doc-b");
    }

    #[tokio::test]
    async fn concurrent_stores_keep_every_entry() {
        let temp = tempfile::tempdir().unwrap();
        let cache = Arc::new(ContentCache::open(temp.path().join("index.json")));
        let tasks: Vec<_> = (0..16)
            .map(|idx| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    cache
                        .store(&format!("fp-{idx}"), &format!("doc-{idx}"))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(cache.len().await, 16);
        assert_eq!(ContentCache::open(cache.path()).len().await, 16);
    }

    #[tokio::test]
    async fn clear_empties_index_on_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("index.json");
        let cache = ContentCache::open(&path);
        cache.store("a", "doc-a").await.unwrap();
        cache.store("b", "doc-b").await.unwrap();
        assert_eq!(cache.clear().await.unwrap(), 2);
        assert!(cache.lookup("a").await.is_none());
        assert!(ContentCache::open(&path).is_empty().await);
    }
}
