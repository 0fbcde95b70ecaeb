// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned, indexed object store persisted as a single JSON file.
//!
//! The store holds named collections of JSON objects keyed by a string key
//! path, each with optional string-valued secondary indexes. The whole image
//! is rewritten atomically (temp file + rename) on every committed write.
//!
//! Writes are staged: [`ObjectStore::write`] runs the closure against a copy
//! of the current state, persists the copy, and only then publishes it. A
//! closure error or a failed disk write leaves both the file and the
//! in-memory view untouched, so multi-record operations commit all or
//! nothing. Once persisting has started, the commit runs on its own task and
//! completes even if the caller's future is dropped.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, info};

use crescent_core::CrescentError;

/// Errors raised by the object store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no collection named `{0}`")]
    NoSuchCollection(String),

    #[error("collection `{collection}` has no index `{index}`")]
    NoSuchIndex { collection: String, index: String },

    #[error("record in `{collection}` lacks a string `{key_path}` key")]
    MissingKey { collection: String, key_path: String },

    #[error("records in `{0}` must be JSON objects")]
    NotAnObject(String),

    #[error("key `{key}` already exists in `{collection}`")]
    Constraint { collection: String, key: String },

    #[error("store is at version {stored}, newer than requested version {requested}")]
    VersionDowngrade { stored: u32, requested: u32 },

    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("record encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("background persistence task failed: {0}")]
    Background(String),
}

impl From<StoreError> for CrescentError {
    fn from(e: StoreError) -> Self {
        CrescentError::storage(e)
    }
}

/// One additive schema change, applied when opening a store whose stored
/// version is below `version`.
///
/// `apply` must be idempotent: create collections and indexes only when
/// absent and never rewrite existing records.
pub struct UpgradeStep {
    pub version: u32,
    pub description: &'static str,
    pub apply: fn(&mut StoreState) -> Result<(), StoreError>,
}

// --- On-disk image ---

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    seq: u64,
    value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionImage {
    key_path: String,
    #[serde(default)]
    indexes: BTreeMap<String, String>,
    #[serde(default)]
    next_seq: u64,
    #[serde(default)]
    records: BTreeMap<String, StoredRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreImage {
    version: u32,
    #[serde(default)]
    collections: BTreeMap<String, CollectionImage>,
}

// --- In-memory state ---

/// Ordered index entries: `(index key, insertion seq) -> primary key`.
type IndexEntries = BTreeMap<(String, u64), String>;

fn index_key(value: &Value, key_path: &str) -> Option<String> {
    value.get(key_path).and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone)]
struct Collection {
    key_path: String,
    index_paths: BTreeMap<String, String>,
    next_seq: u64,
    records: BTreeMap<String, StoredRecord>,
    indexes: BTreeMap<String, IndexEntries>,
}

impl Collection {
    fn new(key_path: &str) -> Self {
        Self {
            key_path: key_path.to_string(),
            index_paths: BTreeMap::new(),
            next_seq: 0,
            records: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    fn from_image(image: CollectionImage) -> Self {
        let mut collection = Self {
            key_path: image.key_path,
            index_paths: image.indexes,
            next_seq: image.next_seq,
            records: image.records,
            indexes: BTreeMap::new(),
        };
        // A hand-edited image may carry seqs past next_seq.
        let max_seq = collection.records.values().map(|r| r.seq).max().unwrap_or(0);
        collection.next_seq = collection.next_seq.max(max_seq);
        let paths: Vec<(String, String)> = collection
            .index_paths
            .iter()
            .map(|(n, p)| (n.clone(), p.clone()))
            .collect();
        for (name, path) in paths {
            collection.build_index(&name, &path);
        }
        collection
    }

    fn to_image(&self) -> CollectionImage {
        CollectionImage {
            key_path: self.key_path.clone(),
            indexes: self.index_paths.clone(),
            next_seq: self.next_seq,
            records: self.records.clone(),
        }
    }

    /// Index every existing record under `name`. Records lacking the key
    /// path are left out of the index.
    fn build_index(&mut self, name: &str, key_path: &str) {
        let entries: IndexEntries = self
            .records
            .iter()
            .filter_map(|(pk, rec)| {
                index_key(&rec.value, key_path).map(|k| ((k, rec.seq), pk.clone()))
            })
            .collect();
        self.indexes.insert(name.to_string(), entries);
    }

    fn index_record(&mut self, pk: &str, record: &StoredRecord) {
        for (name, path) in &self.index_paths {
            if let Some(key) = index_key(&record.value, path) {
                self.indexes
                    .entry(name.clone())
                    .or_default()
                    .insert((key, record.seq), pk.to_string());
            }
        }
    }

    fn unindex_record(&mut self, record: &StoredRecord) {
        for (name, path) in &self.index_paths {
            let key = index_key(&record.value, path);
            if let (Some(key), Some(entries)) = (key, self.indexes.get_mut(name)) {
                entries.remove(&(key, record.seq));
            }
        }
    }

    fn remove(&mut self, pk: &str) -> bool {
        match self.records.remove(pk) {
            Some(record) => {
                self.unindex_record(&record);
                true
            }
            None => false,
        }
    }
}

/// The full contents of an open store.
///
/// Only reachable through [`ObjectStore::read`] / [`ObjectStore::write`] and
/// upgrade steps.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    version: u32,
    collections: BTreeMap<String, Collection>,
}

impl StoreState {
    fn from_image(image: StoreImage) -> Self {
        Self {
            version: image.version,
            collections: image
                .collections
                .into_iter()
                .map(|(name, c)| (name, Collection::from_image(c)))
                .collect(),
        }
    }

    fn to_image(&self) -> StoreImage {
        StoreImage {
            version: self.version,
            collections: self
                .collections
                .iter()
                .map(|(name, c)| (name.clone(), c.to_image()))
                .collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn has_index(&self, collection: &str, index: &str) -> bool {
        self.collections
            .get(collection)
            .is_some_and(|c| c.index_paths.contains_key(index))
    }

    /// Creates an empty collection. Returns `false` if it already existed.
    pub fn create_collection(&mut self, name: &str, key_path: &str) -> bool {
        if self.collections.contains_key(name) {
            return false;
        }
        self.collections.insert(name.to_string(), Collection::new(key_path));
        true
    }

    /// Creates an index over `key_path`, indexing existing records.
    /// Returns `false` if the index already existed.
    pub fn create_index(
        &mut self,
        collection: &str,
        name: &str,
        key_path: &str,
    ) -> Result<bool, StoreError> {
        let coll = self.collection_mut(collection)?;
        if coll.index_paths.contains_key(name) {
            return Ok(false);
        }
        coll.index_paths.insert(name.to_string(), key_path.to_string());
        coll.build_index(name, key_path);
        Ok(true)
    }

    fn collection(&self, name: &str) -> Result<&Collection, StoreError> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::NoSuchCollection(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, StoreError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::NoSuchCollection(name.to_string()))
    }

    fn index(&self, collection: &str, index: &str) -> Result<&IndexEntries, StoreError> {
        self.collection(collection)?
            .indexes
            .get(index)
            .ok_or_else(|| StoreError::NoSuchIndex {
                collection: collection.to_string(),
                index: index.to_string(),
            })
    }

    pub fn get(&self, collection: &str, key: &str) -> Result<Option<&Value>, StoreError> {
        Ok(self.collection(collection)?.records.get(key).map(|r| &r.value))
    }

    pub fn count(&self, collection: &str) -> Result<usize, StoreError> {
        Ok(self.collection(collection)?.records.len())
    }

    /// Records reachable through `index`, ascending by index key and then by
    /// insertion order. `query` restricts the scan to one exact key.
    pub fn get_all_from_index(
        &self,
        collection: &str,
        index: &str,
        query: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let coll = self.collection(collection)?;
        let entries = self.index(collection, index)?;
        let pks: Vec<&String> = match query {
            Some(key) => entries
                .range((key.to_string(), 0)..=(key.to_string(), u64::MAX))
                .map(|(_, pk)| pk)
                .collect(),
            None => entries.values().collect(),
        };
        Ok(pks
            .into_iter()
            .filter_map(|pk| coll.records.get(pk).map(|r| r.value.clone()))
            .collect())
    }

    /// Inserts or replaces a record. Replacing keeps the original insertion
    /// position.
    pub fn put(&mut self, collection: &str, value: Value) -> Result<String, StoreError> {
        self.insert(collection, value, false)
    }

    /// Inserts a record, failing if the key already exists.
    pub fn add(&mut self, collection: &str, value: Value) -> Result<String, StoreError> {
        self.insert(collection, value, true)
    }

    fn insert(
        &mut self,
        collection: &str,
        value: Value,
        must_be_new: bool,
    ) -> Result<String, StoreError> {
        let coll = self.collection_mut(collection)?;
        if !value.is_object() {
            return Err(StoreError::NotAnObject(collection.to_string()));
        }
        let pk = index_key(&value, &coll.key_path).ok_or_else(|| StoreError::MissingKey {
            collection: collection.to_string(),
            key_path: coll.key_path.clone(),
        })?;

        let seq = match coll.records.get(&pk) {
            Some(_) if must_be_new => {
                return Err(StoreError::Constraint {
                    collection: collection.to_string(),
                    key: pk,
                });
            }
            Some(existing) => existing.seq,
            None => {
                coll.next_seq += 1;
                coll.next_seq
            }
        };

        coll.remove(&pk);
        let record = StoredRecord { seq, value };
        coll.index_record(&pk, &record);
        coll.records.insert(pk.clone(), record);
        Ok(pk)
    }

    /// Removes one record. Returns whether it existed.
    pub fn delete(&mut self, collection: &str, key: &str) -> Result<bool, StoreError> {
        Ok(self.collection_mut(collection)?.remove(key))
    }

    /// Removes every record whose `index` key equals `key`.
    pub fn delete_by_index(
        &mut self,
        collection: &str,
        index: &str,
        key: &str,
    ) -> Result<u64, StoreError> {
        let pks: Vec<String> = self
            .index(collection, index)?
            .range((key.to_string(), 0)..=(key.to_string(), u64::MAX))
            .map(|(_, pk)| pk.clone())
            .collect();
        let coll = self.collection_mut(collection)?;
        let mut removed = 0;
        for pk in pks {
            if coll.remove(&pk) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes every record, keeping the collection and its indexes.
    pub fn clear(&mut self, collection: &str) -> Result<u64, StoreError> {
        let coll = self.collection_mut(collection)?;
        let removed = coll.records.len() as u64;
        coll.records.clear();
        for entries in coll.indexes.values_mut() {
            entries.clear();
        }
        Ok(removed)
    }
}

/// Handle to an open object store.
pub struct ObjectStore {
    path: Option<PathBuf>,
    state: Arc<RwLock<StoreState>>,
}

impl ObjectStore {
    /// Opens (or creates) the store file at `path` and upgrades it to
    /// `version` by applying the pending `steps`.
    pub async fn open(
        path: impl Into<PathBuf>,
        version: u32,
        steps: &[UpgradeStep],
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let image = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreImage::default(),
            Err(e) => return Err(e.into()),
        };
        Self::from_image(Some(path), image, version, steps).await
    }

    /// Opens an empty store that lives only in memory.
    pub async fn open_in_memory(version: u32, steps: &[UpgradeStep]) -> Result<Self, StoreError> {
        Self::from_image(None, StoreImage::default(), version, steps).await
    }

    async fn from_image(
        path: Option<PathBuf>,
        image: StoreImage,
        version: u32,
        steps: &[UpgradeStep],
    ) -> Result<Self, StoreError> {
        let mut state = StoreState::from_image(image);
        let stored = state.version;
        if stored > version {
            return Err(StoreError::VersionDowngrade {
                stored,
                requested: version,
            });
        }

        if stored < version {
            let mut pending: Vec<&UpgradeStep> = steps
                .iter()
                .filter(|s| s.version > stored && s.version <= version)
                .collect();
            pending.sort_by_key(|s| s.version);
            for step in pending {
                (step.apply)(&mut state)?;
                debug!(
                    version = step.version,
                    step = step.description,
                    "applied store upgrade step"
                );
            }
            state.version = version;
            if let Some(path) = &path {
                persist(path, &state).await?;
            }
            info!(from = stored, to = version, "object store upgraded");
        }

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn version(&self) -> u32 {
        self.state.read().await.version
    }

    /// Runs a read-only closure against a consistent snapshot.
    pub async fn read<T, E>(&self, f: impl FnOnce(&StoreState) -> Result<T, E>) -> Result<T, E> {
        let state = self.state.read().await;
        f(&state)
    }

    /// Runs `f` against a staged copy and commits it only if `f` succeeds
    /// and the image reaches disk.
    pub async fn write<T, E>(&self, f: impl FnOnce(&mut StoreState) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut state = Arc::clone(&self.state).write_owned().await;
        let mut staged = state.clone();
        let out = f(&mut staged)?;
        match &self.path {
            Some(path) => {
                // The task owns the write guard, so nothing observes the store
                // between the rename and the publish.
                tokio::spawn(commit(path.clone(), state, staged))
                    .await
                    .map_err(|e| StoreError::Background(e.to_string()))??;
            }
            None => *state = staged,
        }
        Ok(out)
    }

    /// Rewrites the current image to disk.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let state = self.state.read().await;
        match &self.path {
            Some(path) => persist(path, &state).await,
            None => Ok(()),
        }
    }
}

/// Persists `staged` and, only if that succeeded, publishes it.
async fn commit(
    path: PathBuf,
    mut state: OwnedRwLockWriteGuard<StoreState>,
    staged: StoreState,
) -> Result<(), StoreError> {
    persist(&path, &staged).await?;
    *state = staged;
    Ok(())
}

/// Atomically replaces the file at `path` with the serialized state.
async fn persist(path: &Path, state: &StoreState) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(&state.to_image())?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| StoreError::Background(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn v1(state: &mut StoreState) -> Result<(), StoreError> {
        state.create_collection("items", "id");
        state.create_index("items", "by-group", "group")?;
        Ok(())
    }

    fn v2(state: &mut StoreState) -> Result<(), StoreError> {
        state.create_index("items", "by-name", "name")?;
        Ok(())
    }

    const STEPS: &[UpgradeStep] = &[
        UpgradeStep {
            version: 1,
            description: "items + by-group",
            apply: v1,
        },
        UpgradeStep {
            version: 2,
            description: "items by-name",
            apply: v2,
        },
    ];

    fn ids(values: &[Value]) -> Vec<&str> {
        values.iter().map(|v| v["id"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        store
            .write(|s| s.put("items", json!({"id": "a", "group": "g", "name": "alpha"})))
            .await
            .unwrap();

        let got = store
            .read(|s| s.get("items", "a").map(|v| v.cloned()))
            .await
            .unwrap();
        assert_eq!(got.unwrap()["name"], "alpha");

        let existed = store.write(|s| s.delete("items", "a")).await.unwrap();
        assert!(existed);
        let again = store.write(|s| s.delete("items", "a")).await.unwrap();
        assert!(!again);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_key() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        store.write(|s| s.add("items", json!({"id": "a"}))).await.unwrap();
        let err = store
            .write(|s| s.add("items", json!({"id": "a"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint { .. }));
    }

    #[tokio::test]
    async fn records_must_be_keyed_objects() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        let err = store.write(|s| s.put("items", json!([1, 2]))).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject(_)));
        let err = store.write(|s| s.put("items", json!({"name": "x"}))).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingKey { .. }));
        let err = store.write(|s| s.put("nope", json!({"id": "x"}))).await.unwrap_err();
        assert!(matches!(err, StoreError::NoSuchCollection(_)));
    }

    #[tokio::test]
    async fn index_scan_orders_by_key_then_insertion() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        store
            .write(|s| {
                s.put("items", json!({"id": "z", "group": "b"}))?;
                s.put("items", json!({"id": "y", "group": "a"}))?;
                s.put("items", json!({"id": "x", "group": "b"}))?;
                s.put("items", json!({"id": "w"}))?;
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        let all = store
            .read(|s| s.get_all_from_index("items", "by-group", None))
            .await
            .unwrap();
        // "w" has no group and is not indexed.
        assert_eq!(ids(&all), vec!["y", "z", "x"]);

        let group_b = store
            .read(|s| s.get_all_from_index("items", "by-group", Some("b")))
            .await
            .unwrap();
        assert_eq!(ids(&group_b), vec!["z", "x"]);
    }

    #[tokio::test]
    async fn put_replacing_record_reindexes_it() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        store
            .write(|s| {
                s.put("items", json!({"id": "a", "group": "old"}))?;
                s.put("items", json!({"id": "a", "group": "new"}))
            })
            .await
            .unwrap();
        let old = store
            .read(|s| s.get_all_from_index("items", "by-group", Some("old")))
            .await
            .unwrap();
        assert!(old.is_empty());
        let new = store
            .read(|s| s.get_all_from_index("items", "by-group", Some("new")))
            .await
            .unwrap();
        assert_eq!(ids(&new), vec!["a"]);
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        store.write(|s| s.put("items", json!({"id": "keep", "group": "g"}))).await.unwrap();

        let result = store
            .write(|s| {
                s.delete("items", "keep")?;
                s.put("missing-collection", json!({"id": "x"}))
            })
            .await;
        assert!(result.is_err());

        let count = store.read(|s| s.count("items")).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn delete_by_index_and_clear() {
        let store = ObjectStore::open_in_memory(2, STEPS).await.unwrap();
        store
            .write(|s| {
                s.put("items", json!({"id": "1", "group": "g"}))?;
                s.put("items", json!({"id": "2", "group": "g"}))?;
                s.put("items", json!({"id": "3", "group": "h"}))?;
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        let removed = store.write(|s| s.delete_by_index("items", "by-group", "g")).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.read(|s| s.count("items")).await.unwrap(), 1);

        let cleared = store.write(|s| s.clear("items")).await.unwrap();
        assert_eq!(cleared, 1);
        let scan = store
            .read(|s| s.get_all_from_index("items", "by-group", None))
            .await
            .unwrap();
        assert!(scan.is_empty());
    }

    #[tokio::test]
    async fn committed_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = ObjectStore::open(&path, 2, STEPS).await.unwrap();
            store.write(|s| s.put("items", json!({"id": "a", "group": "g"}))).await.unwrap();
        }
        let store = ObjectStore::open(&path, 2, STEPS).await.unwrap();
        assert_eq!(store.version().await, 2);
        let scan = store
            .read(|s| s.get_all_from_index("items", "by-group", Some("g")))
            .await
            .unwrap();
        assert_eq!(ids(&scan), vec!["a"]);
    }

    #[tokio::test]
    async fn upgrade_indexes_existing_records_without_loss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = ObjectStore::open(&path, 1, STEPS).await.unwrap();
            store
                .write(|s| s.put("items", json!({"id": "a", "group": "g", "name": "alpha"})))
                .await
                .unwrap();
            let has = store
                .read(|s| Ok::<_, StoreError>(s.has_index("items", "by-name")))
                .await
                .unwrap();
            assert!(!has);
        }

        let store = ObjectStore::open(&path, 2, STEPS).await.unwrap();
        assert_eq!(store.version().await, 2);
        let by_name = store
            .read(|s| s.get_all_from_index("items", "by-name", Some("alpha")))
            .await
            .unwrap();
        assert_eq!(ids(&by_name), vec!["a"]);
    }

    #[tokio::test]
    async fn upgrade_steps_are_idempotent() {
        let mut state = StoreState::default();
        v1(&mut state).unwrap();
        v1(&mut state).unwrap();
        v2(&mut state).unwrap();
        v2(&mut state).unwrap();
        assert!(state.has_index("items", "by-group"));
        assert!(state.has_index("items", "by-name"));
    }

    #[tokio::test]
    async fn opening_at_older_version_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        ObjectStore::open(&path, 2, STEPS).await.unwrap();
        let err = ObjectStore::open(&path, 1, STEPS).await.err().unwrap();
        assert!(matches!(err, StoreError::VersionDowngrade { stored: 2, requested: 1 }));
    }

    #[tokio::test]
    async fn dropped_write_commits_to_memory_and_disk_together() {
        use std::future::Future;
        use std::task::Poll;

        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = ObjectStore::open(&path, 2, STEPS).await.unwrap();

        let mut write = Box::pin(store.write(|s| s.put("items", json!({"id": "a", "group": "g"}))));
        std::future::poll_fn(|cx| {
            let _ = Future::poll(write.as_mut(), cx);
            Poll::Ready(())
        })
        .await;
        drop(write);

        // Waits for the detached commit to release the lock.
        let live = store.read(|s| s.count("items")).await.unwrap();
        let reopened = ObjectStore::open(&path, 2, STEPS).await.unwrap();
        let on_disk = reopened.read(|s| s.count("items")).await.unwrap();
        assert_eq!((live, on_disk), (1, 1));
    }

    #[tokio::test]
    async fn failed_persist_publishes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("store.json");
        let store = ObjectStore::open(&path, 2, STEPS).await.unwrap();

        // A plain file where the store directory should be makes the rename fail.
        std::fs::remove_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub"), b"").unwrap();

        let err = store
            .write(|s| s.put("items", json!({"id": "a"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.read(|s| s.count("items")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{not json").unwrap();
        let err = ObjectStore::open(&path, 2, STEPS).await.err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
