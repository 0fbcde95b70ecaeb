// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter conformance for the SQLite backend.

use crescent_config::model::StorageConfig;
use crescent_core::StorageAdapter;
use crescent_storage::SqliteStorage;
use crescent_test_utils::run_storage_suite;

async fn storage_in(dir: &tempfile::TempDir, wal_mode: bool) -> SqliteStorage {
    let path = dir.path().join("crescent.db");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: path.to_string_lossy().into_owned(),
        wal_mode,
        ..StorageConfig::default()
    });
    storage.initialize().await.unwrap();
    storage
}

#[tokio::test]
async fn wal_database_conforms() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir, true).await;
    run_storage_suite(&storage).await;
    storage.close().await.unwrap();
}

#[tokio::test]
async fn rollback_journal_database_conforms() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir, false).await;
    run_storage_suite(&storage).await;
}
