//! In-memory entity store
//!
//! Holds the four collections in a map, with an offline toggle so callers can
//! exercise the transport-failure paths of the synchronization protocol.
//! Backups are kept as in-memory snapshots keyed by name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use crate::backup::{backup_name, BackupInfo, BackupKind, RestoreOutcome};
use crate::collection::Collection;
use crate::store::{EntityStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    collections: HashMap<Collection, Vec<Value>>,
    backups: HashMap<String, (BackupInfo, HashMap<Collection, Vec<Value>>)>,
}

/// In-memory store for tests and cache-only operation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unreachable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Number of stored documents in a collection, for test assertions.
    pub fn len(&self, collection: Collection) -> usize {
        self.inner
            .read()
            .collections
            .get(&collection)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        self.check_online()?;
        Ok(self
            .inner
            .read()
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_collection(
        &self,
        collection: Collection,
        documents: Vec<Value>,
    ) -> StoreResult<()> {
        self.check_online()?;
        self.inner.write().collections.insert(collection, documents);
        Ok(())
    }

    async fn create_backup(
        &self,
        kind: BackupKind,
        _include_config: bool,
    ) -> StoreResult<BackupInfo> {
        self.check_online()?;
        let timestamp = Utc::now();
        let name = backup_name(kind, timestamp);

        let mut inner = self.inner.write();
        let files = Collection::ALL
            .iter()
            .filter(|c| inner.collections.contains_key(c))
            .map(|c| c.file_name().to_string())
            .collect();
        let info = BackupInfo {
            name: name.clone(),
            timestamp,
            kind,
            files,
        };
        let snapshot = inner.collections.clone();
        inner.backups.insert(name, (info.clone(), snapshot));
        Ok(info)
    }

    async fn list_backups(&self) -> StoreResult<Vec<BackupInfo>> {
        self.check_online()?;
        let mut backups: Vec<_> = self
            .inner
            .read()
            .backups
            .values()
            .map(|(info, _)| info.clone())
            .collect();
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    async fn restore(&self, name: &str) -> StoreResult<RestoreOutcome> {
        self.check_online()?;

        let mut inner = self.inner.write();
        let (info, snapshot) = inner
            .backups
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::BackupNotFound(name.to_string()))?;

        let timestamp = Utc::now();
        let safety_name = backup_name(BackupKind::AutoBeforeRestore, timestamp);
        let safety_info = BackupInfo {
            name: safety_name.clone(),
            timestamp,
            kind: BackupKind::AutoBeforeRestore,
            files: info.files.clone(),
        };
        let current = inner.collections.clone();
        inner.backups.insert(safety_name.clone(), (safety_info, current));

        inner.collections = snapshot;
        Ok(RestoreOutcome {
            restored: info.files,
            safety_backup: safety_name,
        })
    }

    async fn delete_backup(&self, name: &str) -> StoreResult<()> {
        self.check_online()?;
        self.inner
            .write()
            .backups
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::BackupNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_toggle() {
        let store = MemoryStore::new();
        store
            .put_collection(Collection::Projects, vec![serde_json::json!({"id": "p-1"})])
            .await
            .unwrap();

        store.set_offline(true);
        let err = store.get_collection(Collection::Projects).await.unwrap_err();
        assert!(matches!(err, StoreError::Unreachable(_)));

        store.set_offline(false);
        assert_eq!(store.len(Collection::Projects), 1);
    }

    #[tokio::test]
    async fn test_restore_roundtrip() {
        let store = MemoryStore::new();
        store
            .put_collection(Collection::Projects, vec![serde_json::json!({"id": "old"})])
            .await
            .unwrap();
        let backup = store
            .create_backup(BackupKind::Manual, false)
            .await
            .unwrap();

        store
            .put_collection(Collection::Projects, vec![serde_json::json!({"id": "new"})])
            .await
            .unwrap();

        let outcome = store.restore(&backup.name).await.unwrap();
        assert!(outcome.safety_backup.starts_with("auto_before_restore_"));

        let docs = store.get_collection(Collection::Projects).await.unwrap();
        assert_eq!(docs[0]["id"], "old");
    }
}
