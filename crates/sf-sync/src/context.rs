//! Data context
//!
//! The explicit store-handle object the workflow engine operates through.
//! Owns the client cache, the entity store handle, and the bootstrap /
//! push-propagation / pending-restore logic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sf_store::{Collection, EntityStore, StoreSnapshot};
use tracing::{debug, info, warn};

use crate::cache::ClientCache;

/// How long a pending-restore handoff stays applicable.
pub const PENDING_RESTORE_TTL: Duration = Duration::from_secs(5 * 60);

struct PendingRestore {
    snapshot: StoreSnapshot,
    created_at: Instant,
}

/// The engine's handle to the cache and the store.
///
/// Created once at session start and passed to every consumer; engine
/// operations mutate the cache synchronously and push the affected
/// collections to the store without waiting for the result.
pub struct DataContext {
    cache: ClientCache,
    store: Arc<dyn EntityStore>,
    pending_restore: Mutex<Option<PendingRestore>>,
}

impl DataContext {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            cache: ClientCache::new(),
            store,
            pending_restore: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Load the cache at session start.
    ///
    /// Precedence: a fresh pending-restore snapshot wins, then the store's
    /// snapshot (which overwrites the cache unconditionally, empty collections
    /// included), and only when the store is unreachable does the cache keep
    /// what it already holds — uploading itself opportunistically if non-empty.
    pub async fn bootstrap(&self) {
        if self.apply_pending_restore() {
            info!("cache loaded from pending restore snapshot");
            return;
        }

        if self.reload_from_store().await {
            info!("cache loaded from entity store");
            return;
        }

        let needs_upload = !self.cache.read().is_empty();
        if needs_upload {
            debug!("store unreachable, scheduling opportunistic upload of cached data");
            self.push(&Collection::ALL);
        }
    }

    /// Pull the store snapshot and overwrite the cache with it. Returns false
    /// when the store cannot be read; the cache is left untouched in that
    /// case.
    pub async fn reload_from_store(&self) -> bool {
        match self.store.fetch_snapshot().await {
            Ok(snapshot) => {
                self.cache.write().apply_snapshot(&snapshot);
                true
            }
            Err(e) => {
                warn!(error = %e, "snapshot pull failed, keeping cached data");
                false
            }
        }
    }

    /// Hand a restored snapshot to the next bootstrap. Applies only within
    /// [`PENDING_RESTORE_TTL`] and only once.
    pub fn set_pending_restore(&self, snapshot: StoreSnapshot) {
        self.install_pending(snapshot, Instant::now());
    }

    fn install_pending(&self, snapshot: StoreSnapshot, created_at: Instant) {
        *self.pending_restore.lock() = Some(PendingRestore {
            snapshot,
            created_at,
        });
    }

    fn apply_pending_restore(&self) -> bool {
        let Some(pending) = self.pending_restore.lock().take() else {
            return false;
        };
        if pending.created_at.elapsed() > PENDING_RESTORE_TTL {
            debug!("pending restore snapshot expired, ignoring");
            return false;
        }
        self.cache.write().apply_snapshot(&pending.snapshot);
        true
    }

    /// Fire-and-forget push of the given collections to the store.
    ///
    /// The cache is snapshotted under the lock; the store write happens on a
    /// spawned Tokio task (callers must be inside a runtime). A failed push
    /// leaves the cache authoritative until the next
    /// [`sync_all`](Self::sync_all).
    pub fn push(&self, collections: &[Collection]) {
        let state = self.cache.read();
        for &collection in collections {
            let documents = state.encode(collection);
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                if let Err(e) = store.put_collection(collection, documents).await {
                    warn!(%collection, error = %e, "push failed, cache stays ahead of store");
                }
            });
        }
    }

    /// Push all four collections and wait for the results. This is the
    /// explicit retry path after failed fire-and-forget pushes. Returns true
    /// when every collection was written.
    pub async fn sync_all(&self) -> bool {
        let snapshot = {
            let state = self.cache.read();
            Collection::ALL.map(|c| (c, state.encode(c)))
        };

        let mut all_ok = true;
        for (collection, documents) in snapshot {
            if let Err(e) = self.store.put_collection(collection, documents).await {
                warn!(%collection, error = %e, "sync failed");
                all_ok = false;
            }
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_models::{Project, Role, User};
    use sf_store::MemoryStore;

    fn sample_project() -> Project {
        Project::new(
            "Line 3",
            "Retrofit",
            "Zhao Min",
            "2024-01-01".parse().unwrap(),
            "2024-03-01".parse().unwrap(),
            "admin",
        )
    }

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_bootstrap_store_wins() {
        let store = seeded_store();
        store
            .put_collection(
                Collection::Users,
                vec![serde_json::json!({
                    "id": "user_admin",
                    "username": "admin",
                    "fullName": "System Administrator",
                    "role": "admin",
                    "department": null,
                })],
            )
            .await
            .unwrap();

        let ctx = DataContext::new(store);
        // Pre-existing local state is discarded by a successful pull.
        ctx.cache().write().projects.push(sample_project());
        ctx.bootstrap().await;

        let state = ctx.cache().read();
        assert_eq!(state.users.len(), 1);
        assert!(state.projects.is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_offline_keeps_cache_and_uploads() {
        let store = seeded_store();
        let ctx = DataContext::new(Arc::clone(&store) as Arc<dyn EntityStore>);
        ctx.cache().write().projects.push(sample_project());

        store.set_offline(true);
        ctx.bootstrap().await;
        assert_eq!(ctx.cache().read().projects.len(), 1);

        // Once the store is reachable again the explicit sync uploads the
        // cached state.
        store.set_offline(false);
        assert!(ctx.sync_all().await);
        assert_eq!(store.len(Collection::Projects), 1);
    }

    #[tokio::test]
    async fn test_push_failure_leaves_cache_intact() {
        let store = seeded_store();
        let ctx = DataContext::new(Arc::clone(&store) as Arc<dyn EntityStore>);
        ctx.cache().write().projects.push(sample_project());

        store.set_offline(true);
        assert!(!ctx.sync_all().await);
        assert_eq!(ctx.cache().read().projects.len(), 1);
        store.set_offline(false);
        assert!(store.is_empty(Collection::Projects));
    }

    #[tokio::test]
    async fn test_pending_restore_applies_once() {
        let store = seeded_store();
        let ctx = DataContext::new(store);

        let snapshot = StoreSnapshot {
            projects: vec![serde_json::to_value(sample_project()).unwrap()],
            ..Default::default()
        };
        ctx.set_pending_restore(snapshot);

        ctx.bootstrap().await;
        assert_eq!(ctx.cache().read().projects.len(), 1);

        // The handoff is consumed; the next bootstrap reads the (empty) store.
        ctx.bootstrap().await;
        assert!(ctx.cache().read().projects.is_empty());
    }

    #[tokio::test]
    async fn test_pending_restore_expires() {
        let store = seeded_store();
        let ctx = DataContext::new(store);

        let snapshot = StoreSnapshot {
            projects: vec![serde_json::to_value(sample_project()).unwrap()],
            ..Default::default()
        };
        let stale = Instant::now() - (PENDING_RESTORE_TTL + Duration::from_secs(1));
        ctx.install_pending(snapshot, stale);

        ctx.bootstrap().await;
        assert!(ctx.cache().read().projects.is_empty());
    }

    #[tokio::test]
    async fn test_reload_observes_restored_store() {
        let store = seeded_store();
        let ctx = DataContext::new(Arc::clone(&store) as Arc<dyn EntityStore>);
        ctx.bootstrap().await;
        assert!(ctx.cache().read().projects.is_empty());

        // The store changes behind the cache's back (e.g. a restore); the
        // cache only observes it on an explicit reload.
        store
            .put_collection(
                Collection::Projects,
                vec![serde_json::to_value(sample_project()).unwrap()],
            )
            .await
            .unwrap();
        assert!(ctx.cache().read().projects.is_empty());

        assert!(ctx.reload_from_store().await);
        assert_eq!(ctx.cache().read().projects.len(), 1);
    }

    #[tokio::test]
    async fn test_users_collection_roundtrips_through_sync() {
        let store = seeded_store();
        let ctx = DataContext::new(Arc::clone(&store) as Arc<dyn EntityStore>);
        ctx.cache()
            .write()
            .users
            .push(User::new("li", "Li Hua", Role::Employee, None));

        assert!(ctx.sync_all().await);
        assert_eq!(store.len(Collection::Users), 1);
    }
}
