//! Client cache
//!
//! Typed mirrors of the four store collections. The cache is the engine's
//! working set; the store only ever sees whole-collection snapshots of it.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sf_models::{DailyReport, Project, User, WorkProcess};
use sf_store::{Collection, StoreSnapshot};
use tracing::warn;

/// The typed collections mirrored from the store.
#[derive(Debug, Default)]
pub struct CacheState {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub work_processes: Vec<WorkProcess>,
    pub daily_reports: Vec<DailyReport>,
}

impl CacheState {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.projects.is_empty()
            && self.work_processes.is_empty()
            && self.daily_reports.is_empty()
    }

    /// Replace every collection from a store snapshot. A collection that does
    /// not decode falls back to empty rather than poisoning the cache.
    pub fn apply_snapshot(&mut self, snapshot: &StoreSnapshot) {
        self.users = decode(Collection::Users, &snapshot.users);
        self.projects = decode(Collection::Projects, &snapshot.projects);
        self.work_processes = decode(Collection::WorkProcesses, &snapshot.processes);
        self.daily_reports = decode(Collection::DailyReports, &snapshot.daily_reports);
    }

    /// Encode one collection as store documents.
    pub fn encode(&self, collection: Collection) -> Vec<Value> {
        match collection {
            Collection::Users => encode(Collection::Users, &self.users),
            Collection::Projects => encode(Collection::Projects, &self.projects),
            Collection::WorkProcesses => encode(Collection::WorkProcesses, &self.work_processes),
            Collection::DailyReports => encode(Collection::DailyReports, &self.daily_reports),
        }
    }
}

fn decode<T: DeserializeOwned>(collection: Collection, documents: &[Value]) -> Vec<T> {
    match serde_json::from_value(Value::Array(documents.to_vec())) {
        Ok(items) => items,
        Err(e) => {
            warn!(%collection, error = %e, "collection failed to decode, falling back to empty");
            Vec::new()
        }
    }
}

fn encode<T: Serialize>(collection: Collection, items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| match serde_json::to_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%collection, error = %e, "document failed to encode, skipping");
                None
            }
        })
        .collect()
}

/// Shared, lock-guarded cache.
#[derive(Debug, Default)]
pub struct ClientCache {
    state: RwLock<CacheState>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write()
    }
}
